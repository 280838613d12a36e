use std::{panic::AssertUnwindSafe, path::PathBuf, sync::Arc};

use futures::FutureExt;
use tokio::sync::RwLock;
use tower_lsp::Client;
use tracing::{debug, warn};

use crate::{
    config::{LogLevel, Settings},
    document::DocumentStore,
    manager::TagIndexManager,
};

const CLIENT_MESSAGE_PREFIX: &str = "ctags-index:";

/// The LSP backend: open documents plus the tag index they are queried
/// against.
pub struct TagsLanguageServer {
    pub(crate) client: Client,
    pub(crate) documents: Arc<DocumentStore>,
    pub(crate) manager: TagIndexManager,
    /// Settings from the command line; project file and client settings are
    /// layered over these during `initialize`.
    pub(crate) base_settings: Settings,
    pub(crate) settings: Arc<RwLock<Settings>>,
}

impl TagsLanguageServer {
    /// Serve from the process working directory with default settings.
    pub fn new(client: Client) -> Self {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_base(client, base_dir, Settings::default())
    }

    pub fn with_base(
        client: Client,
        base_dir: PathBuf,
        settings: Settings,
    ) -> Self {
        Self {
            client,
            documents: Arc::new(DocumentStore::new()),
            manager: TagIndexManager::new(base_dir, settings.clone()),
            base_settings: settings.clone(),
            settings: Arc::new(RwLock::new(settings)),
        }
    }

    pub(crate) async fn settings_snapshot(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Store `settings` and hand them to the manager. The manager update is
    /// queued before returning, so later requests observe it.
    pub(crate) async fn apply_settings(
        &self,
        settings: Settings,
    ) {
        let pending = self.manager.apply_settings(settings.clone());
        *self.settings.write().await = settings;
        tokio::spawn(async move {
            match pending.await {
                Ok(Some(records)) => debug!("[config] reindexed {records} records under new settings"),
                Ok(None) => {},
                Err(error) => warn!("[config] applying settings failed: {error}"),
            }
        });
    }

    /// Mirror a message to the client's log when `logging.level` allows it.
    pub(crate) async fn log_to_client(
        &self,
        level: LogLevel,
        message: impl AsRef<str>,
    ) {
        if !self.settings.read().await.logging.level.allows(level) {
            return;
        }
        let text = format!("{CLIENT_MESSAGE_PREFIX} {}", message.as_ref());
        if AssertUnwindSafe(self.client.log_message(level.message_type(), text)).catch_unwind().await.is_err() {
            warn!("[server] log_message panicked (client gone?)");
        }
    }
}
