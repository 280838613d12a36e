//! Owns the live index and funnels every operation on it through the task
//! queue.
//!
//! Methods are synchronous: each one enqueues its task immediately and
//! returns a future for the result, so the order of calls is the order of
//! execution regardless of when the futures are awaited.

use std::{
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use futures::FutureExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
    config::Settings,
    error::{Result, TagsError},
    generator::TagGenerator,
    index::{self, Completion, SymbolIndex, TagStore},
    queue::TaskQueue,
    resolve::Match,
};

static NEXT_TEMP_SEQ: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexPhase {
    /// Nothing has been indexed yet; queries see an empty index.
    Empty,
    /// A rebuild is running; queries still see the previous index.
    Building,
    Ready,
}

struct ManagerState {
    settings: Settings,
    base_dir: PathBuf,
    index: Arc<SymbolIndex>,
    phase: IndexPhase,
}

impl ManagerState {
    fn tags_path(&self) -> PathBuf {
        self.base_dir.join(&self.settings.tags.file)
    }
}

#[derive(Clone)]
pub struct TagIndexManager {
    queue: Arc<TaskQueue>,
    state: Arc<RwLock<ManagerState>>,
}

impl TagIndexManager {
    /// Must be called from within a Tokio runtime (spawns the queue worker).
    pub fn new(
        base_dir: impl Into<PathBuf>,
        settings: Settings,
    ) -> Self {
        let base_dir = absolute_dir(base_dir.into());
        let table = base_dir.join(&settings.tags.file);
        let index = Arc::new(SymbolIndex::empty(&table, settings.tags.layout()));
        Self {
            queue: Arc::new(TaskQueue::new()),
            state: Arc::new(RwLock::new(ManagerState {
                settings,
                base_dir,
                index,
                phase: IndexPhase::Empty,
            })),
        }
    }

    pub async fn phase(&self) -> IndexPhase {
        self.state.read().await.phase
    }

    pub async fn base_dir(&self) -> PathBuf {
        self.state.read().await.base_dir.clone()
    }

    /// Path of the live tag table.
    pub async fn tags_path(&self) -> PathBuf {
        self.state.read().await.tags_path()
    }

    /// Run the generator into a temporary file, install it over the live
    /// table, then rebuild. Resolves to the rebuilt index's record count.
    ///
    /// A generator that exits with an error still has its output installed.
    /// A failed install is logged and the rebuild runs against whatever
    /// table is live.
    pub fn regenerate(
        &self,
        args: Vec<String>,
    ) -> impl Future<Output = Result<usize>> + Send + use<> {
        let state = Arc::clone(&self.state);
        self.submit(
            async move {
                let (generator, base_dir, table) = {
                    let state = state.read().await;
                    (TagGenerator::from_settings(&state.settings.tags), state.base_dir.clone(), state.tags_path())
                };

                if let Err(error) = generate_and_install(&generator, &base_dir, &args, &table).await {
                    warn!("[regen] keeping previous table {}: {error}", table.display());
                }
                rebuild(&state).await
            },
            true,
        )
    }

    /// Rebuild from the live table without running the generator.
    pub fn reindex(&self) -> impl Future<Output = Result<usize>> + Send + use<> {
        let state = Arc::clone(&self.state);
        self.submit(async move { rebuild(&state).await }, true)
    }

    /// Every definition of `symbol`, resolved to concrete lines.
    pub fn lookup(
        &self,
        symbol: &str,
    ) -> impl Future<Output = Result<Option<Vec<Match>>>> + Send + use<> {
        let symbol = symbol.to_owned();
        let state = Arc::clone(&self.state);
        self.submit(
            async move {
                let (index, base_dir, concurrency) = {
                    let state = state.read().await;
                    (Arc::clone(&state.index), state.base_dir.clone(), state.settings.resolver.concurrency)
                };
                index.lookup(&symbol, &base_dir, concurrency).await
            },
            false,
        )
    }

    pub fn lookup_completions(
        &self,
        prefix: &str,
    ) -> impl Future<Output = Result<Option<Vec<Completion>>>> + Send + use<> {
        let prefix = prefix.to_owned();
        let state = Arc::clone(&self.state);
        self.submit(
            async move {
                let index = Arc::clone(&state.read().await.index);
                index.lookup_completions(&prefix).await
            },
            false,
        )
    }

    /// The index queries currently run against.
    ///
    /// A byte-range snapshot reads its offsets from the live table file, so it
    /// is only valid until the next queued rebuild replaces that table.
    pub fn snapshot(&self) -> impl Future<Output = Result<Arc<SymbolIndex>>> + Send + use<> {
        let state = Arc::clone(&self.state);
        self.submit(async move { Arc::clone(&state.read().await.index) }, false)
    }

    /// Replace settings for every later operation.
    ///
    /// When the table path or storage layout changes and something has
    /// already been indexed, the index is rebuilt under the new settings and
    /// the record count is returned.
    pub fn apply_settings(
        &self,
        settings: Settings,
    ) -> impl Future<Output = Result<Option<usize>>> + Send + use<> {
        let state = Arc::clone(&self.state);
        self.submit(
            async move {
                let needs_rebuild = {
                    let mut state = state.write().await;
                    let previous = std::mem::replace(&mut state.settings, settings);
                    let table_changed = previous.tags.file != state.settings.tags.file
                        || previous.tags.layout() != state.settings.tags.layout();
                    table_changed && state.phase != IndexPhase::Empty
                };
                if needs_rebuild {
                    debug!("[index] table settings changed, rebuilding");
                    Some(rebuild(&state).await)
                } else {
                    None
                }
            },
            true,
        )
    }

    /// Change the directory the generator runs in and relative paths resolve
    /// against. Takes effect for later operations; does not rebuild.
    pub fn set_base_dir(
        &self,
        base_dir: PathBuf,
    ) -> impl Future<Output = Result<()>> + Send + use<> {
        let base_dir = absolute_dir(base_dir);
        let state = Arc::clone(&self.state);
        self.submit(
            async move {
                info!("[index] base directory {}", base_dir.display());
                state.write().await.base_dir = base_dir;
            },
            true,
        )
    }

    fn submit<F, T>(
        &self,
        task: F,
        exclusive: bool,
    ) -> impl Future<Output = Result<T>> + Send + use<F, T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.queue.append(task, exclusive).map(|outcome| outcome.map_err(TagsError::from))
    }
}

async fn rebuild(state: &RwLock<ManagerState>) -> usize {
    let (table, layout) = {
        let mut state = state.write().await;
        state.phase = IndexPhase::Building;
        (state.tags_path(), state.settings.tags.layout())
    };

    let index = Arc::new(index::build(&table, layout).await);
    let records = index.len();

    let mut state = state.write().await;
    state.index = index;
    state.phase = IndexPhase::Ready;
    records
}

async fn generate_and_install(
    generator: &TagGenerator,
    base_dir: &Path,
    args: &[String],
    table: &Path,
) -> Result<()> {
    let temp = temp_table_path(table);
    // Whatever the tool managed to write is still installed; with no output
    // the rename fails and the live table stays.
    if let Err(error) = generator.run(base_dir, args, &temp).await {
        warn!("[regen] {error}");
    }
    install_table(&temp, table).await
}

/// Atomically move a freshly written table over the live one. On failure the
/// temporary file is removed and the live table is untouched.
async fn install_table(
    temp: &Path,
    table: &Path,
) -> Result<()> {
    if let Err(error) = tokio::fs::rename(temp, table).await {
        discard(temp).await;
        return Err(error.into());
    }
    debug!("[regen] installed {}", table.display());
    Ok(())
}

async fn discard(temp: &Path) {
    match tokio::fs::remove_file(temp).await {
        Ok(()) => debug!("[regen] removed {}", temp.display()),
        Err(error) if error.kind() == ErrorKind::NotFound => {},
        Err(error) => warn!("[regen] cannot remove {}: {error}", temp.display()),
    }
}

/// `<table>.<pid>.<seq>.tmp` in the table's own directory, so the final
/// rename never crosses filesystems.
fn temp_table_path(table: &Path) -> PathBuf {
    let name = table.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_else(|| "tags".to_owned());
    let seq = NEXT_TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    table.with_file_name(format!("{name}.{}.{seq}.tmp", std::process::id()))
}

fn absolute_dir(dir: PathBuf) -> PathBuf {
    std::path::absolute(&dir).unwrap_or(dir)
}

#[cfg(test)]
#[path = "../../tests/src/manager_tests.rs"]
mod tests;
