use std::path::PathBuf;

use futures::FutureExt;
use serde_json::{Value, json};
use tower_lsp::{
    LanguageServer,
    jsonrpc::{Error, Result},
    lsp_types::*,
};
use tracing::{debug, info, warn};

use crate::{
    config::LogLevel,
    progress::ProgressToken,
    resolve::Match,
    server::{
        commands::{self, REGENERATE_COMMAND, REINDEX_COMMAND},
        state::TagsLanguageServer,
    },
};

#[tower_lsp::async_trait]
impl LanguageServer for TagsLanguageServer {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> Result<InitializeResult> {
        info!("[server] initializing ctags-index v{}", env!("CARGO_PKG_VERSION"));

        let root = workspace_root(&params);
        let base_dir = match &root {
            Some(root) => root.clone(),
            None => self.manager.base_dir().await,
        };
        let settings = self.base_settings.layered(&base_dir, params.initialization_options.as_ref());

        if root.is_some() {
            let pending = self.manager.set_base_dir(base_dir);
            tokio::spawn(async move {
                if let Err(error) = pending.await {
                    warn!("[server] setting base directory failed: {error}");
                }
            });
        }
        self.apply_settings(settings).await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                definition_provider: Some(OneOf::Left(true)),
                completion_provider: Some(CompletionOptions::default()),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: commands::all(),
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "ctags-index".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(
        &self,
        _: InitializedParams,
    ) {
        let pending = self.manager.reindex();
        let table = self.manager.tags_path().await;
        info!("[server] initial index of {}", table.display());

        let client = self.client.clone();
        tokio::spawn(async move {
            let progress = ProgressToken::begin(&client, "Indexing", Some(table.display().to_string())).await;
            match pending.await {
                Ok(records) => progress.end(Some(format!("{records} tags"))).await,
                Err(error) => {
                    warn!("[server] initial index failed: {error}");
                    progress.end(Some("Failed".to_string())).await;
                },
            }
        });
    }

    async fn shutdown(&self) -> Result<()> {
        info!("[server] shutting down");
        Ok(())
    }

    async fn did_change_configuration(
        &self,
        params: DidChangeConfigurationParams,
    ) {
        let current = self.settings_snapshot().await;
        let merged = current.merged_with_payload(&params.settings);
        if merged == current {
            return;
        }
        self.apply_settings(merged).await;
        info!("[config] applied updated settings");
        self.log_to_client(LogLevel::Info, "settings updated").await;
    }

    async fn did_open(
        &self,
        params: DidOpenTextDocumentParams,
    ) {
        let doc = params.text_document;
        debug!("[server] opened {} (v{})", doc.uri, doc.version);
        self.documents.open(doc.uri, doc.text, doc.version);
    }

    async fn did_change(
        &self,
        params: DidChangeTextDocumentParams,
    ) {
        // Full sync: the last change carries the whole text.
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        self.documents.update(params.text_document.uri, change.text, params.text_document.version);
    }

    async fn did_close(
        &self,
        params: DidCloseTextDocumentParams,
    ) {
        self.documents.close(&params.text_document.uri);
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(doc) = self.documents.get(&uri) else {
            return Ok(None);
        };
        let Some(symbol) = doc.word_at(position) else {
            return Ok(None);
        };

        let matches = match self.manager.lookup(symbol).await {
            Ok(Some(matches)) => matches,
            Ok(None) => {
                debug!("[server] no definition for '{symbol}'");
                return Ok(None);
            },
            Err(error) => {
                warn!("[server] lookup of '{symbol}' failed: {error}");
                return Ok(None);
            },
        };

        let locations: Vec<Location> = matches.iter().filter_map(match_to_location).collect();
        debug!("[server] '{symbol}' → {} location(s)", locations.len());
        if locations.is_empty() {
            return Ok(None);
        }
        Ok(Some(GotoDefinitionResponse::Array(locations)))
    }

    async fn completion(
        &self,
        params: CompletionParams,
    ) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let Some(doc) = self.documents.get(&uri) else {
            return Ok(None);
        };
        let Some(prefix) = doc.word_prefix_at(position) else {
            return Ok(None);
        };

        let completions = match self.manager.lookup_completions(prefix).await {
            Ok(Some(completions)) => completions,
            Ok(None) => return Ok(None),
            Err(error) => {
                warn!("[server] completion of '{prefix}' failed: {error}");
                return Ok(None);
            },
        };

        let items = completions
            .into_iter()
            .map(|completion| CompletionItem {
                label: completion.name,
                ..Default::default()
            })
            .collect();
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> Result<Option<Value>> {
        let (pending, title) = match params.command.as_str() {
            REGENERATE_COMMAND => {
                let args = commands::generator_args(&params.arguments);
                (self.manager.regenerate(args).boxed(), "Regenerating tags")
            },
            REINDEX_COMMAND => (self.manager.reindex().boxed(), "Reloading tags"),
            other => return Err(Error::invalid_params(format!("unknown command: {other}"))),
        };

        let progress = ProgressToken::begin(&self.client, title, None).await;
        match pending.await {
            Ok(records) => {
                progress.end(Some(format!("{records} tags"))).await;
                self.log_to_client(LogLevel::Info, format!("{}: {records} tags", params.command)).await;
                Ok(Some(json!(records)))
            },
            Err(error) => {
                progress.end(Some("Failed".to_string())).await;
                self.log_to_client(LogLevel::Error, format!("{} failed: {error}", params.command)).await;
                Err(Error::internal_error())
            },
        }
    }
}

/// First workspace folder, else the root URI, as a local directory.
fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    let folder = params.workspace_folders.as_ref().and_then(|folders| folders.first()).map(|folder| &folder.uri);
    #[allow(deprecated)]
    let uri = folder.or(params.root_uri.as_ref())?;
    uri.to_file_path().ok()
}

fn match_to_location(found: &Match) -> Option<Location> {
    let uri = Url::from_file_path(&found.path).ok()?;
    let start = Position::new(found.lineno, 0);
    Some(Location::new(uri, Range::new(start, start)))
}
