use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::lsp::document::DocumentState;
use crate::lsp::handlers::{HandleCompletion, HandleDiagnostics, HandleDocumentSymbol, HandleHover};
use crate::schema::Schema;
use crate::validation::DiagnosticSettings;

/// Client settings section holding the rule levels
pub const CONFIG_SECTION: &str = "xtbXcontrol.diagnostics";

/// Diagnostic settings known to the server
#[derive(Debug, Default)]
pub struct SettingsState {
    /// Client answers `workspace/configuration`
    pub supports_configuration: bool,
    /// From the settings file, below anything the client sends
    pub file: DiagnosticSettings,
    /// Last pushed `didChangeConfiguration` payload
    pub global: DiagnosticSettings,
}

/// The main LSP backend that holds state and implements the Language Server Protocol
pub struct Backend {
    pub client: Client,
    pub schema: Arc<Schema>,
    pub documents: Arc<Mutex<HashMap<Url, Arc<DocumentState>>>>,
    pub settings: Arc<RwLock<SettingsState>>,
}

impl Backend {
    pub fn new(client: Client, schema: Arc<Schema>, file_settings: DiagnosticSettings) -> Self {
        Self {
            client,
            schema,
            documents: Arc::new(Mutex::new(HashMap::new())),
            settings: Arc::new(RwLock::new(SettingsState {
                file: file_settings,
                ..Default::default()
            })),
        }
    }

    /// Snapshot of an open document
    pub async fn document(&self, uri: &Url) -> Option<Arc<DocumentState>> {
        self.documents.lock().await.get(uri).cloned()
    }

    async fn store_document(&self, uri: Url, content: String, version: i32) {
        let doc_state = DocumentState::new(content, Some(version), &self.schema);

        let mut docs = self.documents.lock().await;
        docs.insert(uri.clone(), Arc::new(doc_state));
        drop(docs); // Release the lock before calling publish_diagnostics

        self.publish_diagnostics(uri).await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> tower_lsp::jsonrpc::Result<InitializeResult> {
        let supports_configuration = params
            .capabilities
            .workspace
            .as_ref()
            .and_then(|workspace| workspace.configuration)
            .unwrap_or(false);
        self.settings.write().await.supports_configuration = supports_configuration;
        log::info!(
            "Initializing with schema {} (workspace/configuration: {})",
            self.schema.name,
            supports_configuration
        );

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec!["$".to_string()]),
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                document_symbol_provider: Some(OneOf::Left(true)),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        if self.settings.read().await.supports_configuration {
            let registration = Registration {
                id: "xcontrol-did-change-configuration".to_string(),
                method: "workspace/didChangeConfiguration".to_string(),
                register_options: None,
            };
            if let Err(e) = self.client.register_capability(vec![registration]).await {
                log::warn!("Failed to register for configuration changes: {}", e);
            }
        }

        self.client
            .log_message(MessageType::INFO, "xcontrol-language-server initialized")
            .await;
    }

    async fn shutdown(&self) -> tower_lsp::jsonrpc::Result<()> {
        Ok(())
    }

    async fn hover(&self, params: HoverParams) -> tower_lsp::jsonrpc::Result<Option<Hover>> {
        self.handle_hover(params).await
    }

    async fn completion(
        &self,
        params: CompletionParams,
    ) -> tower_lsp::jsonrpc::Result<Option<CompletionResponse>> {
        self.handle_completion(params).await
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> tower_lsp::jsonrpc::Result<Option<DocumentSymbolResponse>> {
        self.handle_document_symbol(params).await
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        self.store_document(doc.uri, doc.text, doc.version).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // Full sync: the last change carries the whole text
        if let Some(change) = params.content_changes.into_iter().last() {
            let doc = params.text_document;
            self.store_document(doc.uri, change.text, doc.version).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.lock().await.remove(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        {
            let mut settings = self.settings.write().await;
            if !settings.supports_configuration {
                let section = params
                    .settings
                    .get("xtbXcontrol")
                    .and_then(|xcontrol| xcontrol.get("diagnostics"))
                    .cloned()
                    .unwrap_or(Value::Null);
                settings.global = DiagnosticSettings::from_json(&section);
            }
        }

        self.revalidate_all().await;
    }
}
