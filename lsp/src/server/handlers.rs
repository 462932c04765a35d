use std::sync::Arc;

use ropey::Rope;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::LanguageServer;
use tracing::info;

use super::state::{Document, TaskflowLanguageServer};
use super::text::apply_change;
use super::utils::is_workflow_uri;
use super::{actions, analysis, completion, hover, navigation};

#[tower_lsp::async_trait]
impl LanguageServer for TaskflowLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        info!("Taskflow Language Server initializing, root: {:?}", params.root_uri);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::INCREMENTAL)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![
                        "[".to_string(),
                        ",".to_string(),
                        "/".to_string(),
                        "*".to_string(),
                        " ".to_string(),
                    ]),
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
                diagnostic_provider: Some(DiagnosticServerCapabilities::Options(DiagnosticOptions {
                    identifier: Some("taskflow".to_string()),
                    inter_file_dependencies: false,
                    workspace_diagnostics: false,
                    work_done_progress_options: Default::default(),
                })),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "Taskflow Language Server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("Taskflow Language Server initialized");
        let _ = self
            .client
            .log_message(MessageType::INFO, "Taskflow Language Server started")
            .await;
        self.load_config().await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Taskflow Language Server shutting down");
        Ok(())
    }

    async fn did_change_configuration(&self, _params: DidChangeConfigurationParams) {
        self.load_config().await;
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        let document = Document {
            content: Rope::from_str(&params.text_document.text),
            version,
            cached_diagnostics: None,
            debounce_seq: 0,
        };
        self.documents.insert(uri.clone(), document);
        self.schedule_diagnostics(uri, version, 150).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        {
            let mut entry = self.documents.entry(uri.clone()).or_default();
            entry.version = version;
            for change in &params.content_changes {
                apply_change(&mut entry.content, change);
            }
            entry.cached_diagnostics = None;
            entry.debounce_seq = entry.debounce_seq.wrapping_add(1);
        }

        self.schedule_diagnostics(uri, version, 250).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        if !is_workflow_uri(uri) {
            return Ok(Some(CompletionResponse::Array(Vec::new())));
        }
        let Some(text) = self.snapshot(uri) else {
            return Ok(Some(CompletionResponse::Array(Vec::new())));
        };

        let doc_path = uri.to_file_path().ok();
        let items = completion::completions(&text, position, doc_path.as_deref(), &self.catalog).await;
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        if !is_workflow_uri(uri) {
            return Ok(None);
        }
        let Some(text) = self.snapshot(uri) else {
            return Ok(None);
        };
        Ok(hover::hover(&text, position, &self.catalog).await)
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        if !is_workflow_uri(uri) {
            return Ok(None);
        }
        let Some(text) = self.snapshot(uri) else {
            return Ok(None);
        };
        Ok(navigation::definition(&text, position, uri).map(GotoDefinitionResponse::Link))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        if !is_workflow_uri(uri) {
            return Ok(None);
        }
        let Some(text) = self.snapshot(uri) else {
            return Ok(None);
        };
        let locations = navigation::references(&text, position, uri, params.context.include_declaration);
        Ok(Some(locations))
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = &params.text_document.uri;
        if !is_workflow_uri(uri) {
            return Ok(None);
        }
        let Some(text) = self.snapshot(uri) else {
            return Ok(None);
        };
        let actions = actions::code_actions(
            &text,
            params.range,
            &params.context.diagnostics,
            uri,
            &self.catalog,
        )
        .await;
        Ok(Some(actions))
    }

    async fn diagnostic(&self, params: DocumentDiagnosticParams) -> Result<DocumentDiagnosticReportResult> {
        let uri = &params.text_document.uri;
        let items = if !is_workflow_uri(uri) {
            Vec::new()
        } else if let Some(cached) = self.documents.get(uri).and_then(|d| d.cached_diagnostics.clone()) {
            cached.as_ref().clone()
        } else if let Some(text) = self.snapshot(uri) {
            let max = self.config.lock().unwrap().max_diagnostics;
            let computed = analysis::compute_diagnostics(&text, &self.catalog, max).await;
            if let Some(mut doc) = self.documents.get_mut(uri) {
                doc.cached_diagnostics = Some(Arc::new(computed.clone()));
            }
            computed
        } else {
            Vec::new()
        };

        Ok(DocumentDiagnosticReportResult::Report(DocumentDiagnosticReport::Full(
            RelatedFullDocumentDiagnosticReport {
                related_documents: None,
                full_document_diagnostic_report: FullDocumentDiagnosticReport {
                    result_id: None,
                    items,
                },
            },
        )))
    }
}
