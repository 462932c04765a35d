use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use ropey::Rope;
use tower_lsp::lsp_types::{Diagnostic, Url};
use tower_lsp::Client;

use super::catalog::{CachedCatalog, DirCatalog};
use super::config::ServerConfig;

/// In-memory representation of an open workflow document and its cached
/// diagnostics.
#[derive(Debug, Default)]
pub(crate) struct Document {
    pub(crate) content: Rope,
    pub(crate) version: i32,
    pub(crate) cached_diagnostics: Option<Arc<Vec<Diagnostic>>>,
    pub(crate) debounce_seq: u64,
}

/// Primary LSP server state shared across handlers.
pub(crate) struct TaskflowLanguageServer {
    pub(crate) client: Client,
    pub(crate) documents: Arc<DashMap<Url, Document>>,
    pub(crate) catalog: Arc<CachedCatalog>,
    pub(crate) config: Mutex<ServerConfig>,
}

impl TaskflowLanguageServer {
    pub(crate) fn new(client: Client) -> Self {
        let dir = std::env::var_os("TASKFLOW_CATALOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".taskflow-catalog"));
        Self {
            client,
            documents: Arc::new(DashMap::new()),
            catalog: Arc::new(CachedCatalog::new(Arc::new(DirCatalog::new(dir)))),
            config: Mutex::new(ServerConfig::default()),
        }
    }

    /// Current full text of a document, or `None` when it isn't open.
    pub(crate) fn snapshot(&self, uri: &Url) -> Option<String> {
        self.documents.get(uri).map(|doc| doc.content.to_string())
    }
}
