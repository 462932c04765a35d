use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use tower_lsp::lsp_types::ConfigurationItem;

use super::catalog::DirCatalog;
use super::state::TaskflowLanguageServer;

#[derive(Debug, Clone)]
pub(crate) struct ServerConfig {
    pub(crate) max_diagnostics: usize,
    pub(crate) catalog_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_diagnostics: 100,
            catalog_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TaskflowLspSection {
    #[serde(default)]
    max_diagnostics: Option<usize>,
    #[serde(default)]
    catalog_dir: Option<String>,
}

impl TaskflowLanguageServer {
    pub(crate) async fn load_config(&self) {
        let items = vec![ConfigurationItem {
            scope_uri: None,
            section: Some("taskflow.lsp".to_string()),
        }];

        if let Ok(values) = self.client.configuration(items).await {
            if let Some(val) = values.into_iter().next() {
                if let Ok(cfg) = serde_json::from_value::<TaskflowLspSection>(val) {
                    let mut guard = self.config.lock().unwrap();
                    if let Some(v) = cfg.max_diagnostics.filter(|v| *v > 0) {
                        guard.max_diagnostics = v;
                    }
                    if let Some(dir) = cfg.catalog_dir {
                        let dir = PathBuf::from(dir);
                        if guard.catalog_dir.as_ref() != Some(&dir) {
                            guard.catalog_dir = Some(dir.clone());
                            self.catalog.set_source(Arc::new(DirCatalog::new(dir)));
                        }
                    }
                }
            }
        }
    }
}
