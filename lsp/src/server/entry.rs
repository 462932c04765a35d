use tower_lsp::{LspService, Server};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::cli::try_cli_analyze;
use super::state::TaskflowLanguageServer;

/// Process entry: one-shot `--analyze` mode when requested, otherwise an LSP
/// server over stdio. Logs go to stderr so stdout stays protocol-clean.
pub async fn run() {
    if let Some(output) = try_cli_analyze().unwrap_or_else(|e| {
        eprintln!("taskflow-lsp analyze error: {e}");
        std::process::exit(2);
    }) {
        println!("{}", output);
        return;
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    info!("taskflow-lsp {} serving on stdio", env!("CARGO_PKG_VERSION"));

    let (service, socket) = LspService::new(TaskflowLanguageServer::new);
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket).serve(service).await;
}
