#[tokio::main]
async fn main() {
    taskflow_lsp::run().await;
}
