#[tokio::main]
async fn main() {
    if let Err(e) = relay_server::run().await {
        tracing::error!(error = %e, "relay server stopped");
        std::process::exit(1);
    }
}
