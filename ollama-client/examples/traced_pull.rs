//! Pulls a model with `tracing` spans and events printed to stderr.
//!
//! Run with `cargo run --example traced_pull --features tracing`.

use ollama_client::OllamaClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let client = OllamaClient::builder().build()?;

    let mut last_status = String::new();
    client
        .pull_model("llama3.2:1b", |progress| {
            if progress.status != last_status {
                tracing::info!(status = %progress.status, digest = ?progress.digest, "pull progress");
                last_status = progress.status;
            }
        })
        .await?;

    Ok(())
}
