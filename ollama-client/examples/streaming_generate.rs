use std::io::Write;

use ollama_client::types::generate::GenerateRequest;
use ollama_client::types::ModelOptions;
use ollama_client::{CancellationToken, OllamaClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let token = CancellationToken::new();
    let client = OllamaClient::builder().build()?.with_cancellation(token.clone());

    // Ctrl-C stops the generation.
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let request = GenerateRequest::new("llama3.2:3b", "Tell me a story about a Rust programmer.")
        .options(ModelOptions::new().temperature(0.8));

    let result = client
        .generate_stream(&request, |chunk| {
            print!("{}", chunk.response);
            let _ = std::io::stdout().flush();
            if chunk.done {
                if let Some(rate) = chunk.tokens_per_second() {
                    println!("\n\n[{:.1} tokens/s]", rate);
                }
            }
        })
        .await;

    match result {
        Err(e) if e.is_cancelled() => println!("\n[cancelled]"),
        other => other?,
    }

    Ok(())
}
