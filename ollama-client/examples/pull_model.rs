use std::io::Write;

use ollama_client::OllamaClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let model = std::env::args().nth(1).unwrap_or_else(|| "llama3.2:1b".to_string());
    let client = OllamaClient::builder().build()?;

    client
        .pull_model(&model, |progress| {
            match progress.fraction() {
                Some(fraction) => print!("\r{}: {:5.1}%", progress.status, fraction * 100.0),
                None => print!("\n{}", progress.status),
            }
            let _ = std::io::stdout().flush();
        })
        .await?;
    println!();

    Ok(())
}
