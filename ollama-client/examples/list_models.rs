use ollama_client::OllamaClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = OllamaClient::builder().build()?;

    let response = client.list_models().await?;
    for model in response.models {
        println!(
            "{:<32} {:>6} {:>8} {}",
            model.name,
            model.details.parameter_size,
            model.details.quantization_level,
            model.size
        );
    }

    let running = client.process_status().await?;
    println!("\n{} model(s) loaded", running.models.len());
    for model in running.models {
        println!("{} (until {})", model.name, model.expires_at.unwrap_or_default());
    }

    Ok(())
}
