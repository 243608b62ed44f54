use std::io::Write;

use ollama_client::types::chat::{ChatRequest, Message};
use ollama_client::OllamaClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = OllamaClient::builder().build()?;

    let mut request = ChatRequest::new("llama3.2:3b")
        .add_message(Message::system("You are a concise assistant."))
        .add_message(Message::user("Why is the sky blue?"));

    let mut reply = String::new();
    client
        .chat_stream(&request, |chunk| {
            print!("{}", chunk.message.content);
            let _ = std::io::stdout().flush();
            reply.push_str(&chunk.message.content);
        })
        .await?;
    println!("\n");

    request = request
        .add_message(Message::assistant(reply))
        .add_message(Message::user("Explain it to a five year old."));

    let response = client.chat(&request).await?;
    println!("{}", response.message.content);

    Ok(())
}
