use std::sync::Arc;

use ollama_client::transport::MockTransport;
use ollama_client::types::chat::{ChatRequest, Message};
use ollama_client::types::embeddings::EmbeddingRequest;
use ollama_client::types::generate::GenerateRequest;
use ollama_client::types::{HttpVerb, ModelOptions, Role};
use ollama_client::{ErrorKind, OllamaClient, Result};

fn client_with(mock: &MockTransport) -> Result<OllamaClient> {
    OllamaClient::builder()
        .base_url("http://mock.ollama.ai")
        .transport(Arc::new(mock.clone()))
        .build()
}

#[tokio::test]
async fn test_list_models() -> Result<()> {
    let mock = MockTransport::new().with_response(
        "/api/tags",
        200,
        r#"{"models":[
            {"name":"llama2:latest","modified_at":"2024-05-01T10:00:00Z","size":3825819519,"digest":"sha256:1a838c4c",
             "details":{"format":"gguf","family":"llama","families":["llama"],"parameter_size":"7B","quantization_level":"Q4_0"}},
            {"name":"codellama:latest","size":3825819519,"digest":"sha256:2b947d5f"}
        ]}"#,
    );
    let client = client_with(&mock)?;

    let response = client.list_models().await?;
    assert_eq!(response.models.len(), 2);
    assert_eq!(response.models[0].name, "llama2:latest");
    assert_eq!(response.models[0].details.parameter_size, "7B");
    assert_eq!(response.models[1].details.family, "");

    let request = mock.last_request("/api/tags").unwrap();
    assert_eq!(request.verb, HttpVerb::GET);
    assert!(request.body.is_none());
    Ok(())
}

#[tokio::test]
async fn test_show_model() -> Result<()> {
    let mock = MockTransport::new().with_response(
        "/api/show",
        200,
        r#"{"modelfile":"FROM llama2","parameters":"stop [INST]","template":"{{ .Prompt }}",
            "details":{"family":"llama","parameter_size":"7B","quantization_level":"Q4_0"}}"#,
    );
    let client = client_with(&mock)?;

    let info = client.show_model("llama2").await?;
    assert_eq!(info.modelfile.as_deref(), Some("FROM llama2"));
    assert_eq!(info.details.quantization_level, "Q4_0");

    let request = mock.last_request("/api/show").unwrap();
    assert_eq!(request.verb, HttpVerb::POST);
    assert_eq!(request.body, Some(serde_json::json!({ "model": "llama2" })));
    Ok(())
}

#[tokio::test]
async fn test_show_model_not_found() -> Result<()> {
    let mock = MockTransport::new().with_response(
        "/api/show",
        404,
        r#"{"error":"model not found"}"#,
    );
    let client = client_with(&mock)?;

    let err = client.show_model("nonexistent").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert!(err.is_not_found());
    let api = err.api_error().unwrap();
    assert_eq!(api.status_code, 404);
    assert_eq!(api.message, "model not found");
    assert_eq!(
        err.to_string(),
        r#"failed to show model "nonexistent": Ollama API error (status 404): model not found"#
    );
    Ok(())
}

#[tokio::test]
async fn test_non_json_error_body_is_used_verbatim() -> Result<()> {
    let mock = MockTransport::new().with_response(
        "/api/tags",
        500,
        "Internal Server Error",
    );
    let client = client_with(&mock)?;

    let err = client.list_models().await.unwrap_err();
    let api = err.api_error().unwrap();
    assert_eq!(api.status_code, 500);
    assert_eq!(api.message, "Internal Server Error");
    assert!(err.to_string().starts_with("failed to list models: "));
    Ok(())
}

#[tokio::test]
async fn test_copy_and_delete_model() -> Result<()> {
    let mock = MockTransport::new()
        .with_response("/api/copy", 200, "")
        .with_response("/api/delete", 200, "");
    let client = client_with(&mock)?;

    client.copy_model("llama2", "llama2-backup").await?;
    client.delete_model("llama2-backup").await?;

    let copy = mock.last_request("/api/copy").unwrap();
    assert_eq!(copy.verb, HttpVerb::POST);
    assert_eq!(
        copy.body,
        Some(serde_json::json!({ "source": "llama2", "destination": "llama2-backup" }))
    );

    let delete = mock.last_request("/api/delete").unwrap();
    assert_eq!(delete.verb, HttpVerb::DELETE);
    assert_eq!(delete.body, Some(serde_json::json!({ "model": "llama2-backup" })));
    Ok(())
}

#[tokio::test]
async fn test_delete_missing_model_reports_status() -> Result<()> {
    let mock = MockTransport::new().with_response(
        "/api/delete",
        404,
        r#"{"error":"model 'ghost' not found"}"#,
    );
    let client = client_with(&mock)?;

    let err = client.delete_model("ghost").await.unwrap_err();
    assert_eq!(err.api_error().unwrap().message, "model 'ghost' not found");
    Ok(())
}

#[tokio::test]
async fn test_generate_sends_stream_false() -> Result<()> {
    let mock = MockTransport::new().with_response(
        "/api/generate",
        200,
        r#"{"model":"llama2","created_at":"2024-05-01T10:00:00Z","response":"The sky is blue.","done":true,
            "done_reason":"stop","total_duration":5000000000,"eval_count":20,"eval_duration":2000000000}"#,
    );
    let client = client_with(&mock)?;

    let mut request = GenerateRequest::new("llama2", "Why is the sky blue?")
        .options(ModelOptions::new().temperature(0.5));
    request.stream = true;

    let response = client.generate(&request).await?;
    assert_eq!(response.response, "The sky is blue.");
    assert!(response.done);
    assert_eq!(response.metrics.eval_count, 20);
    assert_eq!(response.tokens_per_second(), Some(10.0));

    // The caller's request is left untouched.
    assert!(request.stream);

    let sent = mock.last_request("/api/generate").unwrap();
    assert_eq!(sent.stream_flag(), Some(false));
    let body = sent.body.unwrap();
    assert_eq!(body["model"], "llama2");
    assert_eq!(body["prompt"], "Why is the sky blue?");
    assert_eq!(body["options"]["temperature"], 0.5);
    Ok(())
}

#[tokio::test]
async fn test_chat_sends_stream_false() -> Result<()> {
    let mock = MockTransport::new().with_response(
        "/api/chat",
        200,
        r#"{"model":"llama2","created_at":"2024-05-01T10:00:00Z","message":{"role":"assistant","content":"Hello there!"},"done":true}"#,
    );
    let client = client_with(&mock)?;

    let request = ChatRequest::new("llama2")
        .add_message(Message::system("You are terse."))
        .add_message(Message::user("Hi"));

    let response = client.chat(&request).await?;
    assert_eq!(response.message.role, Role::Assistant);
    assert_eq!(response.message.content, "Hello there!");

    let sent = mock.last_request("/api/chat").unwrap();
    assert_eq!(sent.stream_flag(), Some(false));
    let body = sent.body.unwrap();
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "Hi");
    Ok(())
}

#[tokio::test]
async fn test_embeddings() -> Result<()> {
    let mock = MockTransport::new().with_response(
        "/api/embeddings",
        200,
        r#"{"embedding":[0.5,-0.25,1.0]}"#,
    );
    let client = client_with(&mock)?;

    let response = client
        .embeddings(&EmbeddingRequest::new("nomic-embed-text", "hello"))
        .await?;
    assert_eq!(response.embedding, vec![0.5, -0.25, 1.0]);

    let sent = mock.last_request("/api/embeddings").unwrap();
    assert_eq!(
        sent.body,
        Some(serde_json::json!({ "model": "nomic-embed-text", "prompt": "hello" }))
    );
    Ok(())
}

#[tokio::test]
async fn test_process_status() -> Result<()> {
    let mock = MockTransport::new().with_response(
        "/api/ps",
        200,
        r#"{"models":[{"name":"mistral:latest","model":"mistral:latest","size":5137025024,"digest":"2ae6f6dd",
            "expires_at":"2024-06-04T14:38:31Z","size_vram":5137025024}]}"#,
    );
    let client = client_with(&mock)?;

    let status = client.process_status().await?;
    assert_eq!(status.models.len(), 1);
    assert_eq!(status.models[0].size_vram, Some(5137025024));
    assert_eq!(
        status.models[0].expires_at.as_deref(),
        Some("2024-06-04T14:38:31Z")
    );
    Ok(())
}

#[tokio::test]
async fn test_empty_success_body_decodes_to_defaults() -> Result<()> {
    let mock = MockTransport::new()
        .with_response("/api/tags", 200, "")
        .with_response("/api/embeddings", 200, "");
    let client = client_with(&mock)?;

    let models = client.list_models().await?;
    assert!(models.models.is_empty());

    let embedding = client
        .embeddings(&EmbeddingRequest::new("nomic-embed-text", "hello"))
        .await?;
    assert!(embedding.embedding.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_malformed_unary_body_is_a_decode_error() -> Result<()> {
    let mock = MockTransport::new().with_response(
        "/api/generate",
        200,
        "{\"model\":\"llama2\",\"response\":\"a\",\"done\":false}\n{\"model\":\"llama2\",\"response\":\"b\",\"done\":true}\n",
    );
    let client = client_with(&mock)?;

    let err = client
        .generate(&GenerateRequest::new("llama2", "hi"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().starts_with("failed to generate text: JSON error"));
    Ok(())
}

#[tokio::test]
async fn test_validation_fails_before_any_request() -> Result<()> {
    let mock = MockTransport::new();
    let client = client_with(&mock)?;

    let errors = vec![
        client.show_model("").await.unwrap_err(),
        client.copy_model("", "dest").await.unwrap_err(),
        client.copy_model("src", "").await.unwrap_err(),
        client.delete_model("").await.unwrap_err(),
        client.pull_model("", |_| {}).await.unwrap_err(),
        client.create_model("", "FROM llama2", |_| {}).await.unwrap_err(),
        client.create_model("mario", "", |_| {}).await.unwrap_err(),
        client.push_model("", |_| {}).await.unwrap_err(),
        client
            .generate(&GenerateRequest::new("", "prompt"))
            .await
            .unwrap_err(),
        client
            .generate_stream(&GenerateRequest::new("", "prompt"), |_| {})
            .await
            .unwrap_err(),
        client
            .chat(&ChatRequest::new("").add_message(Message::user("hi")))
            .await
            .unwrap_err(),
        client.chat(&ChatRequest::new("llama2")).await.unwrap_err(),
        client
            .chat_stream(&ChatRequest::new("llama2"), |_| {})
            .await
            .unwrap_err(),
        client
            .embeddings(&EmbeddingRequest::new("", "text"))
            .await
            .unwrap_err(),
        client
            .embeddings(&EmbeddingRequest::new("nomic-embed-text", ""))
            .await
            .unwrap_err(),
    ];

    for err in &errors {
        assert_eq!(err.kind(), ErrorKind::Validation, "{}", err);
    }
    assert!(mock.requests().is_empty());

    assert_eq!(
        errors[1].to_string(),
        r#"failed to copy model "" to "dest": source model name cannot be empty"#
    );
    assert_eq!(
        errors[11].to_string(),
        "failed to chat: at least one message is required"
    );
    Ok(())
}

#[tokio::test]
async fn test_base_url_defaults_and_overrides() -> Result<()> {
    let mock = Arc::new(MockTransport::new());

    let custom = OllamaClient::builder()
        .base_url("http://192.168.1.100:11434")
        .transport(mock.clone())
        .build()?;
    assert_eq!(custom.base_url().as_str(), "http://192.168.1.100:11434/");

    let bare = OllamaClient::builder()
        .base_url("gpu-box:11434")
        .transport(mock)
        .build()?;
    assert_eq!(bare.base_url().as_str(), "http://gpu-box:11434/");
    Ok(())
}

#[tokio::test]
async fn test_invalid_base_url_is_rejected() {
    let err = OllamaClient::builder()
        .base_url("http://")
        .transport(Arc::new(MockTransport::new()))
        .build()
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::Transport);
}
