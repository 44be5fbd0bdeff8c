use campus_assistant::domain::error::DomainError;
use campus_assistant::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use campus_assistant::infrastructure::embeddings::ollama::OllamaProvider;
use campus_assistant::infrastructure::embeddings::openai::OpenAiProvider;
use campus_assistant::infrastructure::embeddings::voyage::VoyageProvider;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn texts(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("row {i}")).collect()
}

async fn mount_tags(server: &MockServer, models: &[&str]) {
    let models: Vec<_> = models.iter().map(|m| json!({"name": m})).collect();
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": models})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_ollama_embeds_and_checks_model_once() {
    let server = MockServer::start().await;
    mount_tags(&server, &["all-minilm:latest"]).await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({"model": "all-minilm"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[0.1, 0.2], [0.3, 0.4]]
        })))
        .mount(&server)
        .await;

    let provider = OllamaProvider::new(Some(server.uri()), None).unwrap();
    assert_eq!(provider.dimension(), 384);
    assert_eq!(provider.model_id(), "all-minilm");

    let vectors = provider.embed(&texts(2), InputType::Document).await.unwrap();
    assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    provider.embed(&texts(2), InputType::Query).await.unwrap();

    let tag_checks = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/api/tags")
        .count();
    assert_eq!(tag_checks, 1);
}

#[tokio::test]
async fn test_ollama_missing_model_is_reported() {
    let server = MockServer::start().await;
    mount_tags(&server, &["nomic-embed-text:latest"]).await;

    let provider = OllamaProvider::new(Some(server.uri()), None).unwrap();
    let err = provider.embed(&texts(1), InputType::Query).await.unwrap_err();

    assert!(matches!(err, DomainError::Embedding(msg) if msg.contains("ollama pull all-minilm")));
}

#[tokio::test]
async fn test_openai_reorders_by_index_and_batches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"index": 1, "embedding": [0.0, 1.0]},
                {"index": 0, "embedding": [1.0, 0.0]}
            ]
        })))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("sk-test".into(), None, Some(server.uri())).unwrap();
    let vectors = provider.embed(&texts(2), InputType::Document).await.unwrap();
    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);

    // 40 texts go out as a batch of 32 and a batch of 8.
    provider.embed(&texts(40), InputType::Document).await.unwrap();
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_voyage_sends_input_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({"input_type": "query", "model": "voyage-4-lite"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": [0.5, 0.5]}]
        })))
        .mount(&server)
        .await;

    let provider = VoyageProvider::new("pa-test".into(), None, Some(server.uri())).unwrap();
    let vector = provider.embed_one("hostel fees", InputType::Query).await.unwrap();
    assert_eq!(vector, vec![0.5, 0.5]);
}

#[tokio::test]
async fn test_http_error_surfaces_as_embedding_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("wrong".into(), None, Some(server.uri())).unwrap();
    let err = provider.embed(&texts(1), InputType::Document).await.unwrap_err();
    assert!(matches!(err, DomainError::Embedding(msg) if msg.contains("401")));
}
