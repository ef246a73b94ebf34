use super::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_credentials() -> Credentials {
    Credentials {
        github_token: "ghp_test".to_string(),
        openai_api_key: "sk-test".to_string(),
    }
}

fn client_for(server: &MockServer) -> EmbeddingClient {
    let config = EmbeddingsConfig {
        api_url: format!("{}/v1", server.uri()),
        ..EmbeddingsConfig::default()
    };
    EmbeddingClient::new(&config, &test_credentials()).expect("client builds")
}

#[test]
fn client_configuration() {
    let config = EmbeddingsConfig {
        api_url: "https://llm.example.com/openai/v1".to_string(),
        model: "text-embedding-3-small".to_string(),
        timeout_seconds: 5,
    };
    let client = EmbeddingClient::new(&config, &test_credentials())
        .expect("client builds")
        .with_timeout(Duration::from_secs(60));

    assert_eq!(client.model(), "text-embedding-3-small");
    assert_eq!(
        client.endpoint.as_str(),
        "https://llm.example.com/openai/v1/embeddings"
    );
    assert_eq!(client.authorization, "Bearer sk-test");
}

#[tokio::test]
async fn returns_first_embedding() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "model": "text-embedding-ada-002",
            "input": "parse yaml configs"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                {"object": "embedding", "index": 0, "embedding": [0.25, -0.5, 1.0]},
                {"object": "embedding", "index": 1, "embedding": [9.0, 9.0, 9.0]}
            ],
            "model": "text-embedding-ada-002"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let embedding = client_for(&server)
        .create_embedding("parse yaml configs")
        .expect("embedding created");

    assert_eq!(embedding, vec![0.25, -0.5, 1.0]);
}

#[tokio::test]
async fn error_message_comes_from_response_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Incorrect API key provided: sk-test.",
                "type": "invalid_request_error",
                "code": "invalid_api_key"
            }
        })))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .create_embedding("anything")
        .expect_err("401 should fail");

    assert!(
        error
            .to_string()
            .contains("Incorrect API key provided: sk-test."),
        "unexpected message: {error}"
    );
    assert!(matches!(error, RouterError::Api { status: 401, .. }));
}

#[tokio::test]
async fn generic_message_without_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let error = client_for(&server)
        .create_embedding("anything")
        .expect_err("503 should fail");

    match error {
        RouterError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 503);
            assert_eq!(message, "request failed with status 503");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_data_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let result = client_for(&server).create_embedding("anything");
    assert!(matches!(result, Err(RouterError::Decode { .. })));
}

#[test]
fn connection_failure_propagates_as_http_error() {
    let config = EmbeddingsConfig {
        // Port 9 (discard) is not expected to accept connections in the test environment
        api_url: "http://127.0.0.1:9/v1".to_string(),
        timeout_seconds: 2,
        ..EmbeddingsConfig::default()
    };
    let client = EmbeddingClient::new(&config, &test_credentials()).expect("client builds");

    assert!(matches!(
        client.create_embedding("anything"),
        Err(RouterError::Http(_))
    ));
}
