#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// End-to-end router tests against mocked GitHub and embeddings APIs

use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use repo_router::RouterError;
use repo_router::config::{
    Config, ConfigError, Credentials, EmbeddingsConfig, GITHUB_TOKEN_VAR, GitHubConfig,
    OPENAI_API_KEY_VAR, SelectConfig,
};
use repo_router::router::Router;
use repo_router::select::{RepoSelect, SelectBinding};

fn test_config(server: &MockServer) -> Config {
    Config {
        github: GitHubConfig {
            api_url: server.uri(),
            ..GitHubConfig::default()
        },
        embeddings: EmbeddingsConfig {
            api_url: format!("{}/v1", server.uri()),
            ..EmbeddingsConfig::default()
        },
        ..Config::default()
    }
}

fn test_credentials() -> Credentials {
    Credentials {
        github_token: "ghp_integration".to_string(),
        openai_api_key: "sk-integration".to_string(),
    }
}

async fn mount_embedding(server: &MockServer, input: &str, vector: [f32; 3]) {
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("Authorization", "Bearer sk-integration"))
        .and(body_partial_json(json!({"input": input})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{"object": "embedding", "index": 0, "embedding": vector}]
        })))
        .mount(server)
        .await;
}

async fn mount_github(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/user/orgs"))
        .and(header("Authorization", "Bearer ghp_integration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"login": "acme"}])))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "name": "dotfiles",
                "full_name": "me/dotfiles",
                "description": "Shell and editor configuration",
                "topics": ["zsh", "neovim"]
            }
        ])))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "name": "billing",
                "full_name": "acme/billing",
                "description": "Invoices and payment processing",
                "topics": ["payments"]
            },
            {
                "name": "web",
                "full_name": "acme/web",
                "description": null,
                "topics": []
            }
        ])))
        .mount(server)
        .await;
}

async fn mount_repository_embeddings(server: &MockServer) {
    mount_embedding(server, "Shell and editor configuration", [0.0, 0.0, 1.0]).await;
    mount_embedding(server, "Invoices and payment processing", [1.0, 0.0, 0.0]).await;
    mount_embedding(server, "web", [0.0, 1.0, 0.0]).await;
}

#[tokio::test]
async fn initialize_and_rank_against_mocked_apis() {
    let server = MockServer::start().await;
    mount_github(&server).await;
    mount_repository_embeddings(&server).await;
    mount_embedding(&server, "card payment fails on checkout page", [0.8, 0.6, 0.0]).await;

    let mut router =
        Router::new(&test_config(&server), &test_credentials()).expect("router builds");
    let added = router.initialize().expect("initialization succeeds");

    assert_eq!(added, 3);
    let billing = router.get("acme/billing").expect("billing indexed");
    assert_eq!(
        billing.keywords,
        vec!["payments", "billing", "invoices", "and", "payment", "processing"]
    );

    let ranking = router
        .rank("card payment fails on checkout page")
        .expect("ranking succeeds");
    let names: Vec<&str> = ranking.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["acme/billing", "acme/web", "me/dotfiles"]);
    assert!((ranking[0].score - 0.8).abs() < 1e-5);
    assert!((ranking[1].score - 0.6).abs() < 1e-5);
    assert!(ranking[2].score.abs() < 1e-6);
}

#[tokio::test]
async fn missing_credentials_fail_before_any_request() {
    let server = MockServer::start().await;
    let config = test_config(&server);

    let result = Router::from_lookup(&config, |key| {
        (key == GITHUB_TOKEN_VAR).then(|| "ghp_integration".to_string())
    });

    assert!(matches!(
        result,
        Err(RouterError::Config(ConfigError::MissingCredential(
            OPENAI_API_KEY_VAR
        )))
    ));
    let requests = server
        .received_requests()
        .await
        .expect("request recording is enabled");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn embeddings_outage_aborts_initialization() {
    let server = MockServer::start().await;
    mount_github(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached for requests", "type": "requests"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut router =
        Router::new(&test_config(&server), &test_credentials()).expect("router builds");
    let error = router.initialize().expect_err("rate limit fails initialization");

    assert!(error.to_string().contains("Rate limit reached for requests"));
    assert!(router.is_empty());
}

#[tokio::test]
async fn binding_filters_picker_from_live_router() {
    let server = MockServer::start().await;
    mount_github(&server).await;
    mount_repository_embeddings(&server).await;
    mount_embedding(&server, "refund the invoice", [1.0, 0.1, 0.0]).await;

    let config = Config {
        select: SelectConfig {
            debounce_ms: 20,
            max_visible: Some(1),
        },
        ..test_config(&server)
    };
    let mut router = Router::new(&config, &test_credentials()).expect("router builds");
    router.initialize().expect("initialization succeeds");

    let select = Arc::new(Mutex::new(RepoSelect::new([
        "me/dotfiles",
        "acme/web",
        "acme/billing",
    ])));
    let binding = SelectBinding::new(Arc::new(router), Arc::clone(&select), &config.select);

    binding.on_input("refund");
    binding.on_input("refund the");
    binding.on_input("refund the invoice");
    tokio::time::sleep(Duration::from_millis(5)).await;
    binding.close().await;

    let select = select.lock().expect("lock not poisoned").clone();
    assert_eq!(select.visible(), vec!["acme/billing"]);
    assert_eq!(select.selected(), Some("acme/billing"));
}
