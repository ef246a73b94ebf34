#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::Embedder;
use crate::config::{Credentials, EmbeddingsConfig};
use crate::http::{build_agent, parse_json, read_body};
use crate::{Result, RouterError};

const SERVICE: &str = "Embeddings";
const USER_AGENT: &str = "repo-router";

/// Client for an OpenAI-compatible `/embeddings` endpoint.
///
/// One request per text, no batching and no retry.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    endpoint: Url,
    model: String,
    authorization: String,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    #[inline]
    pub fn new(config: &EmbeddingsConfig, credentials: &Credentials) -> Result<Self> {
        config.validate()?;

        let endpoint = config
            .base_url()?
            .join("embeddings")
            .map_err(|_| crate::config::ConfigError::InvalidUrl(config.api_url.clone()))?;

        Ok(Self {
            endpoint,
            model: config.model.clone(),
            authorization: format!("Bearer {}", credentials.openai_api_key),
            agent: build_agent(Duration::from_secs(config.timeout_seconds), USER_AGENT),
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout, USER_AGENT);
        self
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Embedder for EmbeddingClient {
    /// Embed `text` and return the first vector of the response
    #[inline]
    fn create_embedding(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Generating embedding for text (length: {})", text.len());

        let request = EmbedRequest {
            model: &self.model,
            input: text,
        };
        let request_json = serde_json::to_string(&request).map_err(|e| RouterError::Decode {
            service: SERVICE,
            message: format!("failed to serialize request: {e}"),
        })?;

        let response = self
            .agent
            .post(self.endpoint.as_str())
            .header("Authorization", &self.authorization)
            .header("Content-Type", "application/json")
            .send(&request_json);

        let body = read_body(SERVICE, response)?;
        let parsed: EmbedResponse = parse_json(SERVICE, &body)?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| RouterError::Decode {
                service: SERVICE,
                message: "response contained no embeddings".to_string(),
            })?;

        debug!("Generated embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }
}
