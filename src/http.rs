// Shared ureq plumbing for the GitHub and embeddings clients

use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};
use ureq::Agent;
use ureq::http::Response;

use crate::{Result, RouterError};

/// Build an agent that hands non-success responses back to the caller
/// so the provider's error body can be read
pub(crate) fn build_agent(timeout: Duration, user_agent: &str) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .user_agent(user_agent)
        .http_status_as_error(false)
        .build()
        .into()
}

/// Read the body of `response`, turning non-success statuses into `RouterError::Api`
pub(crate) fn read_body(
    service: &'static str,
    response: std::result::Result<Response<ureq::Body>, ureq::Error>,
) -> Result<String> {
    let mut response = response.map_err(|e| {
        error!("{} request failed: {}", service, e);
        RouterError::Http(e)
    })?;

    let status = response.status();
    let body = response.body_mut().read_to_string().map_err(|e| {
        error!("Failed to read {} response body: {}", service, e);
        RouterError::Http(e)
    })?;

    if status.is_success() {
        debug!("{} responded {} ({} bytes)", service, status, body.len());
        return Ok(body);
    }

    let message = extract_error_message(&body)
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
    error!("{} returned {}: {}", service, status, message);

    Err(RouterError::Api {
        service,
        status: status.as_u16(),
        message,
    })
}

pub(crate) fn parse_json<T: DeserializeOwned>(service: &'static str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        error!("Failed to parse {} response: {}", service, e);
        RouterError::Decode {
            service,
            message: e.to_string(),
        }
    })
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"error": {"message": ...}}`, `{"error": "..."}` and `{"message": ...}`.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    let message = value
        .get("error")
        .and_then(|error| error.get("message").or(Some(error)))
        .and_then(serde_json::Value::as_str)
        .or_else(|| value.get("message").and_then(serde_json::Value::as_str))?;

    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

#[cfg(test)]
mod tests {
    use super::extract_error_message;

    #[test]
    fn nested_error_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("Incorrect API key provided")
        );
    }

    #[test]
    fn flat_messages() {
        assert_eq!(
            extract_error_message(r#"{"message": "Bad credentials"}"#).as_deref(),
            Some("Bad credentials")
        );
        assert_eq!(
            extract_error_message(r#"{"error": "quota exceeded"}"#).as_deref(),
            Some("quota exceeded")
        );
    }

    #[test]
    fn missing_message() {
        assert_eq!(extract_error_message(""), None);
        assert_eq!(extract_error_message("<html>502</html>"), None);
        assert_eq!(extract_error_message(r#"{"error": {"code": 500}}"#), None);
        assert_eq!(extract_error_message(r#"{"message": "  "}"#), None);
    }
}
