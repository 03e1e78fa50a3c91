use async_trait::async_trait;
use log::{ debug, error };
use reqwest::Client as HttpClient;
use thiserror::Error;
use url::Url;

use crate::models::api::{ AskRequest, AskResponse, ErrorResponse };
use crate::models::chat::Turn;

/// Used when a failed response does not even carry a JSON body.
pub const SERVER_COMMUNICATION_ERROR: &str = "Error communicating with the server.";

#[derive(Debug, Error)]
pub enum RelayError {
    /// The relay could not be reached, or its answer could not be read.
    #[error("could not reach the relay: {0}")]
    Connectivity(String),

    /// The relay answered with a non-success status.
    #[error("relay responded {status}: {message}")]
    Rejected {
        status: u16,
        message: String,
    },
}

#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn ask(&self, question: &str, history: &[Turn]) -> Result<String, RelayError>;
}

pub struct HttpRelayClient {
    http: HttpClient,
    endpoint: Url,
}

impl HttpRelayClient {
    pub fn new(endpoint: Url) -> Self {
        Self { http: HttpClient::new(), endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn ask(&self, question: &str, history: &[Turn]) -> Result<String, RelayError> {
        let body = AskRequest {
            question: question.to_string(),
            history: Some(history.to_vec()),
        };

        debug!("POST {} ({} turns of history)", self.endpoint, history.len());
        let resp = self.http
            .post(self.endpoint.clone())
            .json(&body)
            .send().await
            .map_err(|e| {
                error!("Failed to reach relay: {}", e);
                RelayError::Connectivity(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            let message = match resp.json::<ErrorResponse>().await {
                Ok(ErrorResponse { error: Some(message), .. }) if !message.is_empty() => message,
                Ok(_) => status.canonical_reason().unwrap_or_default().to_string(),
                Err(_) => SERVER_COMMUNICATION_ERROR.to_string(),
            };
            error!("Relay error {}: {}", status, message);
            return Err(RelayError::Rejected { status: status.as_u16(), message });
        }

        let data = resp
            .json::<AskResponse>().await
            .map_err(|e| RelayError::Connectivity(e.to_string()))?;
        Ok(data.answer)
    }
}
