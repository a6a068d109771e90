//! Reply generation client.
//!
//! One awaited POST per user action: no retry, no backoff and no timeout beyond
//! the HTTP client's defaults. The response body is returned untouched.

use async_trait::async_trait;
use mailassist_core_types::GenerationRequest;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/api/email/generate";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("API request failed with status {status}")]
    Status { status: u16 },
}

#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

pub struct HttpGenerationClient {
    client: Client,
    endpoint: String,
}

impl HttpGenerationClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, GenerationError> {
        let client = Client::builder().build().map_err(|err| {
            GenerationError::Transport(format!("failed to build HTTP client: {err}"))
        })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ReplyGenerator for HttpGenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        debug!(endpoint = %self.endpoint, tone = request.tone.name(), "requesting reply");
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                warn!(%err, "generation request failed");
                GenerationError::Transport(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "generation endpoint returned an error");
            return Err(GenerationError::Status {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|err| GenerationError::Transport(err.to_string()))
    }
}
