//! HTTP transport abstraction and the reqwest implementation.
//!
//! This module provides:
//! - `Transport` trait so the invoker can run against any GET backend
//! - `HttpTransport` implementation using reqwest

use std::time::Duration;

use reqwest::Url;

use crate::action::ActionError;
use crate::config::HttpConfig;

/// Status and body of a completed GET
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Trait for anything that can issue a single GET request
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Issue one GET. Non-2xx statuses are returned as responses, not errors.
    async fn get(&self, url: &Url) -> Result<TransportResponse, ActionError>;
}

/// Transport backed by a `reqwest::Client`
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a new transport from configuration
    pub fn new(config: &HttpConfig) -> Result<Self, ActionError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(config.accept_invalid_certs);

        if let Some(secs) = config.timeout_secs.filter(|secs| *secs > 0) {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, ActionError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

impl From<reqwest::Error> for ActionError {
    fn from(err: reqwest::Error) -> Self {
        ActionError::Transport(err.to_string())
    }
}
