use std::time::Duration;

use thiserror::Error;

pub mod types;
pub mod utils;
pub mod admin_http;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Shared HTTP client factory for outbound calls to third-party APIs.
pub mod http {
    use super::*;

    /// Build a `reqwest::Client` with a per-request timeout.
    pub fn client_with_timeout(timeout: Duration) -> Result<reqwest::Client, CoreError> {
        reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("city-guide/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoreError::Network(e.to_string()))
    }

    /// Decode a JSON body, mapping transport and decode failures separately.
    pub async fn read_json<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, CoreError> {
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| CoreError::Network(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| CoreError::Parse(e.to_string()))
    }
}
