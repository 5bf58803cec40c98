use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("network error: {0}")]
    Network(String),
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<common::CoreError> for IntegrationError {
    fn from(e: common::CoreError) -> Self {
        match e {
            common::CoreError::Network(m) => Self::Network(m),
            common::CoreError::Parse(m) => Self::Parse(m),
        }
    }
}

impl From<reqwest::Error> for IntegrationError {
    fn from(e: reqwest::Error) -> Self { Self::Network(e.to_string()) }
}

/// Turn a non-2xx response into `IntegrationError::Status`.
pub(crate) async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, IntegrationError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(IntegrationError::Status { status: status.as_u16(), body })
}
