use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("telegram api error: {0}")]
    Telegram(String),
    #[error(transparent)]
    Service(#[from] service::errors::ServiceError),
    #[error(transparent)]
    Integration(#[from] integrations::IntegrationError),
}

impl From<reqwest::Error> for BotError {
    fn from(e: reqwest::Error) -> Self { Self::Telegram(e.to_string()) }
}

impl From<common::CoreError> for BotError {
    fn from(e: common::CoreError) -> Self { Self::Telegram(e.to_string()) }
}
