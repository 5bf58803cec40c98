use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use configs::TelegramConfig;

use super::types::{ApiResponse, File, InlineKeyboardMarkup, ReplyMarkup, Update};
use super::TelegramApi;
use crate::errors::BotError;

const PARSE_MODE: &str = "HTML";
/// Headroom on top of the long-poll timeout for the HTTP round trip.
const POLL_SLACK_SECS: u64 = 10;

/// reqwest-backed Bot API client.
///
/// Not Debug: the endpoint URLs embed the bot token.
pub struct TelegramClient {
    http: reqwest::Client,
    endpoint: String,
    file_endpoint: String,
}

impl TelegramClient {
    pub fn new(cfg: &TelegramConfig) -> Result<Self, BotError> {
        if cfg.token.trim().is_empty() {
            return Err(BotError::Telegram("telegram.token is empty".into()));
        }
        let http = common::http::client_with_timeout(Duration::from_secs(cfg.poll_timeout_secs + POLL_SLACK_SECS))?;
        let base = cfg.api_base.trim_end_matches('/');
        Ok(Self {
            http,
            endpoint: format!("{}/bot{}", base, cfg.token),
            file_endpoint: format!("{}/file/bot{}", base, cfg.token),
        })
    }

    async fn call<T: DeserializeOwned, B: Serialize + Sync>(&self, method: &str, body: &B) -> Result<T, BotError> {
        let resp = self
            .http
            .post(format!("{}/{}", self.endpoint, method))
            .json(body)
            .send()
            .await?;
        let parsed: ApiResponse<T> = common::http::read_json(resp).await?;
        if !parsed.ok {
            return Err(BotError::Telegram(format!(
                "{} failed ({}): {}",
                method,
                parsed.error_code.unwrap_or_default(),
                parsed.description.unwrap_or_default()
            )));
        }
        parsed
            .result
            .ok_or_else(|| BotError::Telegram(format!("{} returned no result", method)))
    }
}

#[async_trait]
impl TelegramApi for TelegramClient {
    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, BotError> {
        let body = json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });
        self.call("getUpdates", &body).await
    }

    #[instrument(skip(self, text, markup))]
    async fn send_message(&self, chat_id: i64, text: &str, markup: Option<ReplyMarkup>) -> Result<(), BotError> {
        let mut body = json!({ "chat_id": chat_id, "text": text, "parse_mode": PARSE_MODE });
        if let Some(m) = markup {
            body["reply_markup"] = serde_json::to_value(m).map_err(|e| BotError::Telegram(e.to_string()))?;
        }
        let _: Value = self.call("sendMessage", &body).await?;
        Ok(())
    }

    #[instrument(skip(self, text, markup))]
    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        markup: Option<InlineKeyboardMarkup>,
    ) -> Result<(), BotError> {
        let mut body = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
            "parse_mode": PARSE_MODE,
        });
        if let Some(m) = markup {
            body["reply_markup"] = serde_json::to_value(m).map_err(|e| BotError::Telegram(e.to_string()))?;
        }
        match self.call::<Value, _>("editMessageText", &body).await {
            // Pressing the same page twice is not an error worth reporting.
            Err(BotError::Telegram(msg)) if msg.contains("message is not modified") => {
                debug!("edit skipped: message is not modified");
                Ok(())
            }
            other => other.map(|_| ()),
        }
    }

    async fn send_location(&self, chat_id: i64, latitude: f64, longitude: f64) -> Result<(), BotError> {
        let body = json!({ "chat_id": chat_id, "latitude": latitude, "longitude": longitude });
        let _: Value = self.call("sendLocation", &body).await?;
        Ok(())
    }

    async fn send_contact(&self, chat_id: i64, phone_number: &str, first_name: &str) -> Result<(), BotError> {
        let body = json!({ "chat_id": chat_id, "phone_number": phone_number, "first_name": first_name });
        let _: Value = self.call("sendContact", &body).await?;
        Ok(())
    }

    async fn answer_callback_query(&self, callback_query_id: &str, text: Option<&str>, show_alert: bool) -> Result<(), BotError> {
        let mut body = json!({ "callback_query_id": callback_query_id, "show_alert": show_alert });
        if let Some(t) = text {
            body["text"] = Value::from(t);
        }
        let _: Value = self.call("answerCallbackQuery", &body).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, BotError> {
        let file: File = self.call("getFile", &json!({ "file_id": file_id })).await?;
        let path = file
            .file_path
            .ok_or_else(|| BotError::Telegram(format!("file {} has no path", file.file_id)))?;
        let resp = self
            .http
            .get(format!("{}/{}", self.file_endpoint, path))
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }
}
