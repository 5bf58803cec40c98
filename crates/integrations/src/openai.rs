//! OpenAI chat-completion and audio-transcription client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use configs::OpenAiConfig;

use crate::errors::{ensure_success, IntegrationError};
use crate::{Assistant, ServiceDraft};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// OpenAI-backed [`Assistant`].
///
/// Does not derive Debug: the struct holds the API key.
pub struct OpenAiAssistant {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    transcription_model: String,
}

impl OpenAiAssistant {
    pub fn new(cfg: &OpenAiConfig) -> Result<Self, IntegrationError> {
        if cfg.api_key.trim().is_empty() {
            return Err(IntegrationError::Config("openai.api_key is empty".into()));
        }
        let http = common::http::client_with_timeout(Duration::from_secs(cfg.request_timeout_secs))?;
        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            transcription_model: cfg.transcription_model.clone(),
        })
    }

    async fn complete(&self, system: &str, user: String, json_mode: bool) -> Result<Option<String>, IntegrationError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system.to_string() },
                ChatMessage { role: "user", content: user },
            ],
            response_format: json_mode.then_some(ResponseFormat { kind: "json_object" }),
        };
        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        let parsed: ChatResponse = common::http::read_json(resp).await?;
        Ok(first_content(parsed))
    }
}

fn first_content(resp: ChatResponse) -> Option<String> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

pub(crate) fn service_prompt(text: &str, categories: &[String]) -> String {
    let allowed = categories
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Проаналізуй текст і витягни з нього структуровану інформацію про послугу.\n\
         Текст: \"{text}\"\n\n\
         Поверни JSON з ключами:\n\
         - name: назва послуги або компанії\n\
         - category: одна з категорій: {allowed}\n\
         - address: адреса\n\
         - phone: номер телефону\n\
         - schedule: графік роботи\n\
         - social_media: посилання на соцмережі або сайт\n\
         - description: короткий опис\n\n\
         Якщо якоїсь інформації немає, постав null."
    )
}

pub(crate) fn search_prompt(text: &str) -> String {
    format!(
        "Проаналізуй запит користувача і поверни ключові слова для пошуку в базі послуг.\n\
         Запит: \"{text}\"\n\n\
         Поверни лише ключові слова без пояснень. Наприклад, на \"де підстригтися\" \
         поверни \"перукарня\", на \"полагодити колесо\" поверни \"шиномонтаж\"."
    )
}

/// Parse the JSON object the model returned for a service extraction.
pub(crate) fn parse_draft(content: &str) -> Result<ServiceDraft, IntegrationError> {
    serde_json::from_str(content).map_err(|e| IntegrationError::Parse(e.to_string()))
}

#[async_trait]
impl Assistant for OpenAiAssistant {
    #[instrument(skip(self, text, categories), fields(len = text.len()))]
    async fn extract_service(&self, text: &str, categories: &[String]) -> Result<Option<ServiceDraft>, IntegrationError> {
        let content = self
            .complete(
                "You are a helpful assistant that extracts structured data from text and returns it as JSON.",
                service_prompt(text, categories),
                true,
            )
            .await?;
        let Some(content) = content else { return Ok(None) };
        match parse_draft(&content) {
            Ok(draft) => Ok(Some(draft)),
            Err(e) => {
                warn!(error = %e, "model returned an unusable service object");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, text))]
    async fn extract_search_query(&self, text: &str) -> Result<Option<String>, IntegrationError> {
        let keywords = self
            .complete(
                "You are a helpful assistant that extracts keywords for a database search from user queries.",
                search_prompt(text),
                false,
            )
            .await?;
        let keywords = keywords.map(|k| k.trim_matches(|c| c == '"' || c == '\'').trim().to_string());
        debug!(?keywords, "search keywords extracted");
        Ok(keywords.filter(|k| !k.is_empty()))
    }

    #[instrument(skip(self, text))]
    async fn translate_to_ukrainian(&self, text: &str) -> Result<String, IntegrationError> {
        let translated = self
            .complete(
                "Translate the user's message to Ukrainian. If it is already Ukrainian, return it unchanged. Return only the translation.",
                text.to_string(),
                false,
            )
            .await?;
        Ok(translated.unwrap_or_else(|| text.to_string()))
    }

    #[instrument(skip(self, audio), fields(bytes = audio.len()))]
    async fn transcribe(&self, audio: Vec<u8>) -> Result<Option<String>, IntegrationError> {
        let file = Part::bytes(audio)
            .file_name("voice.ogg")
            .mime_str("audio/ogg")
            .map_err(|e| IntegrationError::Config(e.to_string()))?;
        let form = Form::new()
            .part("file", file)
            .text("model", self.transcription_model.clone());
        let resp = self
            .http
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        let parsed: TranscriptionResponse = common::http::read_json(resp).await?;
        let text = parsed.text.trim().to_string();
        Ok((!text.is_empty()).then_some(text))
    }
}
