//! Clients for the third-party APIs the directory relies on.
//! - `openai`: structured extraction, search keywords, translation, speech recognition
//! - `geocoding`: address to coordinates
//!
//! Callers depend on the [`Assistant`] and [`Geocoder`] traits so that tests can
//! swap in the in-memory fakes from [`mock`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod errors;
pub mod geocoding;
pub mod openai;

pub use errors::IntegrationError;
pub use geocoding::GoogleGeocoder;
pub use openai::OpenAiAssistant;

/// Service record proposed by the language model from free text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDraft {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub social_media: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Language-model and speech features used by the bot and the admin API.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Extract a structured service from free text. `categories` lists the allowed category names.
    async fn extract_service(&self, text: &str, categories: &[String]) -> Result<Option<ServiceDraft>, IntegrationError>;
    /// Reduce a user request to database search keywords.
    async fn extract_search_query(&self, text: &str) -> Result<Option<String>, IntegrationError>;
    /// Translate to Ukrainian; text already in Ukrainian comes back unchanged.
    async fn translate_to_ukrainian(&self, text: &str) -> Result<String, IntegrationError>;
    /// Speech recognition of an OGG/Opus voice note.
    async fn transcribe(&self, audio: Vec<u8>) -> Result<Option<String>, IntegrationError>;
}

/// Address lookup.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the address does not resolve.
    async fn geocode(&self, address: &str) -> Result<Option<(f64, f64)>, IntegrationError>;
}

/// Simple in-memory fakes for tests and local runs without API keys.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Geocoder answering from a fixed address table.
    #[derive(Default)]
    pub struct StaticGeocoder {
        pub table: Mutex<HashMap<String, (f64, f64)>>,
    }

    impl StaticGeocoder {
        pub fn with(entries: &[(&str, (f64, f64))]) -> Self {
            let table = entries.iter().map(|(a, c)| (a.to_string(), *c)).collect();
            Self { table: Mutex::new(table) }
        }
    }

    #[async_trait]
    impl Geocoder for StaticGeocoder {
        async fn geocode(&self, address: &str) -> Result<Option<(f64, f64)>, IntegrationError> {
            let table = self.table.lock().map_err(|e| IntegrationError::Config(e.to_string()))?;
            Ok(table.get(address).copied())
        }
    }

    /// Assistant with canned answers.
    #[derive(Default, Clone)]
    pub struct CannedAssistant {
        pub draft: Option<ServiceDraft>,
        /// When `None`, the search keywords are the input text itself.
        pub keywords: Option<String>,
        pub transcript: Option<String>,
    }

    #[async_trait]
    impl Assistant for CannedAssistant {
        async fn extract_service(&self, _text: &str, _categories: &[String]) -> Result<Option<ServiceDraft>, IntegrationError> {
            Ok(self.draft.clone())
        }

        async fn extract_search_query(&self, text: &str) -> Result<Option<String>, IntegrationError> {
            Ok(Some(self.keywords.clone().unwrap_or_else(|| text.to_string())))
        }

        async fn translate_to_ukrainian(&self, text: &str) -> Result<String, IntegrationError> {
            Ok(text.to_string())
        }

        async fn transcribe(&self, _audio: Vec<u8>) -> Result<Option<String>, IntegrationError> {
            Ok(self.transcript.clone())
        }
    }
}
