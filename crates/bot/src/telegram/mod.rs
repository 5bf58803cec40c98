//! Bot API transport: the `TelegramApi` seam, its reqwest client and a recording fake.

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::errors::BotError;
pub use client::TelegramClient;
use types::{InlineKeyboardMarkup, ReplyMarkup, Update};

/// Bot API methods the dispatcher and poller use.
#[async_trait]
pub trait TelegramApi: Send + Sync {
    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, BotError>;
    async fn send_message(&self, chat_id: i64, text: &str, markup: Option<ReplyMarkup>) -> Result<(), BotError>;
    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        markup: Option<InlineKeyboardMarkup>,
    ) -> Result<(), BotError>;
    async fn send_location(&self, chat_id: i64, latitude: f64, longitude: f64) -> Result<(), BotError>;
    async fn send_contact(&self, chat_id: i64, phone_number: &str, first_name: &str) -> Result<(), BotError>;
    async fn answer_callback_query(&self, callback_query_id: &str, text: Option<&str>, show_alert: bool) -> Result<(), BotError>;
    /// `getFile` followed by the file download.
    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, BotError>;
}

/// Recording fake for tests
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard};

    #[derive(Clone, Debug, PartialEq)]
    pub enum Outgoing {
        Message { chat_id: i64, text: String, markup: Option<ReplyMarkup> },
        Edit { chat_id: i64, message_id: i64, text: String, markup: Option<InlineKeyboardMarkup> },
        Location { chat_id: i64, latitude: f64, longitude: f64 },
        Contact { chat_id: i64, phone_number: String, first_name: String },
        CallbackAnswer { id: String, text: Option<String>, show_alert: bool },
    }

    #[derive(Default)]
    pub struct RecordingTelegram {
        outgoing: Mutex<Vec<Outgoing>>,
        files: Mutex<HashMap<String, Vec<u8>>>,
    }

    fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
        m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    impl RecordingTelegram {
        pub fn new() -> Self { Self::default() }

        pub fn with_file(self, file_id: &str, bytes: Vec<u8>) -> Self {
            guard(&self.files).insert(file_id.to_string(), bytes);
            self
        }

        pub fn outgoing(&self) -> Vec<Outgoing> { guard(&self.outgoing).clone() }

        /// Text of every sent or edited message, in order.
        pub fn texts(&self) -> Vec<String> {
            self.outgoing()
                .into_iter()
                .filter_map(|o| match o {
                    Outgoing::Message { text, .. } | Outgoing::Edit { text, .. } => Some(text),
                    _ => None,
                })
                .collect()
        }

        fn push(&self, o: Outgoing) { guard(&self.outgoing).push(o); }
    }

    #[async_trait]
    impl TelegramApi for RecordingTelegram {
        async fn get_updates(&self, _offset: i64, _timeout_secs: u64) -> Result<Vec<Update>, BotError> {
            Ok(Vec::new())
        }

        async fn send_message(&self, chat_id: i64, text: &str, markup: Option<ReplyMarkup>) -> Result<(), BotError> {
            self.push(Outgoing::Message { chat_id, text: text.to_string(), markup });
            Ok(())
        }

        async fn edit_message_text(
            &self,
            chat_id: i64,
            message_id: i64,
            text: &str,
            markup: Option<InlineKeyboardMarkup>,
        ) -> Result<(), BotError> {
            self.push(Outgoing::Edit { chat_id, message_id, text: text.to_string(), markup });
            Ok(())
        }

        async fn send_location(&self, chat_id: i64, latitude: f64, longitude: f64) -> Result<(), BotError> {
            self.push(Outgoing::Location { chat_id, latitude, longitude });
            Ok(())
        }

        async fn send_contact(&self, chat_id: i64, phone_number: &str, first_name: &str) -> Result<(), BotError> {
            self.push(Outgoing::Contact { chat_id, phone_number: phone_number.to_string(), first_name: first_name.to_string() });
            Ok(())
        }

        async fn answer_callback_query(&self, callback_query_id: &str, text: Option<&str>, show_alert: bool) -> Result<(), BotError> {
            self.push(Outgoing::CallbackAnswer {
                id: callback_query_id.to_string(),
                text: text.map(str::to_string),
                show_alert,
            });
            Ok(())
        }

        async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, BotError> {
            guard(&self.files)
                .get(file_id)
                .cloned()
                .ok_or_else(|| BotError::Telegram(format!("unknown file {file_id}")))
        }
    }
}
