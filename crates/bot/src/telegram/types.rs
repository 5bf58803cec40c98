//! Subset of the Bot API objects the bot reads and writes.

use serde::{Deserialize, Serialize};

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

impl Update {
    /// Who sent the update: the user for messages and button presses, else the chat.
    pub fn sender_id(&self) -> Option<i64> {
        if let Some(cq) = &self.callback_query {
            return Some(cq.from.id);
        }
        self.message.as_ref().map(|m| m.from.as_ref().map_or(m.chat.id, |u| u.id))
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub voice: Option<Voice>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref().filter(|l| !l.is_empty()) {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Chat {
    pub id: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Voice {
    pub file_id: String,
    #[serde(default)]
    pub duration: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct File {
    pub file_id: String,
    #[serde(default)]
    pub file_path: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct KeyboardButton {
    pub text: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Inline(InlineKeyboardMarkup),
    Keyboard(ReplyKeyboardMarkup),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_callback_update() {
        let raw = r#"{
            "update_id": 10,
            "callback_query": {
                "id": "cb1",
                "from": {"id": 7, "first_name": "Олена", "is_bot": false},
                "message": {"message_id": 3, "chat": {"id": 7, "type": "private"}, "text": "x"},
                "data": "pag:next:2:Послуги краси"
            }
        }"#;
        let u: Update = serde_json::from_str(raw).unwrap();
        let cq = u.callback_query.unwrap();
        assert_eq!(cq.data.as_deref(), Some("pag:next:2:Послуги краси"));
        assert_eq!(cq.message.unwrap().chat.id, 7);
        assert!(u.message.is_none());
    }

    #[test]
    fn full_name_joins_parts() {
        let u = User { id: 1, first_name: "Тарас".into(), last_name: Some("Шевченко".into()), username: None };
        assert_eq!(u.full_name(), "Тарас Шевченко");
        let u = User { last_name: None, ..u };
        assert_eq!(u.full_name(), "Тарас");
    }

    #[test]
    fn markup_serializes_untagged() {
        let m = ReplyMarkup::Inline(InlineKeyboardMarkup {
            inline_keyboard: vec![vec![InlineKeyboardButton { text: "a".into(), callback_data: Some("menu:root".into()), url: None }]],
        });
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["inline_keyboard"][0][0]["callback_data"], "menu:root");
        assert!(v["inline_keyboard"][0][0].get("url").is_none());
    }

    #[test]
    fn error_envelope() {
        let r: ApiResponse<Vec<Update>> =
            serde_json::from_str(r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#).unwrap();
        assert!(!r.ok && r.result.is_none());
        assert_eq!(r.error_code, Some(401));
    }
}
