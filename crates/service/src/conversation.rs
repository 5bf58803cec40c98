//! "Contact administrator" conversation.
//!
//! `transition` is pure; `ConversationStore` keeps the per-user state between
//! updates. A user with no entry is `Idle`.

use dashmap::DashMap;
use tracing::debug;

use crate::callbacks::{Callback, ContactType};
use crate::presenter::{Action, Rendered};

pub const CANCEL_COMMAND: &str = "/cancel";

/// Carried from the type choice until the conversation ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactContext {
    pub contact_type: ContactType,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingContactMessage(ContactContext),
    AwaitingServiceDetails(ContactContext),
}

impl ConversationState {
    fn awaiting(contact_type: ContactType) -> Self {
        let ctx = ContactContext { contact_type };
        match contact_type {
            ContactType::Message => ConversationState::AwaitingContactMessage(ctx),
            ContactType::SuggestService => ConversationState::AwaitingServiceDetails(ctx),
        }
    }

    pub fn is_idle(&self) -> bool { matches!(self, ConversationState::Idle) }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversationInput {
    StartContact,
    ChooseType(ContactType),
    Text(String),
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prompt {
    ChooseType,
    EnterMessage,
    EnterServiceDetails,
    EmptyText,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversationOutcome {
    Prompt(Prompt),
    /// Terminal: deliver `text` to the administrator.
    Submitted { contact_type: ContactType, text: String },
    Cancelled,
    /// Input is not part of the conversation; route it elsewhere.
    NotHandled,
}

pub fn transition(state: ConversationState, input: ConversationInput) -> (ConversationState, ConversationOutcome) {
    use ConversationInput as In;
    use ConversationOutcome as Out;
    use ConversationState as S;

    match (state, input) {
        (_, In::Cancel) => (S::Idle, Out::Cancelled),
        (_, In::StartContact) => (S::Idle, Out::Prompt(Prompt::ChooseType)),
        (_, In::ChooseType(t)) => {
            let prompt = match t {
                ContactType::Message => Prompt::EnterMessage,
                ContactType::SuggestService => Prompt::EnterServiceDetails,
            };
            (S::awaiting(t), Out::Prompt(prompt))
        }
        (S::Idle, In::Text(_)) => (S::Idle, Out::NotHandled),
        (S::AwaitingContactMessage(ctx) | S::AwaitingServiceDetails(ctx), In::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return (state, Out::Prompt(Prompt::EmptyText));
            }
            (S::Idle, Out::Submitted { contact_type: ctx.contact_type, text: text.to_string() })
        }
    }
}

impl Prompt {
    pub fn render(self) -> Rendered {
        match self {
            Prompt::ChooseType => Rendered {
                text: "Оберіть, що ви хочете зробити:".into(),
                actions: vec![
                    Action::callback("💬 Написати повідомлення", Callback::Contact(ContactType::Message)),
                    Action::callback("➕ Запропонувати послугу", Callback::Contact(ContactType::SuggestService)),
                ],
            },
            Prompt::EnterMessage => Rendered::text(format!(
                "Напишіть ваше повідомлення для адміністратора. Для скасування надішліть {}.",
                CANCEL_COMMAND
            )),
            Prompt::EnterServiceDetails => Rendered::text(format!(
                "Опишіть послугу: назва, категорія, адреса, телефон, графік роботи. Для скасування надішліть {}.",
                CANCEL_COMMAND
            )),
            Prompt::EmptyText => Rendered::text("Повідомлення порожнє, спробуйте ще раз."),
        }
    }
}

/// Per-user conversation state, keyed by Telegram user id.
#[derive(Default)]
pub struct ConversationStore {
    states: DashMap<i64, ConversationState>,
}

impl ConversationStore {
    pub fn new() -> Self { Self::default() }

    pub fn state(&self, user_id: i64) -> ConversationState {
        self.states.get(&user_id).map(|s| *s).unwrap_or_default()
    }

    /// Apply `input` for `user_id`; Idle entries are dropped.
    pub fn apply(&self, user_id: i64, input: ConversationInput) -> ConversationOutcome {
        let current = self.state(user_id);
        let (next, outcome) = transition(current, input);
        if next.is_idle() {
            self.states.remove(&user_id);
        } else {
            self.states.insert(user_id, next);
        }
        debug!(user_id, from = ?current, to = ?next, "conversation transition");
        outcome
    }

    pub fn len(&self) -> usize { self.states.len() }

    pub fn is_empty(&self) -> bool { self.states.is_empty() }
}
