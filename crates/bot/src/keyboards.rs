//! Presenter actions → Telegram markup.

use service::callbacks::{Callback, MenuCallback};
use service::menu::{Back, MenuView, BACK_LABEL};
use service::presenter::{Action, ActionKind};

use crate::telegram::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, ReplyKeyboardMarkup, ReplyMarkup,
};

fn button(action: &Action) -> InlineKeyboardButton {
    match &action.kind {
        ActionKind::Callback(cb) => InlineKeyboardButton {
            text: action.label.clone(),
            callback_data: Some(cb.encode()),
            url: None,
        },
        ActionKind::Url(url) => InlineKeyboardButton { text: action.label.clone(), callback_data: None, url: Some(url.clone()) },
    }
}

/// Pagination buttons share one row; everything else gets its own.
pub fn inline_keyboard(actions: &[Action]) -> Option<InlineKeyboardMarkup> {
    if actions.is_empty() {
        return None;
    }
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    let mut nav_row: Vec<InlineKeyboardButton> = Vec::new();
    for a in actions {
        match &a.kind {
            ActionKind::Callback(Callback::Pagination(_)) => nav_row.push(button(a)),
            _ => rows.push(vec![button(a)]),
        }
    }
    if !nav_row.is_empty() {
        rows.push(nav_row);
    }
    Some(InlineKeyboardMarkup { inline_keyboard: rows })
}

pub fn inline_markup(actions: &[Action]) -> Option<ReplyMarkup> {
    inline_keyboard(actions).map(ReplyMarkup::Inline)
}

/// Persistent main menu, one label per row.
pub fn main_menu(labels: &[String]) -> ReplyMarkup {
    ReplyMarkup::Keyboard(ReplyKeyboardMarkup {
        keyboard: labels.iter().map(|l| vec![KeyboardButton { text: l.clone() }]).collect(),
        resize_keyboard: true,
    })
}

/// Children of a menu node plus the back button.
pub fn menu_view(view: &MenuView) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = view
        .children
        .iter()
        .map(|n| {
            vec![InlineKeyboardButton {
                text: n.text.clone(),
                callback_data: Some(Callback::Menu(MenuCallback { node: Some(n.id) }).encode()),
                url: None,
            }]
        })
        .collect();
    if let Some(back) = view.back {
        let node = match back {
            Back::Root => None,
            Back::Node(id) => Some(id),
        };
        rows.push(vec![InlineKeyboardButton {
            text: BACK_LABEL.to_string(),
            callback_data: Some(Callback::Menu(MenuCallback { node }).encode()),
            url: None,
        }]);
    }
    InlineKeyboardMarkup { inline_keyboard: rows }
}
