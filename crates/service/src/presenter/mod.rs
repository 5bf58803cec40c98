//! Text + controls for the bot transport.
//!
//! Presenters are pure: they take records already fetched from the
//! repository and never touch the store.

pub mod detail;
pub mod listing;

use crate::callbacks::Callback;

/// What a control does when pressed.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionKind {
    /// Round-trips an opaque payload back to the bot.
    Callback(Callback),
    /// Opens a link on the client.
    Url(String),
}

/// One labeled control.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    pub label: String,
    pub kind: ActionKind,
}

impl Action {
    pub fn callback(label: impl Into<String>, cb: Callback) -> Self {
        Self { label: label.into(), kind: ActionKind::Callback(cb) }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self { label: label.into(), kind: ActionKind::Url(url.into()) }
    }
}

/// Display text (HTML parse mode) plus ordered controls.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rendered {
    pub text: String,
    pub actions: Vec<Action>,
}

impl Rendered {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), actions: Vec::new() }
    }
}

/// Escape the three characters Telegram's HTML mode cares about.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<b>Tom & Jerry</b>"), "&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;");
        assert_eq!(escape_html("Сновськ"), "Сновськ");
    }
}
