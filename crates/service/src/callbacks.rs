//! Correlation payloads carried by inline buttons, and the `/service_<id>` reference token.
//!
//! Layout follows `prefix:field:field...`. The category name is the last
//! field of a pagination payload and may itself contain `:`.

use std::fmt;

/// Telegram rejects callback data longer than this.
pub const MAX_CALLBACK_BYTES: usize = 64;

const PAGINATION_PREFIX: &str = "pag";
const SERVICE_PREFIX: &str = "service";
const CONTACT_PREFIX: &str = "contact";
const MENU_PREFIX: &str = "menu";
const REFERENCE_PREFIX: &str = "/service_";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageAction {
    Prev,
    Next,
}

impl PageAction {
    fn as_str(self) -> &'static str {
        match self {
            PageAction::Prev => "prev",
            PageAction::Next => "next",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "prev" => Some(PageAction::Prev),
            "next" => Some(PageAction::Next),
            _ => None,
        }
    }
}

/// Re-run a category listing at `page`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationCallback {
    pub action: PageAction,
    pub page: u32,
    pub category_name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceAction {
    /// Send the service's location.
    Map,
    /// Send the service's phone as a contact card.
    Call,
}

impl ServiceAction {
    fn as_str(self) -> &'static str {
        match self {
            ServiceAction::Map => "map",
            ServiceAction::Call => "call",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "map" => Some(ServiceAction::Map),
            "call" => Some(ServiceAction::Call),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServiceCallback {
    pub action: ServiceAction,
    pub service_id: i32,
}

/// Choice made in the "contact administrator" prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContactType {
    /// Free-form message to the administrator.
    Message,
    /// Proposal of a new directory entry.
    SuggestService,
}

impl ContactType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContactType::Message => "message",
            ContactType::SuggestService => "service",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "message" => Some(ContactType::Message),
            "service" => Some(ContactType::SuggestService),
            _ => None,
        }
    }
}

/// Open a node of the menu tree; `None` is the root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuCallback {
    pub node: Option<i32>,
}

/// Every payload the bot emits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Callback {
    Pagination(PaginationCallback),
    Service(ServiceCallback),
    Contact(ContactType),
    Menu(MenuCallback),
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Pagination(p) => write!(f, "{}:{}:{}:{}", PAGINATION_PREFIX, p.action.as_str(), p.page, p.category_name),
            Callback::Service(s) => write!(f, "{}:{}:{}", SERVICE_PREFIX, s.action.as_str(), s.service_id),
            Callback::Contact(c) => write!(f, "{}:{}", CONTACT_PREFIX, c.as_str()),
            Callback::Menu(m) => match m.node {
                Some(id) => write!(f, "{}:{}", MENU_PREFIX, id),
                None => write!(f, "{}:root", MENU_PREFIX),
            },
        }
    }
}

impl Callback {
    pub fn encode(&self) -> String { self.to_string() }

    /// `None` for anything the bot did not produce.
    pub fn decode(data: &str) -> Option<Self> {
        let (prefix, rest) = data.split_once(':')?;
        match prefix {
            PAGINATION_PREFIX => {
                let mut parts = rest.splitn(3, ':');
                let action = PageAction::parse(parts.next()?)?;
                let page = parts.next()?.parse::<u32>().ok().filter(|p| *p > 0)?;
                let category_name = parts.next()?.to_string();
                if category_name.is_empty() {
                    return None;
                }
                Some(Callback::Pagination(PaginationCallback { action, page, category_name }))
            }
            SERVICE_PREFIX => {
                let (action, id) = rest.split_once(':')?;
                let action = ServiceAction::parse(action)?;
                let service_id = id.parse::<i32>().ok()?;
                Some(Callback::Service(ServiceCallback { action, service_id }))
            }
            CONTACT_PREFIX => ContactType::parse(rest).map(Callback::Contact),
            MENU_PREFIX => match rest {
                "root" => Some(Callback::Menu(MenuCallback { node: None })),
                id => id.parse::<i32>().ok().map(|id| Callback::Menu(MenuCallback { node: Some(id) })),
            },
            _ => None,
        }
    }
}

/// User-facing token that opens a service's detail view.
pub fn reference_token(service_id: i32) -> String {
    format!("{}{}", REFERENCE_PREFIX, service_id)
}

/// Parse `/service_<id>`, also accepting the `@botname` suffix added in group chats.
pub fn parse_reference_token(text: &str) -> Option<i32> {
    let rest = text.trim().strip_prefix(REFERENCE_PREFIX)?;
    let id = rest.split('@').next()?;
    id.parse::<i32>().ok()
}
