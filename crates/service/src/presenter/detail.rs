use models::service;

use crate::callbacks::{Callback, ServiceAction, ServiceCallback};
use super::{escape_html, Action, Rendered};

pub const MAP_LABEL: &str = "🗺️ Показати на мапі";
pub const CALL_LABEL: &str = "📞 Зателефонувати";
pub const WEBSITE_LABEL: &str = "🌐 Відвідати сайт";

/// Links stored without a scheme get `https://`.
pub fn website_url(link: &str) -> String {
    let link = link.trim();
    let lower = link.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        link.to_string()
    } else {
        format!("https://{}", link.trim_start_matches('/'))
    }
}

/// Full record; absent fields are left out entirely.
pub fn render_detail(s: &service::Model) -> Rendered {
    let mut lines = vec![format!("<b>{}</b>", escape_html(&s.name))];
    let optional = [
        ("📝", &s.description),
        ("📍", &s.address),
        ("📞", &s.phone),
        ("🕒", &s.schedule),
        ("🌐", &s.social_media),
    ];
    let mut body: Vec<String> = optional
        .iter()
        .filter_map(|(icon, v)| v.as_deref().map(|v| format!("{} {}", icon, escape_html(v))))
        .collect();
    if !body.is_empty() {
        lines.push(String::new());
        lines.append(&mut body);
    }

    let mut actions = Vec::new();
    if s.coordinates().is_some() {
        actions.push(Action::callback(
            MAP_LABEL,
            Callback::Service(ServiceCallback { action: ServiceAction::Map, service_id: s.id }),
        ));
    }
    if s.phone.is_some() {
        actions.push(Action::callback(
            CALL_LABEL,
            Callback::Service(ServiceCallback { action: ServiceAction::Call, service_id: s.id }),
        ));
    }
    if let Some(link) = &s.social_media {
        actions.push(Action::url(WEBSITE_LABEL, website_url(link)));
    }

    Rendered { text: lines.join("\n"), actions }
}

pub fn render_not_found(service_id: i32) -> Rendered {
    Rendered::text(format!("😕 Послугу #{} не знайдено. Можливо, її вже видалили.", service_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::ActionKind;

    fn bare() -> service::Model {
        service::Model {
            id: 3,
            name: "Перукарня".into(),
            address: None,
            phone: None,
            schedule: None,
            social_media: None,
            description: None,
            latitude: None,
            longitude: None,
            category_id: 1,
        }
    }

    #[test]
    fn bare_service_has_no_controls_and_no_placeholders() {
        let r = render_detail(&bare());
        assert!(r.actions.is_empty());
        assert_eq!(r.text, "<b>Перукарня</b>");
    }

    #[test]
    fn controls_follow_present_fields() {
        let s = service::Model {
            phone: Some("+380 99 111 22 33".into()),
            social_media: Some("instagram.com/hair".into()),
            latitude: Some(51.82),
            longitude: Some(31.95),
            schedule: Some("9-18".into()),
            ..bare()
        };
        let r = render_detail(&s);
        let labels: Vec<&str> = r.actions.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec![MAP_LABEL, CALL_LABEL, WEBSITE_LABEL]);
        assert_eq!(r.actions[2].kind, ActionKind::Url("https://instagram.com/hair".into()));
        assert!(r.text.contains("🕒 9-18"));
        assert!(!r.text.contains("📝"));
    }

    #[test]
    fn one_coordinate_is_not_enough_for_map() {
        let s = service::Model { latitude: Some(51.0), ..bare() };
        assert!(render_detail(&s).actions.is_empty());
    }

    #[test]
    fn website_url_keeps_existing_scheme() {
        assert_eq!(website_url("http://a.ua"), "http://a.ua");
        assert_eq!(website_url(" HTTPS://a.ua "), "HTTPS://a.ua");
        assert_eq!(website_url("a.ua"), "https://a.ua");
    }

    #[test]
    fn not_found_mentions_id() {
        assert!(render_not_found(999).text.contains("#999"));
    }
}
