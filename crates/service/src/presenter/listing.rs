use models::service;

use crate::callbacks::{reference_token, Callback, PageAction, PaginationCallback};
use crate::pagination::Page;
use super::{escape_html, Action, Rendered};

pub const PREV_LABEL: &str = "⬅️ Назад";
pub const NEXT_LABEL: &str = "Далі ➡️";

/// Telegram caps a message at 4096 characters; the rest is room for the overflow line.
const MESSAGE_CHAR_BUDGET: usize = 4000;

fn nav(action: PageAction, page: u32, category_name: &str) -> Callback {
    Callback::Pagination(PaginationCallback { action, page, category_name: category_name.to_string() })
}

/// Render one page of a category: name, optional address and reference token per service.
pub fn render_listing(page: &Page<service::Model>, category_name: &str) -> Rendered {
    if page.total_items == 0 {
        return render_empty_category(category_name);
    }

    let mut text = format!(
        "<b>Послуги в категорії '{}'</b> (сторінка {}/{})\n\n",
        escape_html(category_name),
        page.page,
        page.total_pages
    );
    for s in &page.items {
        text.push_str(&format!("<b>{}</b>\n", escape_html(&s.name)));
        if let Some(address) = &s.address {
            text.push_str(&format!("📍 {}\n", escape_html(address)));
        }
        text.push_str(&format!("ℹ️ Детальніше: {}\n\n", reference_token(s.id)));
    }

    let mut actions = Vec::with_capacity(2);
    if let Some(prev) = page.prev_page() {
        actions.push(Action::callback(PREV_LABEL, nav(PageAction::Prev, prev, category_name)));
    }
    if let Some(next) = page.next_page() {
        actions.push(Action::callback(NEXT_LABEL, nav(PageAction::Next, next, category_name)));
    }

    Rendered { text: text.trim_end().to_string(), actions }
}

pub fn render_empty_category(category_name: &str) -> Rendered {
    Rendered::text(format!(
        "На жаль, у категорії '{}' поки що немає жодної послуги.",
        escape_html(category_name)
    ))
}

/// Services that can be shown on the map, each with its reference token.
pub fn render_geolocated(services: &[service::Model]) -> Rendered {
    if services.is_empty() {
        return Rendered::text("Поки що немає послуг з координатами на мапі.");
    }
    let mut text = String::from("<b>🗺️ Послуги на мапі</b>\n\n");
    let mut used = text.chars().count();
    for (shown, s) in services.iter().enumerate() {
        let line = format!("<b>{}</b> {}\n", escape_html(&s.name), reference_token(s.id));
        let len = line.chars().count();
        if used + len > MESSAGE_CHAR_BUDGET {
            text.push_str(&format!("\n… та ще {} (шукайте їх у категоріях)", services.len() - shown));
            break;
        }
        used += len;
        text.push_str(&line);
    }
    Rendered::text(text.trim_end())
}

/// Header sent before the detail views of search hits.
pub fn render_search_header(query: &str, shown: usize, total: usize) -> Rendered {
    let mut text = format!("<b>Знайдено за запитом '{}':</b>", escape_html(query));
    if shown < total {
        text.push_str(&format!(" показано {} з {}", shown, total));
    }
    Rendered::text(text)
}

pub fn render_no_search_results(query: &str) -> Rendered {
    Rendered::text(format!(
        "🤷 На жаль, за запитом '{}' нічого не знайдено. Спробуйте інший запит.",
        escape_html(query)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{paginate, Pagination};
    use crate::presenter::ActionKind;

    fn svc(id: i32) -> service::Model {
        service::Model {
            id,
            name: format!("Service {id}"),
            address: (id % 2 == 0).then(|| format!("вул. {id}")),
            phone: None,
            schedule: None,
            social_media: None,
            description: None,
            latitude: None,
            longitude: None,
            category_id: 1,
        }
    }

    fn twelve() -> Vec<service::Model> { (1..=12).map(svc).collect() }

    fn targets(r: &Rendered) -> Vec<(PageAction, u32)> {
        r.actions
            .iter()
            .filter_map(|a| match &a.kind {
                ActionKind::Callback(Callback::Pagination(p)) => Some((p.action, p.page)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn first_page_has_only_next() {
        let r = render_listing(&paginate(twelve(), Pagination::new(1, 5)), "X");
        assert_eq!(targets(&r), vec![(PageAction::Next, 2)]);
        assert!(r.text.contains("(сторінка 1/3)"));
        assert!(r.text.contains("/service_1"));
        assert!(!r.text.contains("/service_6"));
    }

    #[test]
    fn interior_page_has_both() {
        let r = render_listing(&paginate(twelve(), Pagination::new(2, 5)), "X");
        assert_eq!(targets(&r), vec![(PageAction::Prev, 1), (PageAction::Next, 3)]);
    }

    #[test]
    fn last_page_points_back_only() {
        let r = render_listing(&paginate(twelve(), Pagination::new(3, 5)), "X");
        assert_eq!(targets(&r), vec![(PageAction::Prev, 2)]);
        assert!(r.text.contains("/service_11") && r.text.contains("/service_12"));
    }

    #[test]
    fn nav_payload_carries_category() {
        let r = render_listing(&paginate(twelve(), Pagination::new(1, 5)), "Послуги краси");
        match &r.actions[0].kind {
            ActionKind::Callback(cb) => assert_eq!(cb.encode(), "pag:next:2:Послуги краси"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn address_is_optional() {
        let r = render_listing(&paginate(vec![svc(1), svc(2)], Pagination::new(1, 5)), "X");
        assert!(r.text.contains("📍 вул. 2"));
        assert_eq!(r.text.matches("📍").count(), 1);
    }

    #[test]
    fn empty_category_message() {
        let r = render_listing(&paginate(Vec::new(), Pagination::new(1, 5)), "<X>");
        assert!(r.actions.is_empty());
        assert!(r.text.contains("немає жодної послуги"));
        assert!(r.text.contains("&lt;X&gt;"));
    }

    #[test]
    fn empty_search_wording_differs_from_empty_category() {
        assert_ne!(render_no_search_results("X").text, render_empty_category("X").text);
    }

    #[test]
    fn map_list_stays_within_one_message() {
        let many: Vec<service::Model> = (1..=300).map(|id| service::Model { name: format!("Кав'ярня номер {id}"), ..svc(id) }).collect();
        let r = render_geolocated(&many);
        assert!(r.text.chars().count() <= 4096);
        assert!(r.text.contains("/service_1\n"));
        assert!(!r.text.contains("/service_300"));
        assert!(r.text.contains("… та ще"));

        let few = render_geolocated(&twelve());
        assert!(few.text.contains("/service_12") && !few.text.contains("та ще"));
    }

    #[test]
    fn search_header_mentions_truncation() {
        assert!(!render_search_header("q", 3, 3).text.contains("показано"));
        assert!(render_search_header("q", 10, 14).text.contains("показано 10 з 14"));
    }
}
