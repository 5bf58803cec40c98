use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::directory::repository::DirectoryRepository;
use crate::errors::ServiceError;
use crate::menu::{default_root_labels, MenuTree};
use crate::pagination::{paginate, Pagination};
use crate::presenter::{detail, listing, Rendered};

/// Result of the map action.
#[derive(Clone, Debug, PartialEq)]
pub enum MapReveal {
    Location { name: String, latitude: f64, longitude: f64 },
    NoCoordinates,
    NotFound,
}

/// Result of the call action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallReveal {
    Contact { name: String, phone: String },
    NoPhone,
    NotFound,
}

/// Read-side use cases behind the bot, independent of the transport.
pub struct DirectoryService<R: DirectoryRepository> {
    repo: Arc<R>,
    page_size: u32,
}

impl<R: DirectoryRepository> DirectoryService<R> {
    pub fn new(repo: Arc<R>, page_size: u32) -> Self { Self { repo, page_size: page_size.max(1) } }

    pub fn repository(&self) -> &Arc<R> { &self.repo }

    /// Category name addressed by a keyboard label: exact name, or name preceded by its icon.
    pub async fn resolve_category(&self, text: &str) -> Result<Option<String>, ServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let categories = self.repo.list_categories().await?;
        Ok(categories.into_iter().find_map(|c| {
            let prefix = text.strip_suffix(c.name.as_str())?.trim();
            let icon_ok = prefix.is_empty() || c.icon.as_deref().map(str::trim) == Some(prefix);
            icon_ok.then_some(c.name)
        }))
    }

    /// Listing page; re-reads the whole category every time.
    #[instrument(skip(self))]
    pub async fn category_page(&self, category_name: &str, page: u32) -> Result<Rendered, ServiceError> {
        let items = self.repo.find_by_category(category_name).await?;
        let page = paginate(items, Pagination::new(page, self.page_size));
        debug!(page = page.page, total_pages = page.total_pages, total_items = page.total_items, "category page");
        Ok(listing::render_listing(&page, category_name))
    }

    pub async fn service_detail(&self, id: i32) -> Result<Rendered, ServiceError> {
        Ok(match self.repo.find_by_id(id).await? {
            Some(s) => detail::render_detail(&s),
            None => detail::render_not_found(id),
        })
    }

    pub async fn map_location(&self, id: i32) -> Result<MapReveal, ServiceError> {
        Ok(match self.repo.find_by_id(id).await? {
            None => MapReveal::NotFound,
            Some(s) => match s.coordinates() {
                Some((latitude, longitude)) => MapReveal::Location { name: s.name, latitude, longitude },
                None => MapReveal::NoCoordinates,
            },
        })
    }

    pub async fn call_contact(&self, id: i32) -> Result<CallReveal, ServiceError> {
        Ok(match self.repo.find_by_id(id).await? {
            None => CallReveal::NotFound,
            Some(s) => match s.phone {
                Some(phone) => CallReveal::Contact { name: s.name, phone },
                None => CallReveal::NoPhone,
            },
        })
    }

    /// Header followed by one detail view per hit, at most `limit` of them.
    /// No hits yields a single "nothing found" message.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Rendered>, ServiceError> {
        let hits = self.repo.search(query).await?;
        info!(hits = hits.len(), "search");
        if hits.is_empty() {
            return Ok(vec![listing::render_no_search_results(query)]);
        }
        let shown = hits.len().min(limit.max(1));
        let mut out = Vec::with_capacity(shown + 1);
        out.push(listing::render_search_header(query, shown, hits.len()));
        out.extend(hits.iter().take(shown).map(detail::render_detail));
        Ok(out)
    }

    pub async fn geolocated(&self) -> Result<Rendered, ServiceError> {
        let services = self.repo.list_with_coordinates().await?;
        Ok(listing::render_geolocated(&services))
    }

    pub async fn menu_tree(&self) -> Result<MenuTree, ServiceError> {
        Ok(MenuTree::from_rows(self.repo.list_menu().await?))
    }

    /// Labels for the main keyboard: root menu buttons, or the built-in menu when none exist.
    pub async fn root_menu_labels(&self) -> Result<Vec<String>, ServiceError> {
        let tree = self.menu_tree().await?;
        let roots: Vec<String> = tree.children_of(None).into_iter().map(|n| n.text).collect();
        // a table whose rows only form parent cycles has no reachable root
        if !roots.is_empty() {
            return Ok(roots);
        }
        let categories = self.repo.list_categories().await?;
        let labels: Vec<String> = categories.iter().map(|c| c.label()).collect();
        Ok(default_root_labels(&labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::{Callback, ServiceAction, ServiceCallback};
    use crate::directory::repository::mock::{sample_service, InMemoryDirectory};
    use crate::menu::{CONTACT_MENU_LABEL, MAP_MENU_LABEL};
    use crate::presenter::ActionKind;
    use models::service;

    fn directory() -> (Arc<InMemoryDirectory>, DirectoryService<InMemoryDirectory>) {
        let repo = Arc::new(InMemoryDirectory::new());
        (repo.clone(), DirectoryService::new(repo, 5))
    }

    #[tokio::test]
    async fn twelve_services_three_pages() -> anyhow::Result<()> {
        let (repo, svc) = directory();
        let c = repo.add_category("Послуги краси", Some("💅"));
        for i in 1..=12 {
            repo.add_service(sample_service(&format!("S{i}"), c.id));
        }
        let last = svc.category_page("Послуги краси", 3).await?;
        assert!(last.text.contains("/service_11") && last.text.contains("/service_12"));
        assert_eq!(last.actions.len(), 1);

        let clamped = svc.category_page("Послуги краси", 40).await?;
        assert_eq!(clamped, last);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_category_is_empty_listing() -> anyhow::Result<()> {
        let (_, svc) = directory();
        let r = svc.category_page("Нема", 1).await?;
        assert!(r.text.contains("немає жодної послуги"));
        Ok(())
    }

    #[tokio::test]
    async fn resolves_icon_prefixed_labels() -> anyhow::Result<()> {
        let (repo, svc) = directory();
        repo.add_category("Послуги краси", Some("💅"));
        assert_eq!(svc.resolve_category("💅 Послуги краси").await?.as_deref(), Some("Послуги краси"));
        assert_eq!(svc.resolve_category("Послуги краси").await?.as_deref(), Some("Послуги краси"));
        assert_eq!(svc.resolve_category("Хочу Послуги краси").await?, None);
        assert_eq!(svc.resolve_category("").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn detail_not_found_for_missing_id() -> anyhow::Result<()> {
        let (_, svc) = directory();
        assert!(svc.service_detail(999).await?.text.contains("#999"));
        assert_eq!(svc.map_location(999).await?, MapReveal::NotFound);
        assert_eq!(svc.call_contact(999).await?, CallReveal::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn map_yields_stored_pair() -> anyhow::Result<()> {
        let (repo, svc) = directory();
        let c = repo.add_category("X", None);
        let s = repo.add_service(service::Model { latitude: Some(51.82), longitude: Some(31.95), ..sample_service("A", c.id) });
        let plain = repo.add_service(sample_service("B", c.id));

        assert_eq!(
            svc.map_location(s.id).await?,
            MapReveal::Location { name: "A".into(), latitude: 51.82, longitude: 31.95 }
        );
        assert_eq!(svc.map_location(plain.id).await?, MapReveal::NoCoordinates);

        let detail = svc.service_detail(s.id).await?;
        assert_eq!(
            detail.actions[0].kind,
            ActionKind::Callback(Callback::Service(ServiceCallback { action: ServiceAction::Map, service_id: s.id }))
        );
        Ok(())
    }

    #[tokio::test]
    async fn call_reveals_phone() -> anyhow::Result<()> {
        let (repo, svc) = directory();
        let c = repo.add_category("X", None);
        let s = repo.add_service(service::Model { phone: Some("+380991112233".into()), ..sample_service("A", c.id) });
        let plain = repo.add_service(sample_service("B", c.id));
        assert_eq!(svc.call_contact(s.id).await?, CallReveal::Contact { name: "A".into(), phone: "+380991112233".into() });
        assert_eq!(svc.call_contact(plain.id).await?, CallReveal::NoPhone);
        Ok(())
    }

    #[tokio::test]
    async fn search_renders_header_and_caps_results() -> anyhow::Result<()> {
        let (repo, svc) = directory();
        let c = repo.add_category("X", None);
        for i in 0..4 {
            repo.add_service(sample_service(&format!("Shoe {i}"), c.id));
        }
        let out = svc.search("shoe", 2).await?;
        assert_eq!(out.len(), 3);
        assert!(out[0].text.contains("показано 2 з 4"));

        let none = svc.search("піца", 2).await?;
        assert_eq!(none.len(), 1);
        assert!(none[0].text.contains("нічого не знайдено"));
        Ok(())
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let (repo, svc) = directory();
        repo.set_failing(true);
        assert!(matches!(svc.category_page("X", 1).await, Err(ServiceError::Db(_))));
    }

    #[tokio::test]
    async fn root_menu_falls_back_to_categories() -> anyhow::Result<()> {
        let (repo, svc) = directory();
        repo.add_category("Послуги краси", Some("💅"));
        assert_eq!(
            svc.root_menu_labels().await?,
            vec!["💅 Послуги краси".to_string(), MAP_MENU_LABEL.to_string(), CONTACT_MENU_LABEL.to_string()]
        );

        let root = repo.add_menu_button("Довідник", None);
        repo.add_menu_button("Краса", Some(root.id));
        assert_eq!(svc.root_menu_labels().await?, vec!["Довідник".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn cyclic_menu_table_falls_back_to_default_menu() -> anyhow::Result<()> {
        let (repo, svc) = directory();
        repo.add_category("Послуги краси", Some("💅"));
        let a = repo.add_menu_button("А", Some(2));
        repo.add_menu_button("Б", Some(a.id));
        assert_eq!(
            svc.root_menu_labels().await?,
            vec!["💅 Послуги краси".to_string(), MAP_MENU_LABEL.to_string(), CONTACT_MENU_LABEL.to_string()]
        );
        Ok(())
    }
}
