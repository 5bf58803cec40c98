use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use models::{category, menu_button, service};

use crate::db::{category_service, directory_service, menu_service};
use crate::errors::ServiceError;

/// Read side the bot needs. Every call is a fresh snapshot.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn find_by_category(&self, category_name: &str) -> Result<Vec<service::Model>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<service::Model>, ServiceError>;
    async fn search(&self, needle: &str) -> Result<Vec<service::Model>, ServiceError>;
    async fn list_with_coordinates(&self) -> Result<Vec<service::Model>, ServiceError>;
    async fn list_categories(&self) -> Result<Vec<category::Model>, ServiceError>;
    async fn list_menu(&self) -> Result<Vec<menu_button::Model>, ServiceError>;
}

/// SeaORM-backed repository implementation.
#[derive(Clone)]
pub struct SeaOrmDirectoryRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmDirectoryRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait]
impl DirectoryRepository for SeaOrmDirectoryRepository {
    async fn find_by_category(&self, category_name: &str) -> Result<Vec<service::Model>, ServiceError> {
        directory_service::find_services_by_category(&self.db, category_name).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<service::Model>, ServiceError> {
        directory_service::get_service(&self.db, id).await
    }

    async fn search(&self, needle: &str) -> Result<Vec<service::Model>, ServiceError> {
        directory_service::search_services(&self.db, needle).await
    }

    async fn list_with_coordinates(&self) -> Result<Vec<service::Model>, ServiceError> {
        directory_service::list_geolocated_services(&self.db).await
    }

    async fn list_categories(&self) -> Result<Vec<category::Model>, ServiceError> {
        category_service::list_categories(&self.db).await
    }

    async fn list_menu(&self) -> Result<Vec<menu_button::Model>, ServiceError> {
        menu_service::list_menu_buttons(&self.db).await
    }
}

/// In-memory repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    struct Tables {
        categories: Vec<category::Model>,
        services: Vec<service::Model>,
        menu: Vec<menu_button::Model>,
    }

    #[derive(Default)]
    pub struct InMemoryDirectory {
        tables: Mutex<Tables>,
        failing: AtomicBool,
    }

    /// Bare record in `category_id`; id is assigned on insert.
    pub fn sample_service(name: &str, category_id: i32) -> service::Model {
        service::Model {
            id: 0,
            name: name.to_string(),
            address: None,
            phone: None,
            schedule: None,
            social_media: None,
            description: None,
            latitude: None,
            longitude: None,
            category_id,
        }
    }

    impl InMemoryDirectory {
        pub fn new() -> Self { Self::default() }

        fn tables(&self) -> MutexGuard<'_, Tables> {
            self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }

        fn check(&self) -> Result<(), ServiceError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(ServiceError::Db("store unavailable".into()));
            }
            Ok(())
        }

        /// Make every read fail with `ServiceError::Db`.
        pub fn set_failing(&self, failing: bool) { self.failing.store(failing, Ordering::SeqCst); }

        pub fn add_category(&self, name: &str, icon: Option<&str>) -> category::Model {
            let mut t = self.tables();
            let c = category::Model { id: t.categories.len() as i32 + 1, name: name.to_string(), icon: icon.map(str::to_string) };
            t.categories.push(c.clone());
            c
        }

        pub fn add_service(&self, mut model: service::Model) -> service::Model {
            let mut t = self.tables();
            model.id = t.services.len() as i32 + 1;
            t.services.push(model.clone());
            model
        }

        pub fn add_menu_button(&self, text: &str, parent_id: Option<i32>) -> menu_button::Model {
            let mut t = self.tables();
            let m = menu_button::Model { id: t.menu.len() as i32 + 1, text: text.to_string(), parent_id };
            t.menu.push(m.clone());
            m
        }
    }

    #[async_trait]
    impl DirectoryRepository for InMemoryDirectory {
        async fn find_by_category(&self, category_name: &str) -> Result<Vec<service::Model>, ServiceError> {
            self.check()?;
            let t = self.tables();
            let Some(cat) = t.categories.iter().find(|c| c.name == category_name) else {
                return Ok(Vec::new());
            };
            Ok(t.services.iter().filter(|s| s.category_id == cat.id).cloned().collect())
        }

        async fn find_by_id(&self, id: i32) -> Result<Option<service::Model>, ServiceError> {
            self.check()?;
            Ok(self.tables().services.iter().find(|s| s.id == id).cloned())
        }

        async fn search(&self, needle: &str) -> Result<Vec<service::Model>, ServiceError> {
            self.check()?;
            let needle = needle.trim().to_lowercase();
            if needle.is_empty() {
                return Ok(Vec::new());
            }
            let hit = |v: Option<&str>| v.map(|v| v.to_lowercase().contains(&needle)).unwrap_or(false);
            Ok(self
                .tables()
                .services
                .iter()
                .filter(|s| hit(Some(&s.name)) || hit(s.description.as_deref()))
                .cloned()
                .collect())
        }

        async fn list_with_coordinates(&self) -> Result<Vec<service::Model>, ServiceError> {
            self.check()?;
            Ok(self.tables().services.iter().filter(|s| s.coordinates().is_some()).cloned().collect())
        }

        async fn list_categories(&self) -> Result<Vec<category::Model>, ServiceError> {
            self.check()?;
            Ok(self.tables().categories.clone())
        }

        async fn list_menu(&self) -> Result<Vec<menu_button::Model>, ServiceError> {
            self.check()?;
            Ok(self.tables().menu.clone())
        }
    }
}
