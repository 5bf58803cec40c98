use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::info;

use models::category;
use crate::errors::ServiceError;

/// Categories created by `seed_categories`: (name, icon).
pub const DEFAULT_CATEGORIES: [(&str, &str); 4] = [
    ("Послуги краси", "💅"),
    ("Автомобільний сервіс", "🚗"),
    ("Ремонт та обслуговування", "🏠"),
    ("Розклад транспорту", "🚌"),
];

/// Create/update input for a category.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// All categories ordered by id.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>, ServiceError> {
    Ok(category::Entity::find().order_by_asc(category::Column::Id).all(db).await?)
}

/// Get category by id.
pub async fn get_category(db: &DatabaseConnection, id: i32) -> Result<Option<category::Model>, ServiceError> {
    Ok(category::Entity::find_by_id(id).one(db).await?)
}

/// Create a category; names are unique.
pub async fn create_category(db: &DatabaseConnection, input: CategoryInput) -> Result<category::Model, ServiceError> {
    category::validate_name(&input.name)?;
    if category::find_by_name(db, &input.name).await?.is_some() {
        return Err(ServiceError::Conflict(format!("category '{}' already exists", input.name.trim())));
    }
    let created = category::create(db, &input.name, input.icon.as_deref()).await?;
    info!(id = created.id, name = %created.name, "created category");
    Ok(created)
}

/// Find a category by name, creating it without an icon when missing.
pub async fn get_or_create_category(db: &DatabaseConnection, name: &str) -> Result<category::Model, ServiceError> {
    if let Some(found) = category::find_by_name(db, name).await? {
        return Ok(found);
    }
    let created = category::create(db, name, None).await?;
    info!(id = created.id, name = %created.name, "auto_created_category_for_service");
    Ok(created)
}

/// Rename a category and/or change its icon.
pub async fn update_category(db: &DatabaseConnection, id: i32, input: CategoryInput) -> Result<category::Model, ServiceError> {
    category::validate_name(&input.name)?;
    let name = input.name.trim().to_string();
    let clash = category::Entity::find()
        .filter(category::Column::Name.eq(name.clone()))
        .filter(category::Column::Id.ne(id))
        .one(db)
        .await?;
    if clash.is_some() {
        return Err(ServiceError::Conflict(format!("category '{}' already exists", name)));
    }
    let mut am: category::ActiveModel = category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("category"))?
        .into();
    am.name = Set(name);
    am.icon = Set(input.icon.map(|i| i.trim().to_string()).filter(|i| !i.is_empty()));
    Ok(am.update(db).await?)
}

/// Hard delete; the category's services go with it.
pub async fn delete_category(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let res = category::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

/// Insert the default categories that are not present yet. Returns how many were added.
pub async fn seed_categories(db: &DatabaseConnection) -> Result<usize, ServiceError> {
    let mut added = 0;
    for (name, icon) in DEFAULT_CATEGORIES {
        if category::find_by_name(db, name).await?.is_none() {
            category::create(db, name, Some(icon)).await?;
            added += 1;
        }
    }
    info!(added, "seeded categories");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn category_crud_service() -> Result<(), anyhow::Error> {
        let db = get_db().await?;

        let c = create_category(&db, CategoryInput { name: "Їжа".into(), icon: Some("🍞".into()) }).await?;
        assert_eq!(get_category(&db, c.id).await?.map(|c| c.name), Some("Їжа".to_string()));

        let dup = create_category(&db, CategoryInput { name: " Їжа ".into(), icon: None }).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));

        let updated = update_category(&db, c.id, CategoryInput { name: "Кафе".into(), icon: None }).await?;
        assert_eq!(updated.name, "Кафе");
        assert_eq!(updated.icon, None);

        assert!(delete_category(&db, c.id).await?);
        assert!(!delete_category(&db, c.id).await?);
        assert!(get_category(&db, c.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn update_rejects_name_of_another_category() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let a = create_category(&db, CategoryInput { name: "A".into(), icon: None }).await?;
        create_category(&db, CategoryInput { name: "B".into(), icon: None }).await?;
        let res = update_category(&db, a.id, CategoryInput { name: "B".into(), icon: None }).await;
        assert!(matches!(res, Err(ServiceError::Conflict(_))));
        // Keeping its own name is fine
        update_category(&db, a.id, CategoryInput { name: "A".into(), icon: Some("⭐".into()) }).await?;
        Ok(())
    }

    #[tokio::test]
    async fn seeding_is_idempotent() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        assert_eq!(seed_categories(&db).await?, 4);
        assert_eq!(seed_categories(&db).await?, 0);
        let all = list_categories(&db).await?;
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].label(), "💅 Послуги краси");
        Ok(())
    }

    #[tokio::test]
    async fn get_or_create_reuses_existing() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let first = get_or_create_category(&db, "Нова").await?;
        let second = get_or_create_category(&db, "Нова").await?;
        assert_eq!(first.id, second.id);
        assert_eq!(list_categories(&db).await?.len(), 1);
        Ok(())
    }
}
