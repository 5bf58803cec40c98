use std::collections::HashMap;

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use models::menu_button;
use crate::errors::ServiceError;

/// Create/update input for a menu button.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MenuButtonInput {
    pub text: String,
    #[serde(default)]
    pub parent_id: Option<i32>,
}

/// All menu buttons ordered by id.
pub async fn list_menu_buttons(db: &DatabaseConnection) -> Result<Vec<menu_button::Model>, ServiceError> {
    Ok(menu_button::Entity::find().order_by_asc(menu_button::Column::Id).all(db).await?)
}

/// Get menu button by id.
pub async fn get_menu_button(db: &DatabaseConnection, id: i32) -> Result<Option<menu_button::Model>, ServiceError> {
    Ok(menu_button::Entity::find_by_id(id).one(db).await?)
}

async fn ensure_parent_exists(db: &DatabaseConnection, parent_id: Option<i32>) -> Result<(), ServiceError> {
    if let Some(pid) = parent_id {
        if get_menu_button(db, pid).await?.is_none() {
            return Err(ServiceError::Validation(format!("parent menu button {} does not exist", pid)));
        }
    }
    Ok(())
}

/// True when walking up from `parent_id` reaches `id`.
fn creates_cycle(parents: &HashMap<i32, Option<i32>>, id: i32, parent_id: Option<i32>) -> bool {
    let mut cursor = parent_id;
    let mut steps = 0;
    while let Some(current) = cursor {
        if current == id || steps > parents.len() {
            return true;
        }
        cursor = parents.get(&current).copied().flatten();
        steps += 1;
    }
    false
}

pub async fn create_menu_button(db: &DatabaseConnection, input: MenuButtonInput) -> Result<menu_button::Model, ServiceError> {
    ensure_parent_exists(db, input.parent_id).await?;
    Ok(menu_button::create(db, &input.text, input.parent_id).await?)
}

/// Update text and parent; a button cannot become its own ancestor.
pub async fn update_menu_button(db: &DatabaseConnection, id: i32, input: MenuButtonInput) -> Result<menu_button::Model, ServiceError> {
    menu_button::validate_text(&input.text)?;
    let existing = get_menu_button(db, id).await?.ok_or_else(|| ServiceError::not_found("menu button"))?;
    ensure_parent_exists(db, input.parent_id).await?;

    let parents: HashMap<i32, Option<i32>> = list_menu_buttons(db)
        .await?
        .into_iter()
        .map(|b| (b.id, b.parent_id))
        .collect();
    if creates_cycle(&parents, id, input.parent_id) {
        return Err(ServiceError::Validation("menu button cannot be nested under itself".into()));
    }

    let mut am: menu_button::ActiveModel = existing.into();
    am.text = Set(input.text.trim().to_string());
    am.parent_id = Set(input.parent_id);
    Ok(am.update(db).await?)
}

/// Hard delete; children are detached to the root.
pub async fn delete_menu_button(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let res = menu_button::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    fn input(text: &str, parent_id: Option<i32>) -> MenuButtonInput {
        MenuButtonInput { text: text.into(), parent_id }
    }

    #[test]
    fn cycle_detection() {
        let parents: HashMap<i32, Option<i32>> = [(1, None), (2, Some(1)), (3, Some(2))].into_iter().collect();
        assert!(creates_cycle(&parents, 1, Some(3)));
        assert!(creates_cycle(&parents, 2, Some(2)));
        assert!(!creates_cycle(&parents, 3, Some(1)));
        assert!(!creates_cycle(&parents, 1, None));
    }

    #[tokio::test]
    async fn menu_crud_service() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let root = create_menu_button(&db, input("Транспорт", None)).await?;
        let child = create_menu_button(&db, input("Автобуси", Some(root.id))).await?;

        let bad_parent = create_menu_button(&db, input("X", Some(999))).await;
        assert!(matches!(bad_parent, Err(ServiceError::Validation(_))));

        let cyc = update_menu_button(&db, root.id, input("Транспорт", Some(child.id))).await;
        assert!(matches!(cyc, Err(ServiceError::Validation(_))));

        let renamed = update_menu_button(&db, child.id, input("Маршрутки", Some(root.id))).await?;
        assert_eq!(renamed.text, "Маршрутки");

        assert!(delete_menu_button(&db, root.id).await?);
        let orphan = get_menu_button(&db, child.id).await?.expect("child survives");
        assert_eq!(orphan.parent_id, None);
        Ok(())
    }
}
