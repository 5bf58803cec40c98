use sea_orm::{entity::prelude::*, ActiveModelTrait, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_buttons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub text: String,
    pub parent_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(belongs_to = "Entity", from = "Column::ParentId", to = "Column::Id", on_delete = "SetNull")]
    Parent,
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_text(text: &str) -> Result<(), errors::ModelError> {
    let trimmed = text.trim();
    if trimmed.is_empty() { return Err(errors::ModelError::Validation("button text required".into())); }
    if trimmed.chars().count() > 100 { return Err(errors::ModelError::Validation("button text too long (<=100)".into())); }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, text: &str, parent_id: Option<i32>) -> Result<Model, errors::ModelError> {
    validate_text(text)?;
    let am = ActiveModel {
        text: Set(text.trim().to_string()),
        parent_id: Set(parent_id),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
