use sea_orm::{entity::prelude::*, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::service::Entity")]
    Service,
}

impl Related<crate::service::Entity> for Entity {
    fn to() -> RelationDef { Relation::Service.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Button label: icon followed by the name, as shown in the main menu.
    pub fn label(&self) -> String {
        match self.icon.as_deref().map(str::trim).filter(|i| !i.is_empty()) {
            Some(icon) => format!("{} {}", icon, self.name),
            None => self.name.clone(),
        }
    }
}

pub const MAX_NAME_BYTES: usize = 48;

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    let trimmed = name.trim();
    if trimmed.is_empty() { return Err(errors::ModelError::Validation("category name required".into())); }
    // Names travel inside 64-byte bot callback payloads.
    if trimmed.len() > MAX_NAME_BYTES { return Err(errors::ModelError::Validation(format!("category name too long (<={MAX_NAME_BYTES} bytes)"))); }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, name: &str, icon: Option<&str>) -> Result<Model, errors::ModelError> {
    validate_name(name)?;
    let am = ActiveModel {
        name: Set(name.trim().to_string()),
        icon: Set(icon.map(|i| i.trim().to_string()).filter(|i| !i.is_empty())),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
