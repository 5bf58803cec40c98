use sea_orm::{entity::prelude::*, ActiveModelTrait, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub schedule: Option<String>,
    pub social_media: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub category_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::category::Entity",
        from = "Column::CategoryId",
        to = "crate::category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<crate::category::Entity> for Entity {
    fn to() -> RelationDef { Relation::Category.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Both coordinates, or nothing.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Writable fields of a service, shared by create and update.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceFields {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub schedule: Option<String>,
    pub social_media: Option<String>,
    pub description: Option<String>,
}

fn clean(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl ServiceFields {
    /// Trim every field and turn blank optionals into `None`.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            address: clean(self.address),
            phone: clean(self.phone),
            schedule: clean(self.schedule),
            social_media: clean(self.social_media),
            description: clean(self.description),
        }
    }
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    let trimmed = name.trim();
    if trimmed.is_empty() { return Err(errors::ModelError::Validation("service name required".into())); }
    if trimmed.chars().count() > 200 { return Err(errors::ModelError::Validation("service name too long (<=200)".into())); }
    Ok(())
}

pub fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<(), errors::ModelError> {
    match (latitude, longitude) {
        (None, None) => Ok(()),
        (Some(lat), Some(lon)) => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                return Err(errors::ModelError::Validation("coordinates out of range".into()));
            }
            Ok(())
        }
        _ => Err(errors::ModelError::Validation("latitude and longitude must be set together".into())),
    }
}

pub async fn create(
    db: &DatabaseConnection,
    category_id: i32,
    fields: ServiceFields,
    coordinates: Option<(f64, f64)>,
) -> Result<Model, errors::ModelError> {
    let fields = fields.normalized();
    validate_name(&fields.name)?;
    let (latitude, longitude) = coordinates.unzip();
    validate_coordinates(latitude, longitude)?;
    let am = ActiveModel {
        name: Set(fields.name),
        address: Set(fields.address),
        phone: Set(fields.phone),
        schedule: Set(fields.schedule),
        social_media: Set(fields.social_media),
        description: Set(fields.description),
        latitude: Set(latitude),
        longitude: Set(longitude),
        category_id: Set(category_id),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
