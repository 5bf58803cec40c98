use sea_orm::sea_query::{Condition, Expr, Func, LikeExpr};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use integrations::{Geocoder, ServiceDraft};
use models::service::{self, ServiceFields};
use models::category;

use crate::db::category_service::get_or_create_category;
use crate::errors::ServiceError;

/// Create/update input for a service; the category is referenced by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInput {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub social_media: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ServiceInput {
    fn split(self) -> (String, ServiceFields) {
        let fields = ServiceFields {
            name: self.name,
            address: self.address,
            phone: self.phone,
            schedule: self.schedule,
            social_media: self.social_media,
            description: self.description,
        }
        .normalized();
        (self.category, fields)
    }
}

impl From<ServiceDraft> for ServiceInput {
    fn from(d: ServiceDraft) -> Self {
        Self {
            name: d.name,
            category: d.category,
            address: d.address,
            phone: d.phone,
            schedule: d.schedule,
            social_media: d.social_media,
            description: d.description,
        }
    }
}

/// Geocode `address`; lookup failures are logged and treated as a miss.
async fn locate(geocoder: Option<&dyn Geocoder>, address: Option<&str>) -> Option<(f64, f64)> {
    let (geocoder, address) = (geocoder?, address?);
    match geocoder.geocode(address).await {
        Ok(found) => found,
        Err(e) => {
            warn!(%address, error = %e, "geocoding failed; storing service without coordinates");
            None
        }
    }
}

async fn ensure_unique(db: &DatabaseConnection, name: &str, category_id: i32, exclude: Option<i32>) -> Result<(), ServiceError> {
    let mut q = service::Entity::find()
        .filter(service::Column::Name.eq(name))
        .filter(service::Column::CategoryId.eq(category_id));
    if let Some(id) = exclude {
        q = q.filter(service::Column::Id.ne(id));
    }
    if q.one(db).await?.is_some() {
        return Err(ServiceError::Conflict(format!("service '{}' already exists in this category", name)));
    }
    Ok(())
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Services of the named category, in insertion order. Unknown category yields an empty list.
pub async fn find_services_by_category(db: &DatabaseConnection, category_name: &str) -> Result<Vec<service::Model>, ServiceError> {
    let Some(cat) = category::find_by_name(db, category_name).await? else {
        return Ok(Vec::new());
    };
    Ok(service::Entity::find()
        .filter(service::Column::CategoryId.eq(cat.id))
        .order_by_asc(service::Column::Id)
        .all(db)
        .await?)
}

/// Get service by id.
pub async fn get_service(db: &DatabaseConnection, id: i32) -> Result<Option<service::Model>, ServiceError> {
    Ok(service::Entity::find_by_id(id).one(db).await?)
}

/// Case-insensitive substring match on name or description.
///
/// Case folding happens in the database (`LOWER`); SQLite only folds ASCII.
pub async fn search_services(db: &DatabaseConnection, needle: &str) -> Result<Vec<service::Model>, ServiceError> {
    let needle = needle.trim();
    if needle.is_empty() {
        return Ok(Vec::new());
    }
    let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
    let matches = Condition::any()
        .add(Expr::expr(Func::lower(Expr::col(service::Column::Name))).like(LikeExpr::new(pattern.clone()).escape('\\')))
        .add(Expr::expr(Func::lower(Expr::col(service::Column::Description))).like(LikeExpr::new(pattern).escape('\\')));
    Ok(service::Entity::find()
        .filter(matches)
        .order_by_asc(service::Column::Id)
        .all(db)
        .await?)
}

/// Every service, ordered by id.
pub async fn list_services(db: &DatabaseConnection) -> Result<Vec<service::Model>, ServiceError> {
    Ok(service::Entity::find().order_by_asc(service::Column::Id).all(db).await?)
}

/// Services that carry both coordinates.
pub async fn list_geolocated_services(db: &DatabaseConnection) -> Result<Vec<service::Model>, ServiceError> {
    Ok(service::Entity::find()
        .filter(service::Column::Latitude.is_not_null())
        .filter(service::Column::Longitude.is_not_null())
        .order_by_asc(service::Column::Id)
        .all(db)
        .await?)
}

/// Create a service, creating its category when missing and geocoding the address.
#[instrument(skip(db, geocoder, input), fields(name = %input.name, category = %input.category))]
pub async fn create_service(
    db: &DatabaseConnection,
    geocoder: Option<&dyn Geocoder>,
    input: ServiceInput,
) -> Result<service::Model, ServiceError> {
    let (category_name, fields) = input.split();
    service::validate_name(&fields.name)?;
    let cat = get_or_create_category(db, &category_name).await?;
    ensure_unique(db, &fields.name, cat.id, None).await?;

    let coordinates = locate(geocoder, fields.address.as_deref()).await;
    let created = service::create(db, cat.id, fields, coordinates).await?;
    info!(id = created.id, category_id = cat.id, geocoded = coordinates.is_some(), "created service");
    Ok(created)
}

/// Replace a service's fields. The address is re-geocoded only when it changed.
#[instrument(skip(db, geocoder, input))]
pub async fn update_service(
    db: &DatabaseConnection,
    geocoder: Option<&dyn Geocoder>,
    id: i32,
    input: ServiceInput,
) -> Result<service::Model, ServiceError> {
    let (category_name, fields) = input.split();
    service::validate_name(&fields.name)?;
    let existing = get_service(db, id).await?.ok_or_else(|| ServiceError::not_found("service"))?;
    let cat = get_or_create_category(db, &category_name).await?;
    ensure_unique(db, &fields.name, cat.id, Some(id)).await?;

    let coordinates = if fields.address == existing.address {
        existing.coordinates()
    } else {
        locate(geocoder, fields.address.as_deref()).await
    };
    let (latitude, longitude) = coordinates.unzip();

    let mut am: service::ActiveModel = existing.into();
    am.name = Set(fields.name);
    am.address = Set(fields.address);
    am.phone = Set(fields.phone);
    am.schedule = Set(fields.schedule);
    am.social_media = Set(fields.social_media);
    am.description = Set(fields.description);
    am.latitude = Set(latitude);
    am.longitude = Set(longitude);
    am.category_id = Set(cat.id);
    let updated = am.update(db).await?;
    info!(id = updated.id, "updated service");
    Ok(updated)
}

/// Hard delete service.
pub async fn delete_service(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let res = service::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

/// Remove every service; categories stay.
pub async fn clear_services(db: &DatabaseConnection) -> Result<u64, ServiceError> {
    let res = service::Entity::delete_many().exec(db).await?;
    info!(deleted = res.rows_affected, "cleared services");
    Ok(res.rows_affected)
}
