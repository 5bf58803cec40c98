use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ServiceDoc {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub schedule: Option<String>,
    pub social_media: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub category_id: i32,
}

/// The category is referenced by name and created when missing.
#[derive(ToSchema)]
pub struct ServiceInputDoc {
    pub name: String,
    pub category: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub schedule: Option<String>,
    pub social_media: Option<String>,
    pub description: Option<String>,
}

#[derive(ToSchema)]
pub struct CategoryDoc { pub id: i32, pub name: String, pub icon: Option<String> }

#[derive(ToSchema)]
pub struct CategoryInputDoc { pub name: String, pub icon: Option<String> }

#[derive(ToSchema)]
pub struct MenuButtonDoc { pub id: i32, pub text: String, pub parent_id: Option<i32> }

#[derive(ToSchema)]
pub struct MenuButtonInputDoc { pub text: String, pub parent_id: Option<i32> }

#[derive(ToSchema)]
pub struct RawTextDoc { pub text: String, pub save: Option<bool> }

#[derive(ToSchema)]
pub struct ProcessTextOutputDoc {
    pub draft: ServiceInputDoc,
    pub service: Option<ServiceDoc>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::services::list,
        crate::routes::services::create,
        crate::routes::services::get,
        crate::routes::services::update,
        crate::routes::services::delete,
        crate::routes::categories::list,
        crate::routes::categories::create,
        crate::routes::categories::get,
        crate::routes::categories::update,
        crate::routes::categories::delete,
        crate::routes::menu::list,
        crate::routes::menu::create,
        crate::routes::menu::get,
        crate::routes::menu::update,
        crate::routes::menu::delete,
        crate::routes::ai::process_text,
    ),
    components(
        schemas(
            HealthResponse,
            ServiceDoc,
            ServiceInputDoc,
            CategoryDoc,
            CategoryInputDoc,
            MenuButtonDoc,
            MenuButtonInputDoc,
            RawTextDoc,
            ProcessTextOutputDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "services"),
        (name = "categories"),
        (name = "menu"),
        (name = "ai")
    )
)]
pub struct ApiDoc;
