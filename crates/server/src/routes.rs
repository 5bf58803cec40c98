use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::{warn, Level};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use integrations::{Assistant, Geocoder};

use crate::openapi::ApiDoc;

pub mod ai;
pub mod categories;
pub mod menu;
pub mod services;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Shared handler state. External clients are optional so the admin API
/// still works without API keys configured.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub geocoder: Option<Arc<dyn Geocoder>>,
    pub assistant: Option<Arc<dyn Assistant>>,
    /// When set, every `/admin` route requires it.
    pub admin_api_key: Option<String>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, geocoder: None, assistant: None, admin_api_key: None }
    }

    pub fn geocoder(&self) -> Option<&dyn Geocoder> { self.geocoder.as_deref() }
}

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Requires the `X-API-Key` header when an admin key is configured.
pub async fn require_api_key(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.admin_api_key.as_deref() else {
        return Ok(next.run(req).await);
    };

    // header only; a query parameter would leak into the traced request URI
    let authorized = req.headers().get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) == Some(expected);
    if authorized {
        return Ok(next.run(req).await);
    }
    warn!(path = %req.uri().path(), "rejected admin request without a valid api key");
    Err(StatusCode::UNAUTHORIZED)
}

/// Build the full application router: health, admin CRUD, AI processing and API docs.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let admin = Router::new()
        .route("/admin/services", get(services::list).post(services::create))
        .route(
            "/admin/services/:id",
            get(services::get).put(services::update).delete(services::delete),
        )
        .route("/admin/categories", get(categories::list).post(categories::create))
        .route(
            "/admin/categories/:id",
            get(categories::get).put(categories::update).delete(categories::delete),
        )
        .route("/admin/menu", get(menu::list).post(menu::create))
        .route("/admin/menu/:id", get(menu::get).put(menu::update).delete(menu::delete))
        .route("/admin/process-text", post(ai::process_text))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/health", get(health))
        .merge(admin)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
