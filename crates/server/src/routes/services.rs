use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;

use service::db::directory_service::{self, ServiceInput};

use crate::errors::JsonApiError;
use crate::routes::ServerState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    /// Only services of this category.
    pub category: Option<String>,
    /// Case-insensitive substring of name or description; wins over `category`.
    pub q: Option<String>,
}

#[utoipa::path(
    get, path = "/admin/services", tag = "services",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK", body = [crate::openapi::ServiceDoc]),
        (status = 500, description = "List Failed")
    )
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<Vec<models::service::Model>>, JsonApiError> {
    let list = match (q.q.as_deref().map(str::trim).filter(|s| !s.is_empty()), q.category.as_deref()) {
        (Some(needle), _) => directory_service::search_services(&state.db, needle).await?,
        (None, Some(category)) => directory_service::find_services_by_category(&state.db, category).await?,
        (None, None) => directory_service::list_services(&state.db).await?,
    };
    info!(count = list.len(), "list services");
    Ok(Json(list))
}

#[utoipa::path(
    post, path = "/admin/services", tag = "services",
    request_body = crate::openapi::ServiceInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ServiceDoc),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Duplicate name in category")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Json(input): Json<ServiceInput>,
) -> Result<(StatusCode, Json<models::service::Model>), JsonApiError> {
    let created = directory_service::create_service(&state.db, state.geocoder(), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/admin/services/{id}", tag = "services",
    params(("id" = i32, Path, description = "Service id")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::ServiceDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<models::service::Model>, JsonApiError> {
    directory_service::get_service(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found("service"))
}

#[utoipa::path(
    put, path = "/admin/services/{id}", tag = "services",
    params(("id" = i32, Path, description = "Service id")),
    request_body = crate::openapi::ServiceInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::ServiceDoc),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Duplicate name in category")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(input): Json<ServiceInput>,
) -> Result<Json<models::service::Model>, JsonApiError> {
    Ok(Json(directory_service::update_service(&state.db, state.geocoder(), id, input).await?))
}

#[utoipa::path(
    delete, path = "/admin/services/{id}", tag = "services",
    params(("id" = i32, Path, description = "Service id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    if directory_service::delete_service(&state.db, id).await? {
        info!(id, "deleted service");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::not_found("service"))
    }
}
