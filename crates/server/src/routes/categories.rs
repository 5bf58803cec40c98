use axum::{extract::{Path, State}, http::StatusCode, Json};
use tracing::info;

use models::category;
use service::db::category_service::{self, CategoryInput};

use crate::errors::JsonApiError;
use crate::routes::ServerState;

#[utoipa::path(
    get, path = "/admin/categories", tag = "categories",
    responses((status = 200, description = "List OK", body = [crate::openapi::CategoryDoc]))
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<category::Model>>, JsonApiError> {
    Ok(Json(category_service::list_categories(&state.db).await?))
}

#[utoipa::path(
    post, path = "/admin/categories", tag = "categories",
    request_body = crate::openapi::CategoryInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::CategoryDoc),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Name already used")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<category::Model>), JsonApiError> {
    let created = category_service::create_category(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/admin/categories/{id}", tag = "categories",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::CategoryDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<category::Model>, JsonApiError> {
    category_service::get_category(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found("category"))
}

#[utoipa::path(
    put, path = "/admin/categories/{id}", tag = "categories",
    params(("id" = i32, Path, description = "Category id")),
    request_body = crate::openapi::CategoryInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::CategoryDoc),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Name already used")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<category::Model>, JsonApiError> {
    Ok(Json(category_service::update_category(&state.db, id, input).await?))
}

/// Deleting a category also deletes its services.
#[utoipa::path(
    delete, path = "/admin/categories/{id}", tag = "categories",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 204, description = "Deleted together with its services"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    if category_service::delete_category(&state.db, id).await? {
        info!(id, "deleted category");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::not_found("category"))
    }
}
