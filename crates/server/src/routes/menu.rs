use axum::{extract::{Path, State}, http::StatusCode, Json};

use models::menu_button;
use service::db::menu_service::{self, MenuButtonInput};

use crate::errors::JsonApiError;
use crate::routes::ServerState;

#[utoipa::path(
    get, path = "/admin/menu", tag = "menu",
    responses((status = 200, description = "List OK", body = [crate::openapi::MenuButtonDoc]))
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<menu_button::Model>>, JsonApiError> {
    Ok(Json(menu_service::list_menu_buttons(&state.db).await?))
}

#[utoipa::path(
    post, path = "/admin/menu", tag = "menu",
    request_body = crate::openapi::MenuButtonInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::MenuButtonDoc),
        (status = 400, description = "Validation Error or unknown parent")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Json(input): Json<MenuButtonInput>,
) -> Result<(StatusCode, Json<menu_button::Model>), JsonApiError> {
    let created = menu_service::create_menu_button(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/admin/menu/{id}", tag = "menu",
    params(("id" = i32, Path, description = "Menu button id")),
    responses(
        (status = 200, description = "Found", body = crate::openapi::MenuButtonDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<menu_button::Model>, JsonApiError> {
    menu_service::get_menu_button(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found("menu button"))
}

#[utoipa::path(
    put, path = "/admin/menu/{id}", tag = "menu",
    params(("id" = i32, Path, description = "Menu button id")),
    request_body = crate::openapi::MenuButtonInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::MenuButtonDoc),
        (status = 400, description = "Validation Error or cycle"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(input): Json<MenuButtonInput>,
) -> Result<Json<menu_button::Model>, JsonApiError> {
    Ok(Json(menu_service::update_menu_button(&state.db, id, input).await?))
}

#[utoipa::path(
    delete, path = "/admin/menu/{id}", tag = "menu",
    params(("id" = i32, Path, description = "Menu button id")),
    responses(
        (status = 204, description = "Deleted; children become roots"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    if menu_service::delete_menu_button(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::not_found("menu button"))
    }
}
