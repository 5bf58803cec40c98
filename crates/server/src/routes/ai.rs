use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use integrations::ServiceDraft;
use service::db::category_service;
use service::db::directory_service::{self, ServiceInput};

use crate::errors::JsonApiError;
use crate::routes::ServerState;

#[derive(Debug, Deserialize)]
pub struct RawText {
    pub text: String,
    /// Store the extracted service right away.
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Serialize)]
pub struct ProcessTextOutput {
    pub draft: ServiceDraft,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<models::service::Model>,
}

fn failed(details: Option<String>) -> JsonApiError {
    JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process text", details)
}

/// Extract a service from free text with the language model.
#[utoipa::path(
    post, path = "/admin/process-text", tag = "ai",
    request_body = crate::openapi::RawTextDoc,
    responses(
        (status = 200, description = "Extracted draft (and the stored service when save=true)", body = crate::openapi::ProcessTextOutputDoc),
        (status = 400, description = "Empty text"),
        (status = 500, description = "Failed to process text"),
        (status = 503, description = "AI assistant not configured")
    )
)]
pub async fn process_text(
    State(state): State<ServerState>,
    Json(input): Json<RawText>,
) -> Result<Json<ProcessTextOutput>, JsonApiError> {
    let Some(assistant) = state.assistant.clone() else {
        return Err(JsonApiError::new(StatusCode::SERVICE_UNAVAILABLE, "AI Unavailable", Some("openai.api_key is not configured".into())));
    };
    let text = input.text.trim();
    if text.is_empty() {
        return Err(JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some("text is empty".into())));
    }

    let categories: Vec<String> = category_service::list_categories(&state.db)
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    let draft = match assistant.extract_service(text, &categories).await {
        Ok(Some(d)) => d,
        Ok(None) => return Err(failed(None)),
        Err(e) => {
            warn!(error = %e, "service extraction failed");
            return Err(failed(Some(e.to_string())));
        }
    };
    info!(name = %draft.name, category = %draft.category, save = input.save, "extracted service draft");

    let stored = if input.save {
        Some(directory_service::create_service(&state.db, state.geocoder(), ServiceInput::from(draft.clone())).await?)
    } else {
        None
    };
    Ok(Json(ProcessTextOutput { draft, service: stored }))
}
