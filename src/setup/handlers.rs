// HTTP handler for schema setup

use axum::{extract::State, http::StatusCode, Json};

use crate::error::ApiError;
use crate::setup::{SetupReport, SetupRequest};
use crate::AppState;

/// Handler for POST /api/setup
/// Drops, creates and populates the schema as requested
#[utoipa::path(
    post,
    path = "/api/setup",
    request_body = SetupRequest,
    responses(
        (status = 201, description = "Setup steps completed", body = SetupReport),
        (status = 400, description = "Invalid combination of setup options"),
        (status = 500, description = "Storage failure during setup")
    ),
    tag = "setup"
)]
pub async fn setup_handler(
    State(state): State<AppState>,
    Json(payload): Json<SetupRequest>,
) -> Result<(StatusCode, Json<SetupReport>), ApiError> {
    tracing::debug!("Running setup: {:?}", payload);
    let report = state.setup_service.setup(&payload).await?;
    Ok((StatusCode::CREATED, Json(report)))
}
