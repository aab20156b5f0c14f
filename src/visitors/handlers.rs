// HTTP handlers for visitor endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::visitors::{Visitor, VisitorInput, VisitorSearch};
use crate::AppState;

/// Query string for visitor deletion
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VisitorIdQuery {
    pub visitor_id: i64,
}

/// Handler for POST /api/visitor
#[utoipa::path(
    post,
    path = "/api/visitor",
    request_body = VisitorInput,
    responses(
        (status = 201, description = "Visitor created successfully", body = Visitor),
        (status = 400, description = "Invalid input data"),
        (status = 409, description = "Visitor already exists")
    ),
    tag = "visitors"
)]
pub async fn create_visitor_handler(
    State(state): State<AppState>,
    Json(payload): Json<VisitorInput>,
) -> Result<(StatusCode, Json<Visitor>), ApiError> {
    let visitor = state.visitor_service.create_visitor(payload).await?;
    Ok((StatusCode::CREATED, Json(visitor)))
}

/// Handler for PUT /api/visitor
#[utoipa::path(
    put,
    path = "/api/visitor",
    request_body = VisitorInput,
    responses(
        (status = 200, description = "Visitor updated successfully", body = Visitor),
        (status = 400, description = "Invalid input data or missing visitorId"),
        (status = 404, description = "Visitor not found")
    ),
    tag = "visitors"
)]
pub async fn update_visitor_handler(
    State(state): State<AppState>,
    Json(payload): Json<VisitorInput>,
) -> Result<Json<Visitor>, ApiError> {
    let visitor = state.visitor_service.update_visitor(payload).await?;
    Ok(Json(visitor))
}

/// Handler for GET /api/visitor/:id
#[utoipa::path(
    get,
    path = "/api/visitor/{id}",
    params(("id" = i64, Path, description = "Visitor ID")),
    responses(
        (status = 200, description = "Visitor found", body = Visitor),
        (status = 404, description = "Visitor not found")
    ),
    tag = "visitors"
)]
pub async fn get_visitor_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Visitor>, ApiError> {
    let visitor = state
        .visitor_service
        .get_visitor(id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Visitor".to_string(),
            id: id.to_string(),
        })?;
    Ok(Json(visitor))
}

/// Handler for GET /api/visitors
#[utoipa::path(
    get,
    path = "/api/visitors",
    params(
        ("name" = Option<String>, Query, description = "First or last name fragment"),
        ("exactMatch" = Option<bool>, Query, description = "Match a whole first or last name")
    ),
    responses((status = 200, description = "Matching visitors, newest first", body = Vec<Visitor>)),
    tag = "visitors"
)]
pub async fn list_visitors_handler(
    State(state): State<AppState>,
    Query(search): Query<VisitorSearch>,
) -> Result<Json<Vec<Visitor>>, ApiError> {
    let name = search.name.unwrap_or_default();
    let exact_match = search.exact_match.map(bool::from).unwrap_or(false);
    let visitors = state.visitor_service.get_visitors(&name, exact_match).await?;
    Ok(Json(visitors))
}

/// Handler for DELETE /api/visitor?visitorId=
#[utoipa::path(
    delete,
    path = "/api/visitor",
    params(VisitorIdQuery),
    responses((status = 200, description = "Deletion outcome")),
    tag = "visitors"
)]
pub async fn delete_visitor_handler(
    State(state): State<AppState>,
    Query(query): Query<VisitorIdQuery>,
) -> Result<Json<JsonValue>, ApiError> {
    let deleted = state.visitor_service.delete_visitor(query.visitor_id).await?;
    Ok(Json(json!({
        "success": true,
        "deleted": deleted,
        "visitorId": query.visitor_id,
    })))
}
