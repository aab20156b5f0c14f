// HTTP handlers for booking endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use utoipa::IntoParams;

use crate::bookings::{Booking, BookingFilter, BookingSummary, NewBooking};
use crate::error::ApiError;
use crate::AppState;

/// Query string for booking deletion
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BookingIdQuery {
    pub booking_id: i64,
}

/// Handler for POST and PUT /api/booking
/// Creates a new booking
#[utoipa::path(
    post,
    path = "/api/booking",
    request_body = NewBooking,
    responses(
        (status = 201, description = "Booking created successfully", body = Booking),
        (status = 400, description = "Invalid guests, dates, rooms, hotel or visitor"),
        (status = 409, description = "Booking already exists")
    ),
    tag = "bookings"
)]
pub async fn create_booking_handler(
    State(state): State<AppState>,
    Json(payload): Json<NewBooking>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    tracing::debug!(
        "Creating booking for visitor {} at hotel {}",
        payload.visitor_id,
        payload.hotel_id
    );
    let booking = state.booking_service.create_booking(payload).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Handler for GET /api/booking/:id
#[utoipa::path(
    get,
    path = "/api/booking/{id}",
    params(("id" = i64, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking found", body = Booking),
        (status = 404, description = "Booking not found")
    ),
    tag = "bookings"
)]
pub async fn get_booking_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Booking>, ApiError> {
    let booking = state
        .booking_service
        .get_booking(id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Booking".to_string(),
            id: id.to_string(),
        })?;
    Ok(Json(booking))
}

/// Handler for GET /api/bookings
#[utoipa::path(
    get,
    path = "/api/bookings",
    params(BookingFilter),
    responses(
        (status = 200, description = "Matching bookings, newest first", body = Vec<BookingSummary>),
        (status = 400, description = "fromdate after untildate")
    ),
    tag = "bookings"
)]
pub async fn list_bookings_handler(
    State(state): State<AppState>,
    Query(filter): Query<BookingFilter>,
) -> Result<Json<Vec<BookingSummary>>, ApiError> {
    let bookings = state.booking_service.get_bookings(&filter).await?;
    Ok(Json(bookings))
}

/// Handler for DELETE /api/booking?bookingId=
#[utoipa::path(
    delete,
    path = "/api/booking",
    params(BookingIdQuery),
    responses((status = 200, description = "Deletion outcome")),
    tag = "bookings"
)]
pub async fn delete_booking_handler(
    State(state): State<AppState>,
    Query(query): Query<BookingIdQuery>,
) -> Result<Json<JsonValue>, ApiError> {
    let deleted = state.booking_service.delete_booking(query.booking_id).await?;
    Ok(Json(json!({
        "success": true,
        "deleted": deleted,
        "bookingId": query.booking_id,
    })))
}
