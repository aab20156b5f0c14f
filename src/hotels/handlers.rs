// HTTP handlers for hotel endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::hotels::{Hotel, HotelInput, HotelSearch, AMENITY_CATALOG};
use crate::AppState;

/// Query string for hotel deletion
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct HotelIdQuery {
    pub hotel_id: i64,
}

/// Handler for POST /api/hotel
/// Creates a new hotel
#[utoipa::path(
    post,
    path = "/api/hotel",
    request_body = HotelInput,
    responses(
        (status = 201, description = "Hotel created successfully", body = Hotel),
        (status = 400, description = "Invalid input data"),
        (status = 409, description = "Hotel with the same id or name already exists")
    ),
    tag = "hotels"
)]
pub async fn create_hotel_handler(
    State(state): State<AppState>,
    Json(payload): Json<HotelInput>,
) -> Result<(StatusCode, Json<Hotel>), ApiError> {
    let hotel = state.hotel_service.create_hotel(payload).await?;
    Ok((StatusCode::CREATED, Json(hotel)))
}

/// Handler for PUT /api/hotel
/// Updates an existing hotel; amenity flags and country are only changed when supplied
#[utoipa::path(
    put,
    path = "/api/hotel",
    request_body = HotelInput,
    responses(
        (status = 200, description = "Hotel updated successfully", body = Hotel),
        (status = 400, description = "Invalid input data or missing hotelId"),
        (status = 404, description = "Hotel not found")
    ),
    tag = "hotels"
)]
pub async fn update_hotel_handler(
    State(state): State<AppState>,
    Json(payload): Json<HotelInput>,
) -> Result<Json<Hotel>, ApiError> {
    let hotel = state.hotel_service.update_hotel(payload).await?;
    Ok(Json(hotel))
}

/// Handler for GET /api/hotel/:id
#[utoipa::path(
    get,
    path = "/api/hotel/{id}",
    params(("id" = i64, Path, description = "Hotel ID")),
    responses(
        (status = 200, description = "Hotel found", body = Hotel),
        (status = 404, description = "Hotel not found")
    ),
    tag = "hotels"
)]
pub async fn get_hotel_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Hotel>, ApiError> {
    tracing::debug!("Fetching hotel with id: {}", id);
    let hotel = state
        .hotel_service
        .get_hotel(id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Hotel".to_string(),
            id: id.to_string(),
        })?;
    Ok(Json(hotel))
}

/// Handler for GET /api/hotels
/// Lists hotels, optionally filtered by name
#[utoipa::path(
    get,
    path = "/api/hotels",
    params(
        ("hotelname" = Option<String>, Query, description = "Name or name fragment"),
        ("exactMatch" = Option<bool>, Query, description = "Match the whole name")
    ),
    responses((status = 200, description = "Matching hotels, newest first", body = Vec<Hotel>)),
    tag = "hotels"
)]
pub async fn list_hotels_handler(
    State(state): State<AppState>,
    Query(search): Query<HotelSearch>,
) -> Result<Json<Vec<Hotel>>, ApiError> {
    let name = search.hotelname.unwrap_or_default();
    let exact_match = search.exact_match.map(bool::from).unwrap_or(false);
    let hotels = state.hotel_service.get_hotels(&name, exact_match).await?;
    Ok(Json(hotels))
}

/// Handler for DELETE /api/hotel?hotelId=
/// Deleting a hotel also deletes its bookings
#[utoipa::path(
    delete,
    path = "/api/hotel",
    params(HotelIdQuery),
    responses((status = 200, description = "Deletion outcome")),
    tag = "hotels"
)]
pub async fn delete_hotel_handler(
    State(state): State<AppState>,
    Query(query): Query<HotelIdQuery>,
) -> Result<Json<JsonValue>, ApiError> {
    let deleted = state.hotel_service.delete_hotel(query.hotel_id).await?;
    Ok(Json(json!({
        "success": true,
        "deleted": deleted,
        "hotelId": query.hotel_id,
    })))
}

/// Handler for GET /api/amenities
/// Amenity keys with their descriptions
#[utoipa::path(
    get,
    path = "/api/amenities",
    responses((status = 200, description = "Amenity catalog keyed by JSON field name")),
    tag = "hotels"
)]
pub async fn get_amenities_handler() -> Json<JsonValue> {
    let catalog: Map<String, JsonValue> = AMENITY_CATALOG
        .iter()
        .map(|amenity| (amenity.key.to_string(), JsonValue::from(amenity.description)))
        .collect();
    Json(JsonValue::Object(catalog))
}
