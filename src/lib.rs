//! Contoso hotel booking data-access core with a thin HTTP layer

pub mod bookings;
pub mod config;
pub mod conflicts;
pub mod db;
pub mod error;
pub mod hotels;
pub mod identifiers;
pub mod manage;
pub mod query;
pub mod setup;
pub mod storage;
pub mod validation;
pub mod visitors;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use bookings::BookingService;
use hotels::HotelService;
use manage::DataContext;
use setup::SetupService;
use visitors::VisitorService;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        setup::setup_handler,
        hotels::create_hotel_handler,
        hotels::update_hotel_handler,
        hotels::get_hotel_handler,
        hotels::list_hotels_handler,
        hotels::delete_hotel_handler,
        hotels::get_amenities_handler,
        visitors::create_visitor_handler,
        visitors::update_visitor_handler,
        visitors::get_visitor_handler,
        visitors::list_visitors_handler,
        visitors::delete_visitor_handler,
        bookings::create_booking_handler,
        bookings::get_booking_handler,
        bookings::list_bookings_handler,
        bookings::delete_booking_handler,
    ),
    components(schemas(
        hotels::Hotel,
        hotels::HotelInput,
        hotels::Amenities,
        hotels::AmenityPatch,
        visitors::Visitor,
        visitors::VisitorInput,
        bookings::Booking,
        bookings::NewBooking,
        bookings::BookingSummary,
        setup::SetupRequest,
        setup::SetupReport,
        setup::TableReport,
    )),
    tags(
        (name = "setup", description = "Schema and demo data setup"),
        (name = "hotels", description = "Hotel management endpoints"),
        (name = "visitors", description = "Visitor management endpoints"),
        (name = "bookings", description = "Booking management endpoints")
    ),
    info(
        title = "Contoso Hotel API",
        version = "1.0.0",
        description = "Hotels, visitors and bookings for the Contoso hotel chain"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub hotel_service: HotelService,
    pub visitor_service: VisitorService,
    pub booking_service: BookingService,
    pub setup_service: SetupService,
}

impl AppState {
    pub fn new(context: DataContext) -> Self {
        Self {
            hotel_service: HotelService::new(context.clone()),
            visitor_service: VisitorService::new(context.clone()),
            booking_service: BookingService::new(context.clone()),
            setup_service: SetupService::new(context),
        }
    }
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS and trace middleware
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/setup", post(setup::setup_handler))
        .route(
            "/api/hotel",
            post(hotels::create_hotel_handler)
                .put(hotels::update_hotel_handler)
                .delete(hotels::delete_hotel_handler),
        )
        .route("/api/hotel/:id", get(hotels::get_hotel_handler))
        .route("/api/hotels", get(hotels::list_hotels_handler))
        .route("/api/amenities", get(hotels::get_amenities_handler))
        .route(
            "/api/visitor",
            post(visitors::create_visitor_handler)
                .put(visitors::update_visitor_handler)
                .delete(visitors::delete_visitor_handler),
        )
        .route("/api/visitor/:id", get(visitors::get_visitor_handler))
        .route("/api/visitors", get(visitors::list_visitors_handler))
        .route(
            "/api/booking",
            post(bookings::create_booking_handler)
                .put(bookings::create_booking_handler)
                .delete(bookings::delete_booking_handler),
        )
        .route("/api/booking/:id", get(bookings::get_booking_handler))
        .route("/api/bookings", get(bookings::list_bookings_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
