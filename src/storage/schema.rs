// Column names for the three tables, shared by the models and the adapters

pub mod hotels {
    pub const ID: &str = "hotel_id";
    pub const NAME: &str = "hotelname";
    pub const PRICE_PER_NIGHT: &str = "price_per_night";
    pub const TOTAL_ROOMS: &str = "total_rooms";
    pub const COUNTRY: &str = "country";
}

pub mod visitors {
    pub const ID: &str = "visitor_id";
    pub const FIRSTNAME: &str = "firstname";
    pub const LASTNAME: &str = "lastname";
}

pub mod bookings {
    pub const ID: &str = "booking_id";
    pub const HOTEL_ID: &str = "hotel_id";
    pub const VISITOR_ID: &str = "visitor_id";
    pub const CHECKIN: &str = "checkin";
    pub const CHECKOUT: &str = "checkout";
    pub const ADULTS: &str = "adults";
    pub const KIDS: &str = "kids";
    pub const BABIES: &str = "babies";
    pub const ROOMS: &str = "rooms";
    pub const PRICE: &str = "price";
}

/// DDL for each table, applied in dependency order
pub const HOTELS_DDL: &str = include_str!("../../migrations/0001_create_hotels.sql");
pub const VISITORS_DDL: &str = include_str!("../../migrations/0002_create_visitors.sql");
pub const BOOKINGS_DDL: &str = include_str!("../../migrations/0003_create_bookings.sql");
