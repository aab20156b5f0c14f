use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::storage::schema::hotels;
use crate::storage::{Fields, Record, StorageError, Value};
use crate::validation::{validate_not_blank, validate_positive_price, Flag};

/// Catalog entry describing one amenity flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmenityInfo {
    /// JSON key
    pub key: &'static str,
    /// Storage column
    pub column: &'static str,
    pub description: &'static str,
}

// Expands the amenity table into the full-record struct, the partial-update
// struct and the catalog, so the three can never disagree.
macro_rules! amenities {
    ($( $field:ident => $column:tt, $key:tt, $description:tt; )*) => {
        /// Amenity flags of a persisted hotel
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
        pub struct Amenities {
            $(
                #[serde(rename = $key)]
                pub $field: bool,
            )*
        }

        /// Amenity flags supplied by a caller; `None` means "not supplied"
        #[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
        pub struct AmenityPatch {
            $(
                #[serde(rename = $key, default)]
                #[schema(value_type = Option<bool>)]
                pub $field: Option<Flag>,
            )*
        }

        pub const AMENITY_CATALOG: &[AmenityInfo] = &[
            $( AmenityInfo { key: $key, column: $column, description: $description }, )*
        ];

        impl Amenities {
            pub fn to_fields(&self) -> Fields {
                vec![ $( ($column, Value::Bool(self.$field)), )* ]
            }

            pub fn from_record(record: &Record) -> Result<Self, StorageError> {
                Ok(Self { $( $field: record.flag($column)?, )* })
            }
        }

        impl AmenityPatch {
            /// Column writes for the flags that were supplied
            pub fn supplied_fields(&self) -> Fields {
                let mut fields = Fields::new();
                $(
                    if let Some(flag) = self.$field {
                        fields.push(($column, Value::Bool(flag.into())));
                    }
                )*
                fields
            }

            /// Full flag set, unsupplied flags defaulting to false
            pub fn with_defaults(&self) -> Amenities {
                Amenities {
                    $( $field: self.$field.map(bool::from).unwrap_or(false), )*
                }
            }
        }
    };
}

amenities! {
    skiing => "skiing", "skiing", "Skiing available nearby";
    suites => "suites", "suites", "Has suites available";
    in_room_entertainment => "in_room_entertainment", "inRoomEntertainment",
        "Flat-screen TVs, streaming services, high-speed Wi-Fi, and Bluetooth speakers";
    concierge_services => "concierge_services", "conciergeServices",
        "Assistance with booking tours, restaurant reservations, and other activities";
    housekeeping => "housekeeping", "housekeeping",
        "Regular cleaning services, often with eco-friendly options";
    pet_friendly_options => "pet_friendly_options", "petFriendlyOptions",
        "Amenities and services for guests traveling with pets";
    laundry_services => "laundry_services", "laundryServices",
        "On-site laundry and dry-cleaning services";
    room_service => "room_service", "roomService",
        "In-room dining options (available 24/7 in some hotels)";
    indoor_pool => "indoor_pool", "indoorPool",
        "Indoor pools, hot tubs, saunas, and spa services";
    outdoor_pool => "outdoor_pool", "outdoorPool", "Outdoor pools and hot tubs";
    fitness_center => "fitness_center", "fitnessCenter",
        "Equipped with modern exercise machines and sometimes offering fitness classes";
    complimentary_breakfast => "complimentary_breakfast", "complimentaryBreakfast",
        "Often includes a variety of hot and cold options";
    business_center => "business_center", "businessCenter",
        "Facilities with computers, printers, and meeting rooms for business travelers";
    free_guest_parking => "free_guest_parking", "freeGuestParking",
        "On-site parking facilities for guests";
    complimentary_coffee_and_tea => "complimentary_coffee_and_tea", "complimentaryCoffeaAndTea",
        "Complimentary coffee and tea kits, along with stocked mini-bars";
    climate_control => "climate_control", "climateControl",
        "Adjustable air conditioning and heating systems";
    bathroom_essentials => "bathroom_essentials", "bathroomEssentials",
        "Premium toiletries, hair dryers, bathrobes, and slippers";
}

pub const DEFAULT_COUNTRY: &str = "Unknown";

/// A persisted hotel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    #[schema(example = 1)]
    pub hotel_id: i64,
    #[schema(example = "Contoso Hotel Zurich")]
    pub hotelname: String,
    #[schema(example = 400.0)]
    pub price_per_night: f64,
    #[schema(example = 10)]
    pub total_rooms: i32,
    #[schema(example = "Switzerland")]
    pub country: String,
    #[serde(flatten)]
    pub amenities: Amenities,
}

impl Hotel {
    pub fn to_fields(&self) -> Fields {
        let mut fields: Fields = vec![
            (hotels::ID, Value::Int(self.hotel_id)),
            (hotels::NAME, self.hotelname.as_str().into()),
            (hotels::PRICE_PER_NIGHT, Value::Float(self.price_per_night)),
            (hotels::TOTAL_ROOMS, Value::from(self.total_rooms)),
            (hotels::COUNTRY, self.country.as_str().into()),
        ];
        fields.extend(self.amenities.to_fields());
        fields
    }

    pub fn from_record(record: &Record) -> Result<Self, StorageError> {
        Ok(Self {
            hotel_id: record.int(hotels::ID)?,
            hotelname: record.text(hotels::NAME)?,
            price_per_night: record.float(hotels::PRICE_PER_NIGHT)?,
            total_rooms: record.small_int(hotels::TOTAL_ROOMS)?,
            country: record.text(hotels::COUNTRY)?,
            amenities: Amenities::from_record(record)?,
        })
    }
}

/// Request body for creating or updating a hotel
///
/// `hotelId` is optional on create and required on update. Amenity flags
/// accept booleans, numbers or strings such as `"yes"`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotelInput {
    #[schema(example = 7)]
    pub hotel_id: Option<i64>,
    #[validate(
        length(min = 1, max = 200, message = "Hotel name must be 1 to 200 characters"),
        custom = "validate_not_blank"
    )]
    #[schema(example = "Contoso Hotel Oslo")]
    pub hotelname: String,
    #[validate(custom = "validate_positive_price")]
    #[schema(example = 250.0)]
    pub price_per_night: f64,
    #[validate(range(min = 1, message = "Total rooms must be at least 1"))]
    #[schema(example = 10)]
    pub total_rooms: i32,
    #[validate(length(max = 200, message = "Country must not exceed 200 characters"))]
    pub country: Option<String>,
    #[serde(flatten)]
    pub amenities: AmenityPatch,
}

impl HotelInput {
    pub fn new(hotelname: impl Into<String>, price_per_night: f64, total_rooms: i32) -> Self {
        Self {
            hotel_id: None,
            hotelname: hotelname.into(),
            price_per_night,
            total_rooms,
            country: None,
            amenities: AmenityPatch::default(),
        }
    }

    pub fn with_id(mut self, hotel_id: i64) -> Self {
        self.hotel_id = Some(hotel_id);
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Columns written on update: the core fields always, the rest only when supplied
    pub fn update_fields(&self) -> Fields {
        let mut fields: Fields = vec![
            (hotels::NAME, self.hotelname.as_str().into()),
            (hotels::PRICE_PER_NIGHT, Value::Float(self.price_per_night)),
            (hotels::TOTAL_ROOMS, Value::from(self.total_rooms)),
        ];
        if let Some(country) = &self.country {
            fields.push((hotels::COUNTRY, country.as_str().into()));
        }
        fields.extend(self.amenities.supplied_fields());
        fields
    }
}

/// Query string for hotel search
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearch {
    pub hotelname: Option<String>,
    pub exact_match: Option<Flag>,
}
