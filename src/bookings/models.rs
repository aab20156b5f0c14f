use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::storage::schema::bookings;
use crate::storage::{Fields, Predicate, Record, StorageError, Value};

/// A persisted booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[schema(example = 1)]
    pub booking_id: i64,
    #[schema(example = 1)]
    pub hotel_id: i64,
    #[schema(example = 1)]
    pub visitor_id: i64,
    #[schema(example = "2025-01-01")]
    pub checkin: NaiveDate,
    #[schema(example = "2025-01-03")]
    pub checkout: NaiveDate,
    #[schema(example = 2)]
    pub adults: i32,
    #[schema(example = 0)]
    pub kids: i32,
    #[schema(example = 0)]
    pub babies: i32,
    #[schema(example = 1)]
    pub rooms: i32,
    #[schema(example = 200.0)]
    pub price: f64,
}

impl Booking {
    pub fn to_fields(&self) -> Fields {
        vec![
            (bookings::ID, Value::Int(self.booking_id)),
            (bookings::HOTEL_ID, Value::Int(self.hotel_id)),
            (bookings::VISITOR_ID, Value::Int(self.visitor_id)),
            (bookings::CHECKIN, Value::Date(self.checkin)),
            (bookings::CHECKOUT, Value::Date(self.checkout)),
            (bookings::ADULTS, Value::from(self.adults)),
            (bookings::KIDS, Value::from(self.kids)),
            (bookings::BABIES, Value::from(self.babies)),
            (bookings::ROOMS, Value::from(self.rooms)),
            (bookings::PRICE, Value::Float(self.price)),
        ]
    }

    pub fn from_record(record: &Record) -> Result<Self, StorageError> {
        Ok(Self {
            booking_id: record.int(bookings::ID)?,
            hotel_id: record.int(bookings::HOTEL_ID)?,
            visitor_id: record.int(bookings::VISITOR_ID)?,
            checkin: record.date(bookings::CHECKIN)?,
            checkout: record.date(bookings::CHECKOUT)?,
            adults: record.small_int(bookings::ADULTS)?,
            kids: record.small_int(bookings::KIDS)?,
            babies: record.small_int(bookings::BABIES)?,
            rooms: record.small_int(bookings::ROOMS)?,
            price: record.float(bookings::PRICE)?,
        })
    }

    /// Number of nights between checkin and checkout
    pub fn nights(&self) -> i64 {
        (self.checkout - self.checkin).num_days()
    }
}

/// Request body for creating a booking
///
/// `rooms` defaults to the minimum the party needs and `price` to the
/// hotel's nightly rate times nights times rooms.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub hotel_id: i64,
    pub visitor_id: i64,
    #[schema(example = "2025-01-01")]
    pub checkin: NaiveDate,
    #[schema(example = "2025-01-03")]
    pub checkout: NaiveDate,
    #[validate(range(min = 1, max = 10, message = "Between 1 and 10 adults are allowed"))]
    pub adults: i32,
    #[serde(default)]
    #[validate(range(min = 0, max = 10, message = "Between 0 and 10 kids are allowed"))]
    pub kids: i32,
    #[serde(default)]
    #[validate(range(min = 0, max = 10, message = "Between 0 and 10 babies are allowed"))]
    pub babies: i32,
    #[validate(range(min = 1, max = 10, message = "Between 1 and 10 rooms are allowed"))]
    pub rooms: Option<i32>,
    pub price: Option<f64>,
    pub booking_id: Option<i64>,
}

impl NewBooking {
    pub fn new(hotel_id: i64, visitor_id: i64, checkin: NaiveDate, checkout: NaiveDate, adults: i32) -> Self {
        Self {
            hotel_id,
            visitor_id,
            checkin,
            checkout,
            adults,
            kids: 0,
            babies: 0,
            rooms: None,
            price: None,
            booking_id: None,
        }
    }

    /// Duplicate-booking key: same hotel, visitor and dates
    pub fn natural_key(&self) -> Predicate {
        Predicate::all_of(vec![
            Predicate::eq(bookings::HOTEL_ID, self.hotel_id),
            Predicate::eq(bookings::VISITOR_ID, self.visitor_id),
            Predicate::eq(bookings::CHECKIN, self.checkin),
            Predicate::eq(bookings::CHECKOUT, self.checkout),
        ])
    }
}

/// Booking joined with its hotel name and visitor names
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    #[serde(flatten)]
    pub booking: Booking,
    pub hotelname: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

/// Filters for listing bookings; all optional
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BookingFilter {
    pub visitor_id: Option<i64>,
    pub hotel_id: Option<i64>,
    /// Bookings checking out on or after this date
    pub fromdate: Option<NaiveDate>,
    /// Bookings checking in on or before this date
    pub untildate: Option<NaiveDate>,
}

impl BookingFilter {
    pub fn predicate(&self) -> Predicate {
        let mut predicates = Vec::new();
        if let Some(visitor_id) = self.visitor_id {
            predicates.push(Predicate::eq(bookings::VISITOR_ID, visitor_id));
        }
        if let Some(hotel_id) = self.hotel_id {
            predicates.push(Predicate::eq(bookings::HOTEL_ID, hotel_id));
        }
        if let Some(fromdate) = self.fromdate {
            predicates.push(Predicate::AtLeast(bookings::CHECKOUT, fromdate.into()));
        }
        if let Some(untildate) = self.untildate {
            predicates.push(Predicate::AtMost(bookings::CHECKIN, untildate.into()));
        }
        Predicate::all_of(predicates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn test_new_booking_defaults_from_json() {
        let booking: NewBooking = serde_json::from_str(
            r#"{"hotelId": 1, "visitorId": 2, "checkin": "2025-01-01",
                "checkout": "2025-01-03", "adults": 2}"#,
        )
        .unwrap();
        assert_eq!(booking.kids, 0);
        assert_eq!(booking.babies, 0);
        assert_eq!(booking.rooms, None);
        assert_eq!(booking.checkout, day(3));
    }

    #[test]
    fn test_guest_ranges() {
        let mut booking = NewBooking::new(1, 1, day(1), day(2), 0);
        assert!(booking.validate().is_err());

        booking.adults = 11;
        assert!(booking.validate().is_err());

        booking.adults = 2;
        assert!(booking.validate().is_ok());

        booking.kids = -1;
        assert!(booking.validate().is_err());

        booking.kids = 0;
        booking.rooms = Some(0);
        assert!(booking.validate().is_err());
    }

    #[test]
    fn test_filter_predicate() {
        assert_eq!(BookingFilter::default().predicate(), Predicate::All);

        let filter = BookingFilter {
            hotel_id: Some(3),
            fromdate: Some(day(5)),
            ..BookingFilter::default()
        };
        let booking = Booking {
            booking_id: 1,
            hotel_id: 3,
            visitor_id: 1,
            checkin: day(1),
            checkout: day(5),
            adults: 1,
            kids: 0,
            babies: 0,
            rooms: 1,
            price: 100.0,
        };
        let record = Record::from_fields(crate::storage::Table::Bookings, &booking.to_fields());
        assert!(filter.predicate().matches(&record));

        let later = BookingFilter {
            fromdate: Some(day(6)),
            ..filter
        };
        assert!(!later.predicate().matches(&record));
    }

    #[test]
    fn test_summary_json_is_flat() {
        let summary = BookingSummary {
            booking: Booking {
                booking_id: 4,
                hotel_id: 1,
                visitor_id: 2,
                checkin: day(1),
                checkout: day(3),
                adults: 2,
                kids: 0,
                babies: 0,
                rooms: 1,
                price: 200.0,
            },
            hotelname: Some("Test".to_string()),
            firstname: Some("A".to_string()),
            lastname: Some("B".to_string()),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["bookingId"], 4);
        assert_eq!(json["checkin"], "2025-01-01");
        assert_eq!(json["hotelname"], "Test");
        assert_eq!(summary.booking.nights(), 2);
    }
}
