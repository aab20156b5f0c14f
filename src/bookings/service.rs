use std::collections::BTreeMap;
use validator::Validate;

use crate::bookings::capacity::{minimum_rooms, stay_price};
use crate::bookings::{Booking, BookingFilter, BookingSummary, NewBooking};
use crate::conflicts::ensure_insertable;
use crate::error::DataError;
use crate::hotels::Hotel;
use crate::identifiers::assign_identifier;
use crate::manage::DataContext;
use crate::storage::{Predicate, Table};
use crate::visitors::Visitor;

/// Service layer for bookings
///
/// Bookings are created and deleted, never updated in place.
#[derive(Clone)]
pub struct BookingService {
    context: DataContext,
}

impl BookingService {
    pub fn new(context: DataContext) -> Self {
        Self { context }
    }

    /// Create a booking
    ///
    /// This method:
    /// 1. Validates guest counts, dates and rooms
    /// 2. Loads the hotel (for the default price) and checks the visitor
    /// 3. Rejects a duplicate of an existing booking
    /// 4. Allocates an identifier and inserts the row
    pub async fn create_booking(&self, request: NewBooking) -> Result<Booking, DataError> {
        if request.adults <= 0 {
            return Err(DataError::invalid("At least one adult is required"));
        }
        request.validate()?;
        if request.checkin >= request.checkout {
            return Err(DataError::invalid(
                "Checkin date must be before checkout date",
            ));
        }

        let required = minimum_rooms(request.adults, request.kids, request.babies);
        let rooms = match request.rooms {
            None => required,
            Some(rooms) if rooms < required => {
                return Err(DataError::invalid(format!(
                    "Not enough rooms for the number of guests ({} requested, {} required)",
                    rooms, required
                )));
            }
            Some(rooms) => rooms,
        };

        let storage = self.context.storage();
        let _gate = self.context.serialize_writes().await;

        let hotel = match storage.fetch_one(Table::Hotels, request.hotel_id).await? {
            Some(record) => Hotel::from_record(&record)?,
            None => {
                return Err(DataError::invalid(format!(
                    "Hotel {} does not exist",
                    request.hotel_id
                )))
            }
        };

        let visitor_rows = storage
            .count_matching(
                Table::Visitors,
                &Predicate::eq(Table::Visitors.primary_key(), request.visitor_id),
            )
            .await?;
        if visitor_rows == 0 {
            return Err(DataError::invalid(format!(
                "Visitor {} does not exist",
                request.visitor_id
            )));
        }

        ensure_insertable(
            storage,
            Table::Bookings,
            request.booking_id,
            request.natural_key(),
        )
        .await?;

        let booking_id = assign_identifier(storage, Table::Bookings, request.booking_id).await?;
        let nights = (request.checkout - request.checkin).num_days();
        let price = match request.price {
            Some(price) if price > 0.0 => price,
            _ => stay_price(hotel.price_per_night, nights, rooms),
        };

        let booking = Booking {
            booking_id,
            hotel_id: request.hotel_id,
            visitor_id: request.visitor_id,
            checkin: request.checkin,
            checkout: request.checkout,
            adults: request.adults,
            kids: request.kids,
            babies: request.babies,
            rooms,
            price,
        };
        storage.insert_row(Table::Bookings, &booking.to_fields()).await?;

        tracing::info!(
            "Successfully created booking {} for visitor {} at hotel {}",
            booking_id,
            booking.visitor_id,
            booking.hotel_id
        );
        Ok(booking)
    }

    pub async fn delete_booking(&self, booking_id: i64) -> Result<bool, DataError> {
        let _gate = self.context.serialize_writes().await;
        let deleted = self
            .context
            .storage()
            .delete_row(Table::Bookings, booking_id)
            .await?;
        if deleted {
            tracing::info!("Successfully deleted booking with id: {}", booking_id);
        }
        Ok(deleted)
    }

    pub async fn get_booking(&self, booking_id: i64) -> Result<Option<Booking>, DataError> {
        let record = self
            .context
            .storage()
            .fetch_one(Table::Bookings, booking_id)
            .await?;
        Ok(record.as_ref().map(Booking::from_record).transpose()?)
    }

    /// Bookings matching `filter`, newest first, with hotel and visitor names
    pub async fn get_bookings(&self, filter: &BookingFilter) -> Result<Vec<BookingSummary>, DataError> {
        if let (Some(from), Some(until)) = (filter.fromdate, filter.untildate) {
            if from > until {
                return Err(DataError::invalid("fromdate cannot be greater than untildate"));
            }
        }

        let storage = self.context.storage();
        let records = storage
            .fetch_matching(Table::Bookings, &filter.predicate())
            .await?;

        let mut hotel_names: BTreeMap<i64, Option<String>> = BTreeMap::new();
        let mut visitors: BTreeMap<i64, Option<Visitor>> = BTreeMap::new();
        let mut summaries = Vec::with_capacity(records.len());

        for record in &records {
            let booking = Booking::from_record(record)?;

            if !hotel_names.contains_key(&booking.hotel_id) {
                let name = match storage.fetch_one(Table::Hotels, booking.hotel_id).await? {
                    Some(hotel) => Some(Hotel::from_record(&hotel)?.hotelname),
                    None => None,
                };
                hotel_names.insert(booking.hotel_id, name);
            }
            if !visitors.contains_key(&booking.visitor_id) {
                let visitor = match storage.fetch_one(Table::Visitors, booking.visitor_id).await? {
                    Some(visitor) => Some(Visitor::from_record(&visitor)?),
                    None => None,
                };
                visitors.insert(booking.visitor_id, visitor);
            }

            let hotelname = hotel_names.get(&booking.hotel_id).cloned().flatten();
            let visitor = visitors.get(&booking.visitor_id).cloned().flatten();
            summaries.push(BookingSummary {
                booking,
                hotelname,
                firstname: visitor.as_ref().map(|v| v.firstname.clone()),
                lastname: visitor.map(|v| v.lastname),
            });
        }

        tracing::debug!("Retrieved {} bookings", summaries.len());
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotels::{HotelInput, HotelService};
    use crate::storage::MemoryStorage;
    use crate::visitors::{VisitorInput, VisitorService};
    use chrono::NaiveDate;
    use std::sync::Arc;

    struct Fixture {
        hotels: HotelService,
        visitors: VisitorService,
        bookings: BookingService,
    }

    async fn fixture() -> Fixture {
        let context = DataContext::new(Arc::new(MemoryStorage::new()));
        let fixture = Fixture {
            hotels: HotelService::new(context.clone()),
            visitors: VisitorService::new(context.clone()),
            bookings: BookingService::new(context),
        };
        fixture
            .hotels
            .create_hotel(HotelInput::new("Test", 100.0, 10))
            .await
            .unwrap();
        fixture
            .visitors
            .create_visitor(VisitorInput::new("A", "B"))
            .await
            .unwrap();
        fixture
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_defaults() {
        let f = fixture().await;
        let booking = f
            .bookings
            .create_booking(NewBooking::new(1, 1, day(1), day(3), 2))
            .await
            .unwrap();

        assert_eq!(booking.booking_id, 1);
        assert_eq!(booking.rooms, 1);
        assert_eq!(booking.price, 200.0);
        assert_eq!(f.bookings.get_booking(1).await.unwrap(), Some(booking));
    }

    #[tokio::test]
    async fn test_rooms_default_to_capacity() {
        let f = fixture().await;
        let mut request = NewBooking::new(1, 1, day(1), day(2), 2);
        request.kids = 1;
        let booking = f.bookings.create_booking(request).await.unwrap();
        assert_eq!(booking.rooms, 2);
        assert_eq!(booking.price, 200.0);
    }

    #[tokio::test]
    async fn test_supplied_price_is_kept() {
        let f = fixture().await;
        let mut request = NewBooking::new(1, 1, day(1), day(3), 2);
        request.price = Some(150.5);
        let booking = f.bookings.create_booking(request).await.unwrap();
        assert_eq!(booking.price, 150.5);

        let mut request = NewBooking::new(1, 1, day(4), day(5), 1);
        request.price = Some(0.0);
        let booking = f.bookings.create_booking(request).await.unwrap();
        assert_eq!(booking.price, 100.0);
    }

    #[tokio::test]
    async fn test_rejects_bad_dates() {
        let f = fixture().await;
        for (checkin, checkout) in [(day(3), day(3)), (day(4), day(3))] {
            let result = f
                .bookings
                .create_booking(NewBooking::new(1, 1, checkin, checkout, 2))
                .await;
            assert!(matches!(result, Err(DataError::InvalidArgument { .. })));
        }
    }

    #[tokio::test]
    async fn test_rejects_too_few_rooms() {
        let f = fixture().await;
        let mut request = NewBooking::new(1, 1, day(1), day(3), 3);
        request.rooms = Some(1);
        let result = f.bookings.create_booking(request).await;
        assert!(matches!(result, Err(DataError::InvalidArgument { .. })));
    }

    #[tokio::test]
    async fn test_rejects_no_adults() {
        let f = fixture().await;
        let result = f
            .bookings
            .create_booking(NewBooking::new(1, 1, day(1), day(3), 0))
            .await;
        assert!(matches!(
            result,
            Err(DataError::InvalidArgument { ref message, .. }) if message.contains("adult")
        ));
    }

    #[tokio::test]
    async fn test_unknown_hotel_or_visitor() {
        let f = fixture().await;
        let no_hotel = f
            .bookings
            .create_booking(NewBooking::new(9, 1, day(1), day(3), 2))
            .await;
        assert!(matches!(no_hotel, Err(DataError::InvalidArgument { .. })));

        let no_visitor = f
            .bookings
            .create_booking(NewBooking::new(1, 9, day(1), day(3), 2))
            .await;
        assert!(matches!(no_visitor, Err(DataError::InvalidArgument { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_booking() {
        let f = fixture().await;
        f.bookings
            .create_booking(NewBooking::new(1, 1, day(1), day(3), 2))
            .await
            .unwrap();

        let same_stay = f
            .bookings
            .create_booking(NewBooking::new(1, 1, day(1), day(3), 1))
            .await;
        assert!(matches!(
            same_stay,
            Err(DataError::AlreadyExists { entity: "Booking" })
        ));

        let mut same_id = NewBooking::new(1, 1, day(5), day(6), 1);
        same_id.booking_id = Some(1);
        let result = f.bookings.create_booking(same_id).await;
        assert!(matches!(result, Err(DataError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_list_bookings_with_names() {
        let f = fixture().await;
        f.visitors
            .create_visitor(VisitorInput::new("C", "D"))
            .await
            .unwrap();
        f.bookings
            .create_booking(NewBooking::new(1, 1, day(1), day(3), 2))
            .await
            .unwrap();
        f.bookings
            .create_booking(NewBooking::new(1, 2, day(10), day(12), 2))
            .await
            .unwrap();

        let all = f.bookings.get_bookings(&BookingFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].booking.booking_id, 2);
        assert_eq!(all[0].firstname.as_deref(), Some("C"));
        assert_eq!(all[1].hotelname.as_deref(), Some("Test"));

        let late = BookingFilter {
            fromdate: Some(day(4)),
            ..BookingFilter::default()
        };
        let late = f.bookings.get_bookings(&late).await.unwrap();
        assert_eq!(late.len(), 1);
        assert_eq!(late[0].booking.visitor_id, 2);

        let inverted = BookingFilter {
            fromdate: Some(day(4)),
            untildate: Some(day(2)),
            ..BookingFilter::default()
        };
        assert!(matches!(
            f.bookings.get_bookings(&inverted).await,
            Err(DataError::InvalidArgument { .. })
        ));
    }

    #[tokio::test]
    async fn test_hotel_delete_cascades() {
        let f = fixture().await;
        f.bookings
            .create_booking(NewBooking::new(1, 1, day(1), day(3), 2))
            .await
            .unwrap();

        assert!(f.hotels.delete_hotel(1).await.unwrap());
        assert_eq!(f.bookings.get_booking(1).await.unwrap(), None);
        assert!(!f.bookings.delete_booking(1).await.unwrap());
    }
}
