use validator::Validate;

use crate::conflicts::{ensure_exists, ensure_insertable};
use crate::error::DataError;
use crate::hotels::{Hotel, HotelInput, DEFAULT_COUNTRY};
use crate::identifiers::assign_identifier;
use crate::manage::{DataContext, WriteMode};
use crate::storage::schema::hotels;
use crate::storage::{Predicate, Table};

/// Service layer for hotel management
#[derive(Clone)]
pub struct HotelService {
    context: DataContext,
}

impl HotelService {
    pub fn new(context: DataContext) -> Self {
        Self { context }
    }

    pub async fn create_hotel(&self, input: HotelInput) -> Result<Hotel, DataError> {
        self.manage_hotel(input, WriteMode::Insert).await
    }

    pub async fn update_hotel(&self, input: HotelInput) -> Result<Hotel, DataError> {
        self.manage_hotel(input, WriteMode::Update).await
    }

    /// Insert or update a hotel
    ///
    /// This method:
    /// 1. Validates the request
    /// 2. Checks for a conflicting row (insert) or the target row (update)
    /// 3. Allocates an identifier when inserting
    /// 4. Writes the row
    pub async fn manage_hotel(&self, input: HotelInput, mode: WriteMode) -> Result<Hotel, DataError> {
        input.validate()?;

        let storage = self.context.storage();
        let _gate = self.context.serialize_writes().await;

        match mode {
            WriteMode::Insert => {
                tracing::debug!("Creating hotel: {}", input.hotelname);
                ensure_insertable(
                    storage,
                    Table::Hotels,
                    input.hotel_id,
                    Predicate::eq(hotels::NAME, input.hotelname.as_str()),
                )
                .await?;

                let hotel_id = assign_identifier(storage, Table::Hotels, input.hotel_id).await?;
                let hotel = Hotel {
                    hotel_id,
                    hotelname: input.hotelname,
                    price_per_night: input.price_per_night,
                    total_rooms: input.total_rooms,
                    country: input.country.unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
                    amenities: input.amenities.with_defaults(),
                };
                storage.insert_row(Table::Hotels, &hotel.to_fields()).await?;

                tracing::info!("Successfully created hotel with id: {}", hotel.hotel_id);
                Ok(hotel)
            }
            WriteMode::Update => {
                let hotel_id = input
                    .hotel_id
                    .ok_or_else(|| DataError::invalid("hotelId is required for update"))?;
                tracing::debug!("Updating hotel with id: {}", hotel_id);

                ensure_exists(storage, Table::Hotels, hotel_id).await?;
                storage
                    .update_row(Table::Hotels, hotel_id, &input.update_fields())
                    .await?;

                let hotel = self.read_hotel(hotel_id).await?;
                tracing::info!("Successfully updated hotel with id: {}", hotel_id);
                Ok(hotel)
            }
        }
    }

    /// Delete a hotel and, through the storage cascade, its bookings
    pub async fn delete_hotel(&self, hotel_id: i64) -> Result<bool, DataError> {
        let _gate = self.context.serialize_writes().await;
        let deleted = self.context.storage().delete_row(Table::Hotels, hotel_id).await?;
        if deleted {
            tracing::info!("Successfully deleted hotel with id: {}", hotel_id);
        }
        Ok(deleted)
    }

    pub async fn get_hotel(&self, hotel_id: i64) -> Result<Option<Hotel>, DataError> {
        let record = self.context.storage().fetch_one(Table::Hotels, hotel_id).await?;
        Ok(record.as_ref().map(Hotel::from_record).transpose()?)
    }

    /// Hotels whose name contains (or, with `exact_match`, equals) `name`,
    /// newest first; a blank name lists every hotel
    pub async fn get_hotels(&self, name: &str, exact_match: bool) -> Result<Vec<Hotel>, DataError> {
        let name = name.trim();
        let predicate = match (name.is_empty(), exact_match) {
            (true, _) => Predicate::All,
            (false, true) => Predicate::eq(hotels::NAME, name),
            (false, false) => Predicate::Contains(hotels::NAME, name.to_string()),
        };

        let records = self
            .context
            .storage()
            .fetch_matching(Table::Hotels, &predicate)
            .await?;
        tracing::debug!("Retrieved {} hotels", records.len());

        Ok(records
            .iter()
            .map(Hotel::from_record)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn read_hotel(&self, hotel_id: i64) -> Result<Hotel, DataError> {
        self.get_hotel(hotel_id).await?.ok_or(DataError::NotFound {
            entity: Table::Hotels.entity(),
            id: hotel_id,
        })
    }
}
