// In-memory storage adapter
//
// Mirrors the constraints of the Postgres schema so that tests and the
// `STORAGE_BACKEND=memory` mode reject the same writes a real database would.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::schema::{bookings, hotels, visitors};
use super::{Fields, Predicate, Record, Storage, StorageError, Table, Value};
use crate::bookings::capacity::minimum_rooms;

type Rows = BTreeMap<i64, Record>;

/// Storage backed by ordered maps behind a `tokio::sync::RwLock`
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<BTreeMap<Table, Rows>>,
}

impl MemoryStorage {
    /// Storage with all three tables created and empty
    pub fn new() -> Self {
        let tables = Table::ALL.iter().map(|t| (*t, Rows::new())).collect();
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Storage with no tables at all, as a freshly provisioned database
    pub fn without_tables() -> Self {
        Self::default()
    }
}

fn rows(tables: &BTreeMap<Table, Rows>, table: Table) -> Result<&Rows, StorageError> {
    tables
        .get(&table)
        .ok_or(StorageError::MissingTable(table.name()))
}

fn rows_mut(tables: &mut BTreeMap<Table, Rows>, table: Table) -> Result<&mut Rows, StorageError> {
    tables
        .get_mut(&table)
        .ok_or(StorageError::MissingTable(table.name()))
}

fn violation(message: impl Into<String>) -> StorageError {
    StorageError::ConstraintViolation(message.into())
}

fn int_in_range(record: &Record, column: &str, min: i64, max: i64) -> Result<i64, StorageError> {
    let value = record
        .int(column)
        .map_err(|_| violation(format!("null value in column \"{}\"", column)))?;
    if value < min || value > max {
        return Err(violation(format!(
            "value {} for column \"{}\" violates check constraint",
            value, column
        )));
    }
    Ok(value)
}

/// Column checks for a complete candidate row
fn check_row(table: Table, record: &Record) -> Result<(), StorageError> {
    match table {
        Table::Hotels => {
            record
                .text(hotels::NAME)
                .map_err(|_| violation("null value in column \"hotelname\""))?;
            let price = record
                .float(hotels::PRICE_PER_NIGHT)
                .map_err(|_| violation("null value in column \"price_per_night\""))?;
            if price <= 0.0 {
                return Err(violation("price_per_night must be greater than 0"));
            }
            if record.get(hotels::TOTAL_ROOMS).is_some() {
                int_in_range(record, hotels::TOTAL_ROOMS, 1, i64::from(i32::MAX))?;
            }
        }
        Table::Visitors => {
            for column in [visitors::FIRSTNAME, visitors::LASTNAME] {
                record
                    .text(column)
                    .map_err(|_| violation(format!("null value in column \"{}\"", column)))?;
            }
        }
        Table::Bookings => {
            let adults = int_in_range(record, bookings::ADULTS, 1, 10)?;
            let kids = int_in_range(record, bookings::KIDS, 0, 10)?;
            let babies = int_in_range(record, bookings::BABIES, 0, 10)?;
            let rooms = int_in_range(record, bookings::ROOMS, 1, 10)?;

            let checkin = record
                .date(bookings::CHECKIN)
                .map_err(|_| violation("null value in column \"checkin\""))?;
            let checkout = record
                .date(bookings::CHECKOUT)
                .map_err(|_| violation("null value in column \"checkout\""))?;
            if checkin >= checkout {
                return Err(violation("ck_checkdates: checkin must be before checkout"));
            }

            // Bounded to 0..=10 above, so the narrowing cannot truncate
            let required = minimum_rooms(adults as i32, kids as i32, babies as i32);
            if rooms < i64::from(required) {
                return Err(violation("ck_rooms: not enough rooms for the guests"));
            }

            record
                .float(bookings::PRICE)
                .map_err(|_| violation("null value in column \"price\""))?;
        }
    }
    Ok(())
}

/// Unique keys other than the primary key
fn check_unique(table: Table, rows: &Rows, id: i64, record: &Record) -> Result<(), StorageError> {
    let columns: &[&str] = match table {
        Table::Hotels => &[hotels::NAME],
        Table::Visitors => &[visitors::FIRSTNAME, visitors::LASTNAME],
        Table::Bookings => return Ok(()),
    };

    let clash = rows.iter().any(|(other_id, other)| {
        *other_id != id
            && columns
                .iter()
                .all(|column| other.get(column) == record.get(column))
    });

    if clash {
        return Err(violation(format!(
            "duplicate key value violates unique constraint on {} ({})",
            table.name(),
            columns.join(", ")
        )));
    }
    Ok(())
}

fn check_references(
    tables: &BTreeMap<Table, Rows>,
    table: Table,
    record: &Record,
) -> Result<(), StorageError> {
    if table != Table::Bookings {
        return Ok(());
    }

    for (column, parent) in [
        (bookings::HOTEL_ID, Table::Hotels),
        (bookings::VISITOR_ID, Table::Visitors),
    ] {
        let id = record
            .int(column)
            .map_err(|_| violation(format!("null value in column \"{}\"", column)))?;
        if !rows(tables, parent)?.contains_key(&id) {
            return Err(violation(format!(
                "insert or update on bookings violates foreign key on {} ({} = {})",
                parent.name(),
                column,
                id
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn count_matching(
        &self,
        table: Table,
        predicate: &Predicate,
    ) -> Result<i64, StorageError> {
        let tables = self.tables.read().await;
        let count = rows(&tables, table)?
            .values()
            .filter(|record| predicate.matches(record))
            .count();
        Ok(count as i64)
    }

    async fn max_identifier(&self, table: Table) -> Result<Option<i64>, StorageError> {
        let tables = self.tables.read().await;
        Ok(rows(&tables, table)?.keys().next_back().copied())
    }

    async fn fetch_one(&self, table: Table, id: i64) -> Result<Option<Record>, StorageError> {
        let tables = self.tables.read().await;
        Ok(rows(&tables, table)?.get(&id).cloned())
    }

    async fn fetch_matching(
        &self,
        table: Table,
        predicate: &Predicate,
    ) -> Result<Vec<Record>, StorageError> {
        let tables = self.tables.read().await;
        Ok(rows(&tables, table)?
            .values()
            .rev()
            .filter(|record| predicate.matches(record))
            .cloned()
            .collect())
    }

    async fn insert_row(&self, table: Table, fields: &Fields) -> Result<(), StorageError> {
        let record = Record::from_fields(table, fields);
        let id = record.int(table.primary_key()).map_err(|_| {
            violation(format!(
                "null value in column \"{}\"",
                table.primary_key()
            ))
        })?;

        let mut tables = self.tables.write().await;
        check_row(table, &record)?;
        check_references(&tables, table, &record)?;

        let rows = rows_mut(&mut tables, table)?;
        if rows.contains_key(&id) {
            return Err(violation(format!(
                "duplicate key value violates primary key of {} ({} = {})",
                table.name(),
                table.primary_key(),
                id
            )));
        }
        check_unique(table, rows, id, &record)?;

        rows.insert(id, record);
        Ok(())
    }

    async fn update_row(
        &self,
        table: Table,
        id: i64,
        fields: &Fields,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;

        let mut candidate = rows(&tables, table)?
            .get(&id)
            .cloned()
            .ok_or(StorageError::RowNotFound {
                table: table.name(),
                id,
            })?;
        for (column, value) in fields {
            if *column == table.primary_key() && *value != Value::Int(id) {
                return Err(violation("primary key cannot be changed"));
            }
            candidate.set(column, value.clone());
        }

        check_row(table, &candidate)?;
        check_references(&tables, table, &candidate)?;

        let rows = rows_mut(&mut tables, table)?;
        check_unique(table, rows, id, &candidate)?;
        rows.insert(id, candidate);
        Ok(())
    }

    async fn delete_row(&self, table: Table, id: i64) -> Result<bool, StorageError> {
        let mut tables = self.tables.write().await;
        let removed = rows_mut(&mut tables, table)?.remove(&id).is_some();

        let dependent_column = match table {
            Table::Hotels => Some(bookings::HOTEL_ID),
            Table::Visitors => Some(bookings::VISITOR_ID),
            Table::Bookings => None,
        };
        if let (true, Some(column)) = (removed, dependent_column) {
            if let Some(bookings) = tables.get_mut(&Table::Bookings) {
                bookings.retain(|_, booking| booking.get(column) != Some(&Value::Int(id)));
            }
        }

        Ok(removed)
    }

    async fn table_exists(&self, table: Table) -> Result<bool, StorageError> {
        Ok(self.tables.read().await.contains_key(&table))
    }

    async fn create_table(&self, table: Table) -> Result<(), StorageError> {
        self.tables.write().await.entry(table).or_default();
        Ok(())
    }

    async fn drop_tables(&self) -> Result<(), StorageError> {
        self.tables.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(day: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(2025, 1, day).unwrap())
    }

    fn hotel(id: i64, name: &str) -> Fields {
        vec![
            (hotels::ID, Value::Int(id)),
            (hotels::NAME, name.into()),
            (hotels::PRICE_PER_NIGHT, Value::Float(100.0)),
            (hotels::TOTAL_ROOMS, Value::Int(10)),
        ]
    }

    fn visitor(id: i64, first: &str, last: &str) -> Fields {
        vec![
            (visitors::ID, Value::Int(id)),
            (visitors::FIRSTNAME, first.into()),
            (visitors::LASTNAME, last.into()),
        ]
    }

    fn booking(id: i64, adults: i64, rooms: i64) -> Fields {
        vec![
            (bookings::ID, Value::Int(id)),
            (bookings::HOTEL_ID, Value::Int(1)),
            (bookings::VISITOR_ID, Value::Int(1)),
            (bookings::CHECKIN, date(1)),
            (bookings::CHECKOUT, date(3)),
            (bookings::ADULTS, Value::Int(adults)),
            (bookings::KIDS, Value::Int(0)),
            (bookings::BABIES, Value::Int(0)),
            (bookings::ROOMS, Value::Int(rooms)),
            (bookings::PRICE, Value::Float(200.0)),
        ]
    }

    async fn seeded() -> MemoryStorage {
        let storage = MemoryStorage::new();
        storage.insert_row(Table::Hotels, &hotel(1, "Test")).await.unwrap();
        storage
            .insert_row(Table::Visitors, &visitor(1, "A", "B"))
            .await
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn test_insert_and_fetch() {
        let storage = seeded().await;
        let record = storage.fetch_one(Table::Hotels, 1).await.unwrap().unwrap();
        assert_eq!(record.text(hotels::NAME).unwrap(), "Test");
        assert_eq!(storage.max_identifier(Table::Hotels).await.unwrap(), Some(1));
        assert_eq!(storage.max_identifier(Table::Bookings).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejects_duplicate_keys() {
        let storage = seeded().await;

        let same_id = storage.insert_row(Table::Hotels, &hotel(1, "Other")).await;
        assert!(matches!(same_id, Err(StorageError::ConstraintViolation(_))));

        let same_name = storage.insert_row(Table::Hotels, &hotel(2, "Test")).await;
        assert!(matches!(same_name, Err(StorageError::ConstraintViolation(_))));

        let same_person = storage
            .insert_row(Table::Visitors, &visitor(2, "A", "B"))
            .await;
        assert!(matches!(same_person, Err(StorageError::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_enforces_booking_checks() {
        let storage = seeded().await;

        assert!(storage.insert_row(Table::Bookings, &booking(1, 2, 1)).await.is_ok());

        // 3 adults need 2 rooms
        let short_on_rooms = storage.insert_row(Table::Bookings, &booking(2, 3, 1)).await;
        assert!(matches!(short_on_rooms, Err(StorageError::ConstraintViolation(_))));

        let mut reversed = booking(3, 2, 1);
        reversed[3].1 = date(5);
        let result = storage.insert_row(Table::Bookings, &reversed).await;
        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));

        let mut orphan = booking(4, 2, 1);
        orphan[1].1 = Value::Int(99);
        let result = storage.insert_row(Table::Bookings, &orphan).await;
        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let storage = seeded().await;
        let result = storage
            .update_row(Table::Hotels, 42, &vec![(hotels::NAME, "X".into())])
            .await;
        assert!(matches!(
            result,
            Err(StorageError::RowNotFound { table: "hotels", id: 42 })
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_unique_name() {
        let storage = seeded().await;
        storage.insert_row(Table::Hotels, &hotel(2, "Second")).await.unwrap();

        // Renaming to itself is fine, renaming onto another hotel is not
        storage
            .update_row(Table::Hotels, 2, &vec![(hotels::NAME, "Second".into())])
            .await
            .unwrap();
        let result = storage
            .update_row(Table::Hotels, 2, &vec![(hotels::NAME, "Test".into())])
            .await;
        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_bookings() {
        let storage = seeded().await;
        storage.insert_row(Table::Bookings, &booking(1, 2, 1)).await.unwrap();

        assert!(storage.delete_row(Table::Hotels, 1).await.unwrap());
        assert!(!storage.delete_row(Table::Hotels, 1).await.unwrap());
        assert_eq!(
            storage
                .count_matching(Table::Bookings, &Predicate::All)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_fetch_matching_newest_first() {
        let storage = seeded().await;
        storage.insert_row(Table::Hotels, &hotel(5, "Five")).await.unwrap();
        storage.insert_row(Table::Hotels, &hotel(3, "Three")).await.unwrap();

        let ids: Vec<i64> = storage
            .fetch_matching(Table::Hotels, &Predicate::All)
            .await
            .unwrap()
            .iter()
            .map(|r| r.int(hotels::ID).unwrap())
            .collect();
        assert_eq!(ids, vec![5, 3, 1]);
    }

    #[tokio::test]
    async fn test_table_lifecycle() {
        let storage = MemoryStorage::without_tables();
        assert!(!storage.table_exists(Table::Hotels).await.unwrap());
        assert!(matches!(
            storage.max_identifier(Table::Hotels).await,
            Err(StorageError::MissingTable("hotels"))
        ));

        storage.create_table(Table::Hotels).await.unwrap();
        assert!(storage.table_exists(Table::Hotels).await.unwrap());

        storage.drop_tables().await.unwrap();
        assert!(!storage.table_exists(Table::Hotels).await.unwrap());
    }
}
