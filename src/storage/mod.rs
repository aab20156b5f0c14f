// Storage boundary
//
// The booking core talks to persistence only through the `Storage` trait below.
// Rows travel as loosely typed `Record`s keyed by column name so that one trait
// serves all three tables; the entity models convert to and from them.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod schema;

pub use error::StorageError;
pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;

use async_trait::async_trait;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// The three persisted tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Hotels,
    Visitors,
    Bookings,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Hotels, Table::Visitors, Table::Bookings];

    /// SQL table name
    pub fn name(&self) -> &'static str {
        match self {
            Table::Hotels => "hotels",
            Table::Visitors => "visitors",
            Table::Bookings => "bookings",
        }
    }

    /// Primary key column
    pub fn primary_key(&self) -> &'static str {
        match self {
            Table::Hotels => schema::hotels::ID,
            Table::Visitors => schema::visitors::ID,
            Table::Bookings => schema::bookings::ID,
        }
    }

    /// Human readable entity name used in error messages
    pub fn entity(&self) -> &'static str {
        match self {
            Table::Hotels => "Hotel",
            Table::Visitors => "Visitor",
            Table::Bookings => "Booking",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single column value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDate),
}

impl Value {
    /// Compare two values of the same kind; mixed kinds are unordered
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

/// Column/value pairs for an insert or update
pub type Fields = Vec<(&'static str, Value)>;

/// One row read back from storage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    table: Option<Table>,
    values: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(table: Table) -> Self {
        Self {
            table: Some(table),
            values: BTreeMap::new(),
        }
    }

    /// Build a record from write fields
    pub fn from_fields(table: Table, fields: &Fields) -> Self {
        let mut record = Record::new(table);
        for (column, value) in fields {
            record.set(column, value.clone());
        }
        record
    }

    pub fn set(&mut self, column: &str, value: Value) {
        self.values.insert(column.to_string(), value);
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    fn decode_error(&self, column: &str) -> StorageError {
        StorageError::Decode {
            table: self.table.map(|t| t.name()).unwrap_or("unknown"),
            column: column.to_string(),
        }
    }

    pub fn int(&self, column: &str) -> Result<i64, StorageError> {
        match self.get(column) {
            Some(Value::Int(value)) => Ok(*value),
            _ => Err(self.decode_error(column)),
        }
    }

    /// Integer column that must fit in an `i32` (guest and room counts)
    pub fn small_int(&self, column: &str) -> Result<i32, StorageError> {
        let value = self.int(column)?;
        i32::try_from(value).map_err(|_| self.decode_error(column))
    }

    pub fn float(&self, column: &str) -> Result<f64, StorageError> {
        match self.get(column) {
            Some(Value::Float(value)) => Ok(*value),
            Some(Value::Int(value)) => Ok(*value as f64),
            _ => Err(self.decode_error(column)),
        }
    }

    pub fn text(&self, column: &str) -> Result<String, StorageError> {
        match self.get(column) {
            Some(Value::Text(value)) => Ok(value.clone()),
            _ => Err(self.decode_error(column)),
        }
    }

    /// Boolean column; NULL reads as false
    pub fn flag(&self, column: &str) -> Result<bool, StorageError> {
        match self.get(column) {
            Some(Value::Bool(value)) => Ok(*value),
            None => Ok(false),
            _ => Err(self.decode_error(column)),
        }
    }

    pub fn date(&self, column: &str) -> Result<NaiveDate, StorageError> {
        match self.get(column) {
            Some(Value::Date(value)) => Ok(*value),
            _ => Err(self.decode_error(column)),
        }
    }
}

/// Row filter understood by every adapter
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every row
    All,
    Eq(&'static str, Value),
    /// Substring match on a text column (SQL `LIKE '%x%'`)
    Contains(&'static str, String),
    /// Column >= value
    AtLeast(&'static str, Value),
    /// Column <= value
    AtMost(&'static str, Value),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Predicate::Eq(column, value.into())
    }

    /// Conjunction that collapses to `All` when empty and to the single
    /// predicate when only one is given
    pub fn all_of(mut predicates: Vec<Predicate>) -> Self {
        match predicates.len() {
            0 => Predicate::All,
            1 => predicates.remove(0),
            _ => Predicate::And(predicates),
        }
    }

    pub fn any_of(predicates: Vec<Predicate>) -> Self {
        Predicate::Or(predicates)
    }

    /// Evaluate against an in-memory record
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Eq(column, value) => record
                .get(column)
                .map(|stored| stored.compare(value) == Some(Ordering::Equal))
                .unwrap_or(false),
            Predicate::Contains(column, needle) => match record.get(column) {
                Some(Value::Text(text)) => text.contains(needle.as_str()),
                _ => false,
            },
            Predicate::AtLeast(column, value) => record
                .get(column)
                .and_then(|stored| stored.compare(value))
                .map(|ordering| ordering != Ordering::Less)
                .unwrap_or(false),
            Predicate::AtMost(column, value) => record
                .get(column)
                .and_then(|stored| stored.compare(value))
                .map(|ordering| ordering != Ordering::Greater)
                .unwrap_or(false),
            Predicate::And(predicates) => predicates.iter().all(|p| p.matches(record)),
            Predicate::Or(predicates) => predicates.iter().any(|p| p.matches(record)),
        }
    }
}

/// Storage port consumed by the booking core
///
/// Implementations must be safe to share across request handlers. Each method
/// is a single round trip; the trait makes no promise of atomicity across
/// calls.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Number of rows in `table` matching `predicate`
    async fn count_matching(&self, table: Table, predicate: &Predicate)
        -> Result<i64, StorageError>;

    /// Largest primary key in `table`, `None` when empty
    async fn max_identifier(&self, table: Table) -> Result<Option<i64>, StorageError>;

    /// Row with primary key `id`
    async fn fetch_one(&self, table: Table, id: i64) -> Result<Option<Record>, StorageError>;

    /// Rows matching `predicate`, primary key descending
    async fn fetch_matching(
        &self,
        table: Table,
        predicate: &Predicate,
    ) -> Result<Vec<Record>, StorageError>;

    /// Insert one row; constraint violations fail with `StorageError`
    async fn insert_row(&self, table: Table, fields: &Fields) -> Result<(), StorageError>;

    /// Overwrite the given columns of row `id`; fails with
    /// `StorageError::RowNotFound` if the row is absent
    async fn update_row(&self, table: Table, id: i64, fields: &Fields)
        -> Result<(), StorageError>;

    /// Delete row `id`, returning whether a row existed and was removed.
    /// Dependent bookings are removed with their hotel or visitor.
    async fn delete_row(&self, table: Table, id: i64) -> Result<bool, StorageError>;

    async fn table_exists(&self, table: Table) -> Result<bool, StorageError>;

    /// Create `table` if it is missing
    async fn create_table(&self, table: Table) -> Result<(), StorageError>;

    /// Drop all three tables
    async fn drop_tables(&self) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking_record() -> Record {
        let mut record = Record::new(Table::Bookings);
        record.set("hotel_id", Value::Int(3));
        record.set("checkin", Value::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        record.set("note", Value::Text("late arrival".to_string()));
        record
    }

    #[test]
    fn test_predicate_eq_and_contains() {
        let record = booking_record();
        assert!(Predicate::eq("hotel_id", 3i64).matches(&record));
        assert!(!Predicate::eq("hotel_id", 4i64).matches(&record));
        assert!(Predicate::Contains("note", "late".to_string()).matches(&record));
        assert!(!Predicate::Contains("note", "early".to_string()).matches(&record));
        assert!(!Predicate::eq("missing", 1i64).matches(&record));
    }

    #[test]
    fn test_predicate_date_bounds() {
        let record = booking_record();
        let jan_1 = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let jan_2 = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();

        assert!(Predicate::AtLeast("checkin", jan_1.into()).matches(&record));
        assert!(!Predicate::AtLeast("checkin", jan_2.into()).matches(&record));
        assert!(Predicate::AtMost("checkin", jan_2.into()).matches(&record));
    }

    #[test]
    fn test_predicate_combinators() {
        let record = booking_record();
        let hit = Predicate::eq("hotel_id", 3i64);
        let miss = Predicate::eq("hotel_id", 9i64);

        assert!(Predicate::any_of(vec![miss.clone(), hit.clone()]).matches(&record));
        assert!(!Predicate::all_of(vec![miss.clone(), hit.clone()]).matches(&record));
        assert_eq!(Predicate::all_of(vec![]), Predicate::All);
        assert_eq!(Predicate::all_of(vec![hit.clone()]), hit);
    }

    #[test]
    fn test_record_typed_getters() {
        let record = booking_record();
        assert_eq!(record.int("hotel_id").unwrap(), 3);
        assert_eq!(record.float("hotel_id").unwrap(), 3.0);
        assert!(record.text("hotel_id").is_err());
        assert!(!record.flag("skiing").unwrap());
        assert!(matches!(
            record.date("note"),
            Err(StorageError::Decode { table: "bookings", .. })
        ));
    }
}
