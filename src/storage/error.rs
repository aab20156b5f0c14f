use thiserror::Error;

/// Errors raised by a storage adapter
///
/// Every adapter reports failures through this type so the core never sees
/// driver-specific errors. Constraint violations are kept apart from other
/// database failures because they are the storage layer's second line of
/// defense behind the entity validator.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Unique, foreign key, check or not-null constraint rejected the write
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Update targeted a primary key that has no row
    #[error("No row with id {id} in {table}")]
    RowNotFound { table: &'static str, id: i64 },

    /// Operation on a table that has not been created (or was dropped)
    #[error("Table {0} does not exist")]
    MissingTable(&'static str),

    /// A column was absent or held an unexpected type when decoding a row
    #[error("Cannot decode column {column} of {table}")]
    Decode {
        table: &'static str,
        column: String,
    },

    /// Column type the adapter does not know how to map
    #[error("Unsupported column type {type_name} for column {column}")]
    UnsupportedColumn { column: String, type_name: String },

    /// Any other database failure (connectivity, protocol, ...)
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Schema migration failed at startup
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        if let sqlx::Error::Database(ref db_err) = err {
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    return StorageError::ConstraintViolation(db_err.message().to_string());
                }
                _ => {}
            }
        }

        StorageError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = StorageError::RowNotFound {
            table: "hotels",
            id: 7,
        };
        assert_eq!(error.to_string(), "No row with id 7 in hotels");

        let error = StorageError::ConstraintViolation("hotelname must be unique".to_string());
        assert_eq!(
            error.to_string(),
            "Constraint violation: hotelname must be unique"
        );
    }

    #[test]
    fn test_error_from_sqlx() {
        let storage_error: StorageError = sqlx::Error::RowNotFound.into();
        assert!(matches!(storage_error, StorageError::Database(_)));
    }
}
