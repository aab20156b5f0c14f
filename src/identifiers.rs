// Identifier allocation
//
// Primary keys are assigned as "current maximum + 1". The read and the later
// insert are separate storage calls, so callers hold the write gate of
// `DataContext` across both; the primary-key constraint catches anything that
// still slips through.

use crate::error::DataError;
use crate::storage::{Storage, Table};

/// Identifier following `current_max`
///
/// An empty table yields 1, and so does a maximum at or below zero. Gaps left
/// by deleted rows are never reused.
pub fn next_after(current_max: Option<i64>) -> i64 {
    current_max
        .map(|max| max.saturating_add(1))
        .filter(|next| *next > 0)
        .unwrap_or(1)
}

/// Next free identifier for `table`
pub async fn next_identifier(storage: &dyn Storage, table: Table) -> Result<i64, DataError> {
    let current_max = storage.max_identifier(table).await?;
    let next = next_after(current_max);
    tracing::debug!("Allocated {} id {}", table.entity(), next);
    Ok(next)
}

/// Caller-supplied identifier if present, otherwise the next free one
pub async fn assign_identifier(
    storage: &dyn Storage,
    table: Table,
    requested: Option<i64>,
) -> Result<i64, DataError> {
    match requested {
        Some(id) if id > 0 => Ok(id),
        Some(id) => Err(DataError::invalid(format!(
            "{} id must be positive, got {}",
            table.entity(),
            id
        ))),
        None => next_identifier(storage, table).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::visitors;
    use crate::storage::{Fields, MemoryStorage, Value};

    async fn storage_with_visitors(ids: &[i64]) -> MemoryStorage {
        let storage = MemoryStorage::new();
        for id in ids {
            let fields: Fields = vec![
                (visitors::ID, Value::Int(*id)),
                (visitors::FIRSTNAME, format!("First{}", id).into()),
                (visitors::LASTNAME, "Doe".into()),
            ];
            storage.insert_row(Table::Visitors, &fields).await.unwrap();
        }
        storage
    }

    #[test]
    fn test_next_after() {
        assert_eq!(next_after(None), 1);
        assert_eq!(next_after(Some(0)), 1);
        assert_eq!(next_after(Some(-4)), 1);
        assert_eq!(next_after(Some(5)), 6);
        assert_eq!(next_after(Some(i64::MAX)), i64::MAX);
    }

    #[tokio::test]
    async fn test_empty_table_starts_at_one() {
        let storage = MemoryStorage::new();
        assert_eq!(next_identifier(&storage, Table::Visitors).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_gaps_are_not_filled() {
        let storage = storage_with_visitors(&[1, 3, 5]).await;
        assert_eq!(next_identifier(&storage, Table::Visitors).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_assign_uses_requested_id() {
        let storage = storage_with_visitors(&[1]).await;
        assert_eq!(
            assign_identifier(&storage, Table::Visitors, Some(40)).await.unwrap(),
            40
        );
        assert_eq!(
            assign_identifier(&storage, Table::Visitors, None).await.unwrap(),
            2
        );
        assert!(matches!(
            assign_identifier(&storage, Table::Visitors, Some(0)).await,
            Err(DataError::InvalidArgument { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_table_is_storage_error() {
        let storage = MemoryStorage::without_tables();
        assert!(matches!(
            next_identifier(&storage, Table::Hotels).await,
            Err(DataError::Storage(_))
        ));
    }
}
