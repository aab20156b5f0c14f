// Existence and conflict checks run before any write

use crate::error::DataError;
use crate::storage::{Predicate, Storage, Table};

/// Fails with `AlreadyExists` when a row matches the requested primary key or
/// the natural key
///
/// A natural-key match is a conflict even when its identifier differs from
/// the requested one.
pub async fn ensure_insertable(
    storage: &dyn Storage,
    table: Table,
    requested_id: Option<i64>,
    natural_key: Predicate,
) -> Result<(), DataError> {
    let mut candidates = vec![natural_key];
    if let Some(id) = requested_id {
        candidates.push(Predicate::eq(table.primary_key(), id));
    }

    let matches = storage
        .count_matching(table, &Predicate::any_of(candidates))
        .await?;
    if matches > 0 {
        tracing::warn!("{} already exists ({} matching rows)", table.entity(), matches);
        return Err(DataError::AlreadyExists {
            entity: table.entity(),
        });
    }
    Ok(())
}

/// Fails with `NotFound` when no row has primary key `id`
pub async fn ensure_exists(storage: &dyn Storage, table: Table, id: i64) -> Result<(), DataError> {
    let matches = storage
        .count_matching(table, &Predicate::eq(table.primary_key(), id))
        .await?;
    if matches == 0 {
        tracing::debug!("{} with id {} does not exist", table.entity(), id);
        return Err(DataError::NotFound {
            entity: table.entity(),
            id,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::hotels;
    use crate::storage::{Fields, MemoryStorage, Value};

    async fn storage_with_hotel() -> MemoryStorage {
        let storage = MemoryStorage::new();
        let fields: Fields = vec![
            (hotels::ID, Value::Int(1)),
            (hotels::NAME, "Contoso Hotel Paris".into()),
            (hotels::PRICE_PER_NIGHT, Value::Float(200.0)),
            (hotels::TOTAL_ROOMS, Value::Int(10)),
        ];
        storage.insert_row(Table::Hotels, &fields).await.unwrap();
        storage
    }

    fn name_key(name: &str) -> Predicate {
        Predicate::eq(hotels::NAME, name)
    }

    #[tokio::test]
    async fn test_name_conflict_with_other_id() {
        let storage = storage_with_hotel().await;
        let result =
            ensure_insertable(&storage, Table::Hotels, Some(9), name_key("Contoso Hotel Paris"))
                .await;
        assert!(matches!(
            result,
            Err(DataError::AlreadyExists { entity: "Hotel" })
        ));
    }

    #[tokio::test]
    async fn test_id_conflict_with_new_name() {
        let storage = storage_with_hotel().await;
        let result = ensure_insertable(&storage, Table::Hotels, Some(1), name_key("Fresh")).await;
        assert!(matches!(result, Err(DataError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_insertable_when_unique() {
        let storage = storage_with_hotel().await;
        assert!(ensure_insertable(&storage, Table::Hotels, None, name_key("Fresh"))
            .await
            .is_ok());
        assert!(ensure_insertable(&storage, Table::Hotels, Some(2), name_key("Fresh"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_ensure_exists() {
        let storage = storage_with_hotel().await;
        assert!(ensure_exists(&storage, Table::Hotels, 1).await.is_ok());
        assert!(matches!(
            ensure_exists(&storage, Table::Hotels, 2).await,
            Err(DataError::NotFound {
                entity: "Hotel",
                id: 2
            })
        ));
    }
}
