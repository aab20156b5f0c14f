use validator::Validate;

use crate::conflicts::{ensure_exists, ensure_insertable};
use crate::error::DataError;
use crate::identifiers::assign_identifier;
use crate::manage::{DataContext, WriteMode};
use crate::storage::schema::visitors;
use crate::storage::{Predicate, Table};
use crate::visitors::{Visitor, VisitorInput};

/// Service layer for visitor management
#[derive(Clone)]
pub struct VisitorService {
    context: DataContext,
}

impl VisitorService {
    pub fn new(context: DataContext) -> Self {
        Self { context }
    }

    pub async fn create_visitor(&self, input: VisitorInput) -> Result<Visitor, DataError> {
        self.manage_visitor(input, WriteMode::Insert).await
    }

    pub async fn update_visitor(&self, input: VisitorInput) -> Result<Visitor, DataError> {
        self.manage_visitor(input, WriteMode::Update).await
    }

    /// Insert or update a visitor, keyed on first and last name for duplicates
    pub async fn manage_visitor(
        &self,
        input: VisitorInput,
        mode: WriteMode,
    ) -> Result<Visitor, DataError> {
        input.validate()?;

        let storage = self.context.storage();
        let _gate = self.context.serialize_writes().await;

        match mode {
            WriteMode::Insert => {
                tracing::debug!("Creating visitor: {} {}", input.firstname, input.lastname);
                ensure_insertable(storage, Table::Visitors, input.visitor_id, input.natural_key())
                    .await?;

                let visitor_id =
                    assign_identifier(storage, Table::Visitors, input.visitor_id).await?;
                let visitor = Visitor {
                    visitor_id,
                    firstname: input.firstname,
                    lastname: input.lastname,
                };
                storage.insert_row(Table::Visitors, &visitor.to_fields()).await?;

                tracing::info!("Successfully created visitor with id: {}", visitor_id);
                Ok(visitor)
            }
            WriteMode::Update => {
                let visitor_id = input
                    .visitor_id
                    .ok_or_else(|| DataError::invalid("visitorId is required for update"))?;

                ensure_exists(storage, Table::Visitors, visitor_id).await?;
                storage
                    .update_row(Table::Visitors, visitor_id, &input.update_fields())
                    .await?;

                let visitor = self.get_visitor(visitor_id).await?.ok_or(DataError::NotFound {
                    entity: Table::Visitors.entity(),
                    id: visitor_id,
                })?;
                tracing::info!("Successfully updated visitor with id: {}", visitor_id);
                Ok(visitor)
            }
        }
    }

    /// Delete a visitor together with their bookings
    pub async fn delete_visitor(&self, visitor_id: i64) -> Result<bool, DataError> {
        let _gate = self.context.serialize_writes().await;
        let deleted = self
            .context
            .storage()
            .delete_row(Table::Visitors, visitor_id)
            .await?;
        if deleted {
            tracing::info!("Successfully deleted visitor with id: {}", visitor_id);
        }
        Ok(deleted)
    }

    pub async fn get_visitor(&self, visitor_id: i64) -> Result<Option<Visitor>, DataError> {
        let record = self
            .context
            .storage()
            .fetch_one(Table::Visitors, visitor_id)
            .await?;
        Ok(record.as_ref().map(Visitor::from_record).transpose()?)
    }

    /// Visitors whose first or last name contains (or equals) `name`, newest first
    pub async fn get_visitors(
        &self,
        name: &str,
        exact_match: bool,
    ) -> Result<Vec<Visitor>, DataError> {
        let name = name.trim();
        let predicate = if name.is_empty() {
            Predicate::All
        } else if exact_match {
            Predicate::any_of(vec![
                Predicate::eq(visitors::FIRSTNAME, name),
                Predicate::eq(visitors::LASTNAME, name),
            ])
        } else {
            Predicate::any_of(vec![
                Predicate::Contains(visitors::FIRSTNAME, name.to_string()),
                Predicate::Contains(visitors::LASTNAME, name.to_string()),
            ])
        };

        let records = self
            .context
            .storage()
            .fetch_matching(Table::Visitors, &predicate)
            .await?;

        Ok(records
            .iter()
            .map(Visitor::from_record)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn service() -> VisitorService {
        VisitorService::new(DataContext::new(Arc::new(MemoryStorage::new())))
    }

    #[tokio::test]
    async fn test_create_visitor() {
        let service = service();
        let visitor = service
            .create_visitor(VisitorInput::new("A", "B"))
            .await
            .unwrap();
        assert_eq!(visitor.visitor_id, 1);
        assert_eq!(service.get_visitor(1).await.unwrap(), Some(visitor));
    }

    #[tokio::test]
    async fn test_same_name_conflicts() {
        let service = service();
        service.create_visitor(VisitorInput::new("A", "B")).await.unwrap();

        let result = service.create_visitor(VisitorInput::new("A", "B").with_id(5)).await;
        assert!(matches!(
            result,
            Err(DataError::AlreadyExists { entity: "Visitor" })
        ));

        // Sharing one name is fine
        assert!(service.create_visitor(VisitorInput::new("A", "C")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_visitor() {
        let service = service();
        service.create_visitor(VisitorInput::new("A", "B")).await.unwrap();

        let updated = service
            .update_visitor(VisitorInput::new("Alice", "Brown").with_id(1))
            .await
            .unwrap();
        assert_eq!(updated.firstname, "Alice");

        let missing = service
            .update_visitor(VisitorInput::new("X", "Y").with_id(8))
            .await;
        assert!(matches!(missing, Err(DataError::NotFound { id: 8, .. })));

        let no_id = service.update_visitor(VisitorInput::new("X", "Y")).await;
        assert!(matches!(no_id, Err(DataError::InvalidArgument { .. })));
    }

    #[tokio::test]
    async fn test_search_by_either_name() {
        let service = service();
        for (first, last) in [("Alice", "Smith"), ("Bob", "Jones"), ("Smithy", "Allen")] {
            service
                .create_visitor(VisitorInput::new(first, last))
                .await
                .unwrap();
        }

        let fuzzy = service.get_visitors("Smith", false).await.unwrap();
        let ids: Vec<i64> = fuzzy.iter().map(|v| v.visitor_id).collect();
        assert_eq!(ids, vec![3, 1]);

        let exact = service.get_visitors("Smith", true).await.unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].firstname, "Alice");
    }

    #[tokio::test]
    async fn test_delete_visitor() {
        let service = service();
        service.create_visitor(VisitorInput::new("A", "B")).await.unwrap();
        assert!(service.delete_visitor(1).await.unwrap());
        assert!(!service.delete_visitor(1).await.unwrap());
    }
}
