// Shared plumbing for the insert/update manage operations

use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use utoipa::ToSchema;

use crate::storage::Storage;

/// Whether a manage call creates a row or modifies an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    Insert,
    Update,
}

/// Storage port plus the in-process write gate
///
/// Manage operations take the gate for their whole check, allocate and write
/// sequence, so two requests in this process can never be handed the same
/// identifier. Reads do not take it.
#[derive(Clone)]
pub struct DataContext {
    storage: Arc<dyn Storage>,
    write_gate: Arc<Mutex<()>>,
}

impl DataContext {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Holds the write gate until the guard is dropped
    pub async fn serialize_writes(&self) -> MutexGuard<'_, ()> {
        self.write_gate.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::time::Duration;

    #[tokio::test]
    async fn test_write_gate_is_exclusive() {
        let context = DataContext::new(Arc::new(MemoryStorage::new()));
        let clone = context.clone();

        let guard = context.serialize_writes().await;
        let waiting = tokio::time::timeout(Duration::from_millis(50), clone.serialize_writes()).await;
        assert!(waiting.is_err());

        drop(guard);
        let acquired = tokio::time::timeout(Duration::from_millis(50), clone.serialize_writes()).await;
        assert!(acquired.is_ok());
    }

    #[test]
    fn test_write_mode_from_json() {
        let mode: WriteMode = serde_json::from_str("\"update\"").unwrap();
        assert_eq!(mode, WriteMode::Update);
    }
}
