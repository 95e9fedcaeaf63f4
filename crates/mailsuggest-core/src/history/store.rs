//! Recipient history store accessor.

use std::future::Future;

use tokio::sync::Mutex;

use super::model::RecipientRecord;
use crate::Result;

/// Loads and persists the recipient history.
///
/// Implementations are responsible for serializing concurrent access to the
/// backing storage. Callers treat the returned list as an immutable snapshot.
pub trait RecipientStore: Send + Sync {
    /// Load the full recipient history in stored order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read or is malformed.
    fn load(&self) -> impl Future<Output = Result<Vec<RecipientRecord>>> + Send;

    /// Replace the stored recipient history.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, records: &[RecipientRecord]) -> impl Future<Output = Result<()>> + Send;
}

/// Store that keeps the history in memory.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: Mutex<Vec<RecipientRecord>>,
}

impl MemoryHistoryStore {
    /// Creates a store seeded with the given records.
    #[must_use]
    pub fn new(records: Vec<RecipientRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Take the current records out of the store.
    #[must_use]
    pub fn into_records(self) -> Vec<RecipientRecord> {
        self.records.into_inner()
    }
}

impl RecipientStore for MemoryHistoryStore {
    async fn load(&self) -> Result<Vec<RecipientRecord>> {
        Ok(self.records.lock().await.clone())
    }

    async fn save(&self, records: &[RecipientRecord]) -> Result<()> {
        *self.records.lock().await = records.to_vec();
        Ok(())
    }
}
