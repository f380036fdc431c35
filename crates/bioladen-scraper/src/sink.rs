use std::sync::Mutex;

use async_trait::async_trait;
use bioladen_core::StoreRecord;

use crate::error::SinkError;

/// Append-only destination for kept records, one push per record.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn push(&self, record: &StoreRecord) -> Result<(), SinkError>;
}

/// Collects records in memory, in push order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<StoreRecord>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything pushed so far.
    #[must_use]
    pub fn records(&self) -> Vec<StoreRecord> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn push(&self, record: &StoreRecord) -> Result<(), SinkError> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}
