pub use in_memory_record_repository::InMemoryRecordRepository;

use serde_json::Value;

use crate::api::RecordId;
use crate::record::Record;
use crate::validator::ValidationError;

mod in_memory_record_repository;

#[derive(thiserror::Error, Debug)]
pub enum RecordRepositoryError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: RecordId },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to serialize record: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Nothing matched the id, possibly removed already
    NotFound,
    /// The caller did not confirm, nothing was removed
    NotConfirmed,
}

pub trait RecordRepository<R: Record> {
    /// Merges candidate fields with the defaults, assigns the next id and appends the record.
    /// Returns the created record
    fn create(&mut self, candidate: &Value) -> Result<R, RecordRepositoryError>;
    /// Overwrites the record with every field present in the candidate, keeping its position.
    /// Returns the updated record
    fn update(&mut self, id: RecordId, candidate: &Value) -> Result<R, RecordRepositoryError>;
    /// Removes the record if the caller confirmed the deletion
    fn delete(&mut self, id: RecordId, confirmed: bool) -> DeleteOutcome;
    /// Retrieves a copy of the record
    fn get(&self, id: RecordId) -> Result<R, RecordRepositoryError>;
    /// Lists all records in collection order
    fn list(&self) -> Vec<R>;
}
