use serde_json::Value;

use librarycatalog_records::api::RecordId;
use librarycatalog_records::record::Record;
use librarycatalog_records::records_repository::{
    DeleteOutcome, InMemoryRecordRepository, RecordRepository, RecordRepositoryError,
};

use crate::editing_session::{EditingSession, EditingSessionError, EditingState};

/// One editable table: the records it shows and the edit in progress on it
pub struct RecordTable<R: Record> {
    repository: InMemoryRecordRepository<R>,
    editing: EditingSession,
}

impl<R: Record> RecordTable<R> {
    pub fn new(name: &'static str, defaults: R::Defaults) -> Self {
        Self {
            repository: InMemoryRecordRepository::new(defaults),
            editing: EditingSession::new(name),
        }
    }

    pub fn repository(&self) -> &InMemoryRecordRepository<R> {
        &self.repository
    }

    /// Direct store access for changes made outside the table's editing flow
    pub fn repository_mut(&mut self) -> &mut InMemoryRecordRepository<R> {
        &mut self.repository
    }

    pub fn list(&self) -> Vec<R> {
        self.repository.list()
    }

    pub fn get(&self, id: RecordId) -> Result<R, RecordRepositoryError> {
        self.repository.get(id)
    }

    pub fn create(&mut self, fields: &Value) -> Result<R, RecordRepositoryError> {
        self.repository.create(fields)
    }

    pub fn update(&mut self, id: RecordId, fields: &Value) -> Result<R, RecordRepositoryError> {
        self.repository.update(id, fields)
    }

    /// Deletes the row and abandons an edit of it
    pub fn delete(&mut self, id: RecordId, confirmed: bool) -> DeleteOutcome {
        let outcome = self.repository.delete(id, confirmed);
        if outcome != DeleteOutcome::NotConfirmed {
            self.editing.row_deleted(id);
        }
        outcome
    }

    pub fn editing_state(&self) -> EditingState {
        self.editing.state()
    }

    pub fn begin_edit(&mut self, row_id: RecordId) -> Result<R, EditingSessionError> {
        self.editing.begin_edit(&self.repository, row_id)
    }

    pub fn begin_create(&mut self) -> Result<(), EditingSessionError> {
        self.editing.begin_create()
    }

    pub fn commit(&mut self, fields: &Value) -> Result<R, EditingSessionError> {
        self.editing.commit(&mut self.repository, fields)
    }

    pub fn cancel(&mut self) -> EditingState {
        self.editing.cancel()
    }
}

#[cfg(test)]
mod record_table_tests {
    use serde_json::json;

    use librarycatalog_records::api::{BookDefaults, BookRecord};

    use super::*;

    #[test]
    /// Tests that deleting the row under edit ends the edit
    /// 1. Unconfirmed delete keeps both the row and the edit
    /// 2. Confirmed delete removes the row and the table goes idle
    fn test_delete_of_edited_row() {
        let mut table = RecordTable::<BookRecord>::new("books", BookDefaults::default());
        table
            .create(&json!({"title": "A"}))
            .expect("Failed to create book");
        table.begin_edit(1).expect("Failed to begin edit");

        assert_eq!(table.delete(1, false), DeleteOutcome::NotConfirmed);
        assert_eq!(table.editing_state(), EditingState::Editing(1));

        assert_eq!(table.delete(1, true), DeleteOutcome::Deleted);
        assert_eq!(table.editing_state(), EditingState::Idle);
        assert!(table.list().is_empty());
    }

    #[test]
    fn test_defaults_come_from_table() {
        let mut table = RecordTable::<BookRecord>::new(
            "books",
            BookDefaults {
                placeholder_title: "Untitled".to_string(),
                copies: 2,
                available: 0,
            },
        );
        table.begin_create().expect("Failed to begin create");
        let created = table.commit(&json!({})).expect("Failed to commit");
        assert_eq!(created.title, "Untitled");
        assert_eq!((created.copies, created.available), (2, 0));
    }
}
