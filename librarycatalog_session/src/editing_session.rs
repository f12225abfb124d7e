//! Single editor discipline for one table.
//!
//! A table is either idle, editing exactly one row, or creating one new row.
//! Starting another edit or create while one is active is rejected until the
//! active one is committed or cancelled. The controller never holds on to the
//! repository, it borrows it for the duration of a single call.

use std::fmt;

use serde_json::Value;

use librarycatalog_records::api::RecordId;
use librarycatalog_records::record::Record;
use librarycatalog_records::records_repository::{RecordRepository, RecordRepositoryError};

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum EditingState {
    #[default]
    Idle,
    Editing(RecordId),
    Creating,
}

impl fmt::Display for EditingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditingState::Idle => write!(f, "idle"),
            EditingState::Editing(row_id) => write!(f, "editing row {}", row_id),
            EditingState::Creating => write!(f, "creating a new row"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum EditingSessionError {
    #[error("Table {table} is already {active}, cancel it first")]
    ConcurrentEditConflict {
        table: &'static str,
        active: EditingState,
    },

    #[error("Table {0} has no edit or create in progress")]
    NothingInProgress(&'static str),

    #[error(transparent)]
    Repository(#[from] RecordRepositoryError),
}

pub struct EditingSession {
    table: &'static str,
    state: EditingState,
}

impl EditingSession {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            state: EditingState::Idle,
        }
    }

    pub fn state(&self) -> EditingState {
        self.state
    }

    fn ensure_idle(&self) -> Result<(), EditingSessionError> {
        match self.state {
            EditingState::Idle => Ok(()),
            active => {
                tracing::info!("Rejected new edit on {}, already {}", self.table, active);
                Err(EditingSessionError::ConcurrentEditConflict {
                    table: self.table,
                    active,
                })
            }
        }
    }

    /// Starts editing `row_id`, returns the current values of the row
    pub fn begin_edit<R: Record>(
        &mut self,
        repository: &impl RecordRepository<R>,
        row_id: RecordId,
    ) -> Result<R, EditingSessionError> {
        self.ensure_idle()?;
        let record = repository.get(row_id)?;
        self.state = EditingState::Editing(row_id);
        tracing::debug!("{}: editing row {}", self.table, row_id);
        Ok(record)
    }

    pub fn begin_create(&mut self) -> Result<(), EditingSessionError> {
        self.ensure_idle()?;
        self.state = EditingState::Creating;
        tracing::debug!("{}: creating a new row", self.table);
        Ok(())
    }

    /// Applies the candidate fields to the row being edited or created.
    ///
    /// On a validation failure the session stays active so the caller can
    /// correct the input. If the edited row vanished the session returns to idle.
    pub fn commit<R: Record>(
        &mut self,
        repository: &mut impl RecordRepository<R>,
        fields: &Value,
    ) -> Result<R, EditingSessionError> {
        let result = match self.state {
            EditingState::Idle => return Err(EditingSessionError::NothingInProgress(self.table)),
            EditingState::Editing(row_id) => repository.update(row_id, fields),
            EditingState::Creating => repository.create(fields),
        };

        match result {
            Ok(record) => {
                tracing::debug!("{}: committed row {}", self.table, record.id());
                self.state = EditingState::Idle;
                Ok(record)
            }
            Err(err @ RecordRepositoryError::NotFound { .. }) => {
                tracing::warn!("{}: {}, abandoning edit", self.table, err);
                self.state = EditingState::Idle;
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Leaves the session without touching the repository, returns the abandoned state
    pub fn cancel(&mut self) -> EditingState {
        let previous = std::mem::take(&mut self.state);
        if previous != EditingState::Idle {
            tracing::debug!("{}: cancelled {}", self.table, previous);
        }
        previous
    }

    /// A deleted row can no longer be edited, the delete wins over the edit
    pub fn row_deleted(&mut self, row_id: RecordId) {
        if self.state == EditingState::Editing(row_id) {
            tracing::info!(
                "{}: row {} deleted while being edited, abandoning edit",
                self.table,
                row_id
            );
            self.state = EditingState::Idle;
        }
    }
}
