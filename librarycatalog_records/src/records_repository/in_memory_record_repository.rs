use serde_json::Value;

use crate::api::{RecordId, UserRecord};
use crate::record::Record;
use crate::records_repository::{DeleteOutcome, RecordRepository, RecordRepositoryError};
use crate::validator::{self, Fields, ValidationError};

pub struct InMemoryRecordRepository<R: Record> {
    records: Vec<R>,
    defaults: R::Defaults,
}

impl<R: Record> Default for InMemoryRecordRepository<R> {
    fn default() -> Self {
        Self::new(R::Defaults::default())
    }
}

impl<R: Record> InMemoryRecordRepository<R> {
    pub fn new(defaults: R::Defaults) -> Self {
        Self {
            records: vec![],
            defaults,
        }
    }

    /// Read-only view of the records in collection order
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    fn next_id(&self) -> RecordId {
        self.records
            .iter()
            .map(|record| record.id())
            .max()
            .map_or(1, |max_id| max_id + 1)
    }

    fn not_found(id: RecordId) -> RecordRepositoryError {
        RecordRepositoryError::NotFound { kind: R::KIND, id }
    }

    /// Runs record and collection checks, `violations` may already hold earlier findings
    fn validated(
        &self,
        id: RecordId,
        fields: &Fields,
        mut violations: Vec<String>,
    ) -> Result<R, ValidationError> {
        let record = R::check(id, fields, &mut violations);
        R::check_collection(
            fields,
            self.records.iter().filter(|other| other.id() != id),
            &mut violations,
        );
        validator::accept(record, violations)
    }
}

impl InMemoryRecordRepository<UserRecord> {
    pub fn find_by_case_id(&self, case_id: &str) -> Option<UserRecord> {
        self.records
            .iter()
            .find(|user| user.case_id == case_id.trim())
            .cloned()
    }
}

impl<R: Record> RecordRepository<R> for InMemoryRecordRepository<R> {
    fn create(&mut self, candidate: &Value) -> Result<R, RecordRepositoryError> {
        let mut fields = validator::as_fields(candidate)?.clone();
        fields.remove("id");
        R::apply_defaults(&mut fields, &self.defaults);

        let id = self.next_id();
        let record = self.validated(id, &fields, vec![]).map_err(|err| {
            tracing::info!("Rejected new {}: {}", R::KIND, err);
            err
        })?;

        self.records.push(record.clone());
        tracing::info!("{} {} created", R::KIND, id);
        Ok(record)
    }

    fn update(&mut self, id: RecordId, candidate: &Value) -> Result<R, RecordRepositoryError> {
        let candidate = validator::as_fields(candidate)?;
        let position = self.position(id).ok_or_else(|| Self::not_found(id))?;

        let violations: Vec<String> = validator::immutable_id_violation(id, candidate)
            .into_iter()
            .collect();

        let mut patch = candidate.clone();
        patch.remove("id");
        let mut merged = serde_json::to_value(&self.records[position])?;
        json_patch::merge(&mut merged, &Value::Object(patch));

        let record = self
            .validated(id, validator::as_fields(&merged)?, violations)
            .map_err(|err| {
                tracing::info!("Rejected update of {} {}: {}", R::KIND, id, err);
                err
            })?;

        self.records[position] = record.clone();
        tracing::info!("{} {} updated", R::KIND, id);
        Ok(record)
    }

    fn delete(&mut self, id: RecordId, confirmed: bool) -> DeleteOutcome {
        if !confirmed {
            tracing::debug!("Delete of {} {} not confirmed", R::KIND, id);
            return DeleteOutcome::NotConfirmed;
        }
        match self.position(id) {
            Some(position) => {
                self.records.remove(position);
                tracing::info!("{} {} deleted", R::KIND, id);
                DeleteOutcome::Deleted
            }
            None => {
                tracing::debug!("{} {} already absent, nothing to delete", R::KIND, id);
                DeleteOutcome::NotFound
            }
        }
    }

    fn get(&self, id: RecordId) -> Result<R, RecordRepositoryError> {
        self.position(id)
            .map(|position| self.records[position].clone())
            .ok_or_else(|| Self::not_found(id))
    }

    fn list(&self) -> Vec<R> {
        self.records.clone()
    }
}
