use serde::Serialize;

use crate::api::{BookDefaults, BookRecord, LoanRecord, RecordId, UserRecord};
use crate::validator::{self, Fields};

/// A kind of record that can be held by a record repository
pub trait Record: Clone + Serialize {
    /// Name of the record kind, used in logs and errors
    const KIND: &'static str;

    /// Values used for fields left unset on creation
    type Defaults: Clone + Default;

    fn id(&self) -> RecordId;

    fn apply_defaults(fields: &mut Fields, defaults: &Self::Defaults);

    /// Builds the record from a complete set of fields, pushing every violation found
    fn check(id: RecordId, fields: &Fields, violations: &mut Vec<String>) -> Option<Self>;

    /// Rules spanning the whole collection, `others` never contains the record being checked
    fn check_collection<'a>(
        _fields: &Fields,
        _others: impl Iterator<Item = &'a Self>,
        _violations: &mut Vec<String>,
    ) where
        Self: 'a,
    {
    }
}

impl Record for BookRecord {
    const KIND: &'static str = "Book";

    type Defaults = BookDefaults;

    fn id(&self) -> RecordId {
        self.id
    }

    fn apply_defaults(fields: &mut Fields, defaults: &BookDefaults) {
        validator::apply_book_defaults(fields, defaults)
    }

    fn check(id: RecordId, fields: &Fields, violations: &mut Vec<String>) -> Option<Self> {
        validator::check_book(id, fields, violations)
    }
}

impl Record for UserRecord {
    const KIND: &'static str = "User";

    type Defaults = ();

    fn id(&self) -> RecordId {
        self.id
    }

    fn apply_defaults(fields: &mut Fields, _defaults: &()) {
        validator::apply_user_defaults(fields)
    }

    fn check(id: RecordId, fields: &Fields, violations: &mut Vec<String>) -> Option<Self> {
        validator::check_user(id, fields, violations)
    }

    fn check_collection<'a>(
        fields: &Fields,
        mut others: impl Iterator<Item = &'a Self>,
        violations: &mut Vec<String>,
    ) where
        Self: 'a,
    {
        let Some(case_id) = fields.get("caseID").and_then(|v| v.as_str()) else {
            return;
        };
        let case_id = case_id.trim();
        if !case_id.is_empty() && others.any(|user| user.case_id == case_id) {
            violations.push("caseID already in use".to_string());
        }
    }
}

impl Record for LoanRecord {
    const KIND: &'static str = "Loan";

    type Defaults = ();

    fn id(&self) -> RecordId {
        self.id
    }

    fn apply_defaults(fields: &mut Fields, _defaults: &()) {
        validator::apply_loan_defaults(fields)
    }

    fn check(id: RecordId, fields: &Fields, violations: &mut Vec<String>) -> Option<Self> {
        validator::check_loan(id, fields, violations)
    }
}
