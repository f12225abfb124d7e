//! Consistency checks run on candidate records before they are committed.
//!
//! Candidate fields arrive as a JSON object the way an editing surface hands
//! them over, so numbers and flags may still be text. Every check runs and all
//! violations are reported together.

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde_json::{Map, Value};

use crate::api::{BookDefaults, BookRecord, LoanRecord, RecordId, Role, UserRecord};

pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_violations(.violations))]
pub struct ValidationError {
    violations: Vec<String>,
}

fn join_violations(violations: &[String]) -> String {
    violations.iter().join("; ")
}

impl ValidationError {
    pub fn new(violations: Vec<String>) -> Self {
        Self { violations }
    }

    /// Human readable reasons, in the order they were found
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    pub fn mentions(&self, fragment: &str) -> bool {
        self.violations.iter().any(|v| v.contains(fragment))
    }
}

/// Turns accumulated violations into a result, accepting `record` only if there are none
pub fn accept<T>(record: Option<T>, violations: Vec<String>) -> Result<T, ValidationError> {
    match record {
        Some(record) if violations.is_empty() => Ok(record),
        _ => Err(ValidationError::new(violations)),
    }
}

/// Candidate fields must be a JSON object
pub fn as_fields(candidate: &Value) -> Result<&Fields, ValidationError> {
    candidate
        .as_object()
        .ok_or_else(|| ValidationError::new(vec!["fields must be an object".to_string()]))
}

/// Fills book fields that were left unset with the creation defaults
pub fn apply_book_defaults(fields: &mut Fields, defaults: &BookDefaults) {
    if is_unset(fields.get("title")) {
        fields.insert(
            "title".to_string(),
            Value::from(defaults.placeholder_title.clone()),
        );
    }
    if is_unset(fields.get("copies")) {
        fields.insert("copies".to_string(), Value::from(defaults.copies));
    }
    if is_unset(fields.get("available")) {
        fields.insert("available".to_string(), Value::from(defaults.available));
    }
}

pub fn apply_user_defaults(fields: &mut Fields) {
    if is_unset(fields.get("isRestricted")) {
        fields.insert("isRestricted".to_string(), Value::Bool(false));
    }
}

pub fn apply_loan_defaults(fields: &mut Fields) {
    if is_unset(fields.get("numRenewals")) {
        fields.insert("numRenewals".to_string(), Value::from(0));
    }
}

/// The id is assigned by the store, an update may repeat it but never change it
pub fn immutable_id_violation(id: RecordId, candidate: &Fields) -> Option<String> {
    match candidate.get("id") {
        None | Some(Value::Null) => None,
        Some(value) if parse_count(Some(value)).map(i64::from) == Some(i64::from(id)) => None,
        Some(_) => Some("id cannot be changed".to_string()),
    }
}

pub(crate) fn check_book(
    id: RecordId,
    fields: &Fields,
    violations: &mut Vec<String>,
) -> Option<BookRecord> {
    let title = check_title(fields.get("title"), violations);
    let author = check_optional_text("author", fields.get("author"), violations);
    let genre = check_optional_text("genre", fields.get("genre"), violations);
    let image = check_optional_text("image", fields.get("image"), violations);
    let tags = check_tags(fields.get("tags"), violations);

    let copies = parse_count(fields.get("copies"));
    if copies.is_none() {
        violations.push("copies must be a number".to_string());
    }
    let available = parse_count(fields.get("available"));
    if available.is_none() {
        violations.push("available copies must be a number".to_string());
    }
    if let (Some(copies), Some(available)) = (copies, available) {
        if available > copies {
            violations
                .push("cannot have more available copies than existing copies".to_string());
        }
    }

    Some(BookRecord {
        id,
        title: title?,
        author: author?,
        genre: genre?,
        image: image?,
        tags: tags?,
        copies: copies?,
        available: available?,
    })
}

pub(crate) fn check_user(
    id: RecordId,
    fields: &Fields,
    violations: &mut Vec<String>,
) -> Option<UserRecord> {
    let case_id = match fields.get("caseID") {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            violations.push("caseID must not be empty".to_string());
            None
        }
        Some(_) => {
            violations.push("caseID must be text".to_string());
            None
        }
    };

    let role = match fields.get("role") {
        None | Some(Value::Null) => Some(Role::None),
        Some(Value::String(text)) => match text.parse::<Role>() {
            Ok(role) => Some(role),
            Err(err) => {
                violations.push(err.to_string());
                None
            }
        },
        Some(other) => {
            violations.push(format!("role {} is not a recognized role", other));
            None
        }
    };

    let is_restricted = parse_flag(fields.get("isRestricted"));
    if is_restricted.is_none() {
        violations.push("isRestricted must be true or false".to_string());
    }

    Some(UserRecord {
        id,
        case_id: case_id?,
        role: role?,
        is_restricted: is_restricted?,
    })
}

pub(crate) fn check_loan(
    id: RecordId,
    fields: &Fields,
    violations: &mut Vec<String>,
) -> Option<LoanRecord> {
    let book_id = parse_count(fields.get("bookID")).and_then(|n| RecordId::try_from(n).ok());
    if book_id.is_none() {
        violations.push("bookID must be a number".to_string());
    }
    let case_id = match fields.get("caseID") {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
        _ => {
            violations.push("caseID must not be empty".to_string());
            None
        }
    };
    let loan_date = parse_date("loanDate", fields.get("loanDate"), violations);
    let due_date = parse_date("dueDate", fields.get("dueDate"), violations);
    if let (Some(loan_date), Some(due_date)) = (loan_date, due_date) {
        if due_date < loan_date {
            violations.push("due date cannot be before the loan date".to_string());
        }
    }
    let num_renewals = parse_count(fields.get("numRenewals"));
    if num_renewals.is_none() {
        violations.push("numRenewals must be a number".to_string());
    }

    Some(LoanRecord {
        id,
        book_id: book_id?,
        case_id: case_id?,
        loan_date: loan_date?,
        due_date: due_date?,
        num_renewals: num_renewals?,
    })
}

/// RFC 3339 timestamps, as serialized by `chrono`
fn parse_date(
    field: &str,
    value: Option<&Value>,
    violations: &mut Vec<String>,
) -> Option<DateTime<Utc>> {
    let date = value.and_then(|value| serde_json::from_value(value.clone()).ok());
    if date.is_none() {
        violations.push(format!("{} must be a date", field));
    }
    date
}

/// Missing, null and blank text all count as "not supplied"
fn is_unset(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}

/// Parses a non-negative integer given either as a JSON number or as text
fn parse_count(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|n| *n >= 0.0 && n.fract() == 0.0)
                    .map(|n| n as u64)
            })
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn parse_flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn check_title(value: Option<&Value>, violations: &mut Vec<String>) -> Option<String> {
    match value {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.clone()),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            violations.push("title must not be empty".to_string());
            None
        }
        Some(_) => {
            violations.push("title must be text".to_string());
            None
        }
    }
}

fn check_optional_text(
    field: &str,
    value: Option<&Value>,
    violations: &mut Vec<String>,
) -> Option<Option<String>> {
    match value {
        None | Some(Value::Null) => Some(None),
        Some(Value::String(text)) if text.trim().is_empty() => Some(None),
        Some(Value::String(text)) => Some(Some(text.clone())),
        Some(_) => {
            violations.push(format!("{} must be text", field));
            None
        }
    }
}

fn check_tags(value: Option<&Value>, violations: &mut Vec<String>) -> Option<Vec<String>> {
    let tags = match value {
        None | Some(Value::Null) => Some(vec![]),
        // comma separated text from a plain input box
        Some(Value::String(text)) => Some(
            text.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>(),
        Some(_) => None,
    };
    if tags.is_none() {
        violations.push("tags must be a list of text labels".to_string());
    }
    tags
}

#[cfg(test)]
mod validator_tests {
    use serde_json::json;

    use super::*;

    fn validate_book(id: RecordId, fields: &Value) -> Result<BookRecord, ValidationError> {
        let fields = as_fields(fields)?;
        let mut violations = vec![];
        let record = check_book(id, fields, &mut violations);
        accept(record, violations)
    }

    fn validate_user(id: RecordId, fields: &Value) -> Result<UserRecord, ValidationError> {
        let fields = as_fields(fields)?;
        let mut violations = vec![];
        let record = check_user(id, fields, &mut violations);
        accept(record, violations)
    }

    fn validate_loan(id: RecordId, fields: &Value) -> Result<LoanRecord, ValidationError> {
        let fields = as_fields(fields)?;
        let mut violations = vec![];
        let record = check_loan(id, fields, &mut violations);
        accept(record, violations)
    }

    #[test]
    /// Tests that a fully specified book is accepted as is
    fn test_valid_book_is_accepted() {
        let book = validate_book(
            7,
            &json!({
                "title": "Orlando",
                "author": "Virginia Woolf",
                "genre": "fiction",
                "tags": ["classic", "classic"],
                "copies": 3,
                "available": 2
            }),
        )
        .expect("Book should be valid");

        assert_eq!(
            book,
            BookRecord {
                id: 7,
                title: "Orlando".to_string(),
                author: Some("Virginia Woolf".to_string()),
                genre: Some("fiction".to_string()),
                image: None,
                tags: vec!["classic".to_string(), "classic".to_string()],
                copies: 3,
                available: 2,
            }
        );
    }

    #[test]
    /// Tests that counts supplied as text are parsed
    fn test_counts_given_as_text() {
        let book = validate_book(
            1,
            &json!({"title": "A", "copies": " 4 ", "available": "0", "tags": "blue, danube,"}),
        )
        .expect("Book should be valid");
        assert_eq!(book.copies, 4);
        assert_eq!(book.available, 0);
        assert_eq!(book.tags, vec!["blue".to_string(), "danube".to_string()]);
    }

    #[test]
    /// Tests that every violation is reported, not only the first one
    fn test_all_book_violations_reported() {
        let err = validate_book(
            1,
            &json!({"title": "", "copies": "many", "available": -1, "author": 5, "tags": [1]}),
        )
        .unwrap_err();

        assert_eq!(
            err.violations(),
            &[
                "title must not be empty".to_string(),
                "author must be text".to_string(),
                "tags must be a list of text labels".to_string(),
                "copies must be a number".to_string(),
                "available copies must be a number".to_string(),
            ]
        );
    }

    #[test]
    fn test_available_above_copies_rejected() {
        let err = validate_book(1, &json!({"title": "A", "copies": 1, "available": 5})).unwrap_err();
        assert_eq!(
            err.violations(),
            &["cannot have more available copies than existing copies".to_string()]
        );
        assert_eq!(
            err.to_string(),
            "cannot have more available copies than existing copies"
        );
    }

    #[test]
    fn test_fractional_counts_rejected() {
        let err = validate_book(1, &json!({"title": "A", "copies": 2.5, "available": 2.0}))
            .unwrap_err();
        assert_eq!(err.violations(), &["copies must be a number".to_string()]);
    }

    #[test]
    /// Tests creation defaults
    /// 1. Unset title, copies and available are filled in
    /// 2. Supplied values are kept
    fn test_book_defaults() {
        let defaults = BookDefaults::default();

        let mut fields = as_fields(&json!({"title": "  ", "author": "x"}))
            .unwrap()
            .clone();
        apply_book_defaults(&mut fields, &defaults);
        let book = validate_book(1, &Value::Object(fields)).expect("Defaults should be valid");
        assert_eq!(book.title, "Placeholder Title");
        assert_eq!(book.copies, 1);
        assert_eq!(book.available, 1);

        let mut fields = as_fields(&json!({"title": "Kept", "copies": 0, "available": 0}))
            .unwrap()
            .clone();
        apply_book_defaults(&mut fields, &defaults);
        let book = validate_book(1, &Value::Object(fields)).expect("Zero copies should be valid");
        assert_eq!(book.title, "Kept");
        assert_eq!(book.copies, 0);
    }

    #[test]
    fn test_valid_user_is_accepted() {
        let user = validate_user(
            3,
            &json!({"caseID": "zed1", "role": "Admin", "isRestricted": "TRUE"}),
        )
        .expect("User should be valid");
        assert_eq!(
            user,
            UserRecord {
                id: 3,
                case_id: "zed1".to_string(),
                role: Role::Manager,
                is_restricted: true,
            }
        );
    }

    #[test]
    fn test_user_without_role() {
        let user = validate_user(1, &json!({"caseID": "pat220", "role": null, "isRestricted": false}))
            .expect("User should be valid");
        assert_eq!(user.role, Role::None);
    }

    #[test]
    /// Tests that unknown roles fail closed and all user violations are reported
    fn test_invalid_user_rejected() {
        let err = validate_user(1, &json!({"caseID": "", "role": "superuser", "isRestricted": "maybe"}))
            .unwrap_err();
        assert_eq!(
            err.violations(),
            &[
                "caseID must not be empty".to_string(),
                "role \"superuser\" is not a recognized role".to_string(),
                "isRestricted must be true or false".to_string(),
            ]
        );
    }

    #[test]
    fn test_non_object_fields_rejected() {
        let err = validate_user(1, &json!(["caseID"])).unwrap_err();
        assert!(err.mentions("fields must be an object"));
    }

    #[test]
    fn test_immutable_id() {
        let candidate = as_fields(&json!({"id": 2})).unwrap().clone();
        assert_eq!(immutable_id_violation(2, &candidate), None);
        assert_eq!(
            immutable_id_violation(3, &candidate),
            Some("id cannot be changed".to_string())
        );
        assert_eq!(immutable_id_violation(3, &Fields::new()), None);
    }

    #[test]
    /// Tests loan checks
    /// 1. A complete loan is accepted with dates parsed
    /// 2. Missing book, bad dates and a due date before the loan date are all reported
    fn test_loan_checks() {
        let loan = validate_loan(
            4,
            &json!({
                "bookID": "2",
                "caseID": " pat220 ",
                "loanDate": "2024-03-01T10:00:00Z",
                "dueDate": "2024-03-15T10:00:00Z",
                "numRenewals": 0
            }),
        )
        .expect("Loan should be valid");
        assert_eq!((loan.id, loan.book_id, loan.case_id.as_str()), (4, 2, "pat220"));
        assert_eq!(
            loan.due_date - loan.loan_date,
            chrono::Duration::days(14)
        );

        let err = validate_loan(
            4,
            &json!({
                "caseID": "pat220",
                "loanDate": "yesterday",
                "numRenewals": 0
            }),
        )
        .unwrap_err();
        assert_eq!(
            err.violations(),
            &[
                "bookID must be a number".to_string(),
                "loanDate must be a date".to_string(),
                "dueDate must be a date".to_string(),
            ]
        );

        let err = validate_loan(
            4,
            &json!({
                "bookID": 2,
                "caseID": "pat220",
                "loanDate": "2024-03-15T10:00:00Z",
                "dueDate": "2024-03-01T10:00:00Z",
                "numRenewals": 0
            }),
        )
        .unwrap_err();
        assert!(err.mentions("due date cannot be before the loan date"));
    }
}
