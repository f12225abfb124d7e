use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type RecordId = i32;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
/// A single title held by the library, with its physical copy counts
pub struct BookRecord {
    pub id: RecordId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Total physical copies
    pub copies: u32,
    /// Copies currently available to loan, never more than `copies`
    pub available: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
/// A patron or staff account, `case_id` is the login identity
pub struct UserRecord {
    pub id: RecordId,
    #[serde(rename = "caseID")]
    pub case_id: String,
    #[serde(default, skip_serializing_if = "Role::is_none")]
    pub role: Role,
    /// Outstanding holds or overdues, informational only
    #[serde(rename = "isRestricted")]
    pub is_restricted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
/// One copy of a book checked out to a user
pub struct LoanRecord {
    pub id: RecordId,
    #[serde(rename = "bookID")]
    pub book_id: RecordId,
    #[serde(rename = "caseID")]
    pub case_id: String,
    #[serde(rename = "loanDate")]
    pub loan_date: DateTime<Utc>,
    #[serde(rename = "dueDate")]
    pub due_date: DateTime<Utc>,
    #[serde(rename = "numRenewals")]
    pub num_renewals: u32,
}

/// Closed set of roles, ordered by the access they grant
#[derive(
    Debug, Default, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    None,
    Patron,
    Employee,
    #[serde(alias = "admin")]
    Manager,
}

impl Role {
    pub fn is_none(&self) -> bool {
        *self == Role::None
    }

    /// True if this role holds at least the access of `required`
    pub fn grants(self, required: Role) -> bool {
        self >= required
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::None => "none",
            Role::Patron => "patron",
            Role::Employee => "employee",
            Role::Manager => "manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("role \"{0}\" is not a recognized role")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Role::None),
            "patron" => Ok(Role::Patron),
            "employee" => Ok(Role::Employee),
            "manager" | "admin" => Ok(Role::Manager),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Values filled in for book fields left unset on creation
pub struct BookDefaults {
    pub placeholder_title: String,
    pub copies: u32,
    pub available: u32,
}

impl Default for BookDefaults {
    fn default() -> Self {
        Self {
            placeholder_title: "Placeholder Title".to_string(),
            copies: 1,
            available: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
/// Public catalog filter, every set field must match
pub struct BookFilter {
    /// Case insensitive substring of the title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Case insensitive substring of the author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Case insensitive substring of the genre
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Exact tag label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct Pagination {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct BookSearchResult {
    pub books: Vec<BookRecord>,
    /// Number of books matching the filter, regardless of the page
    pub total: usize,
}
