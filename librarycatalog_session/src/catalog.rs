//! Entry point for the presentation shell.
//!
//! A `Catalog` lives for one session: it owns the book and user tables, the
//! loan desk, the signed-in identity and the configuration. Every operation checks the caller's
//! capabilities before it touches a table, so the role gating holds no matter
//! which views the shell chose to render.

use chrono::Utc;
use serde_json::Value;

use librarycatalog_records::api::{
    BookFilter, BookRecord, BookSearchResult, LoanRecord, Pagination, RecordId, Role, UserRecord,
};
use librarycatalog_records::loans::{LoanDesk, LoanError};
use librarycatalog_records::records_repository::{DeleteOutcome, RecordRepositoryError};
use librarycatalog_records::search;

use crate::app_config::CatalogConfig;
use crate::editing_session::{EditingSessionError, EditingState};
use crate::record_table::RecordTable;
use crate::role_policy::{self, Capabilities};
use crate::view_gate::{self, ViewId};

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Access denied: {operation} requires {required} access")]
    AccessDenied {
        operation: &'static str,
        required: Role,
    },

    #[error("No user with caseID {0}")]
    UnknownIdentity(String),

    #[error(transparent)]
    Repository(#[from] RecordRepositoryError),

    #[error(transparent)]
    Editing(#[from] EditingSessionError),

    #[error(transparent)]
    Loan(#[from] LoanError),
}

pub struct Catalog {
    config: CatalogConfig,
    identity: Option<UserRecord>,
    books: RecordTable<BookRecord>,
    users: RecordTable<UserRecord>,
    loans: LoanDesk,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(CatalogConfig::default())
    }
}

impl Catalog {
    pub fn new(config: CatalogConfig) -> Self {
        tracing::info!("Starting catalog session {}", config.app_name);
        Self {
            books: RecordTable::new("books", config.book_defaults()),
            users: RecordTable::new("users", ()),
            loans: LoanDesk::new(config.loan_period_days),
            identity: None,
            config,
        }
    }

    // Identity and gating

    pub fn identity(&self) -> Option<&UserRecord> {
        self.identity.as_ref()
    }

    /// Signs in with an identity supplied by the shell
    pub fn sign_in(&mut self, identity: UserRecord) {
        tracing::info!("{} signed in as {}", identity.case_id, identity.role);
        self.identity = Some(identity);
        self.abandon_unreachable_edits();
    }

    /// Signs in as one of the users already in the user table
    pub fn sign_in_with_case_id(&mut self, case_id: &str) -> Result<UserRecord, CatalogError> {
        let identity = self
            .users
            .repository()
            .find_by_case_id(case_id)
            .ok_or_else(|| CatalogError::UnknownIdentity(case_id.to_string()))?;
        self.sign_in(identity.clone());
        Ok(identity)
    }

    /// Returns to signed out browsing, returns the identity that was signed in
    pub fn sign_out(&mut self) -> Option<UserRecord> {
        let previous = self.identity.take();
        if let Some(previous) = &previous {
            tracing::info!("{} signed out", previous.case_id);
        }
        self.abandon_unreachable_edits();
        previous
    }

    pub fn current_capabilities(&self) -> Capabilities {
        role_policy::current_capabilities(self.identity.as_ref())
    }

    pub fn is_view_visible(&self, view: ViewId) -> bool {
        view_gate::is_view_visible(&self.current_capabilities(), view)
    }

    pub fn visible_views(&self) -> Vec<ViewId> {
        view_gate::visible_views(&self.current_capabilities())
    }

    fn caller(&self) -> &str {
        self.identity
            .as_ref()
            .map_or("signed out caller", |identity| identity.case_id.as_str())
    }

    fn require(&self, operation: &'static str, required: Role) -> Result<(), CatalogError> {
        if self.current_capabilities().allows(required) {
            return Ok(());
        }
        tracing::warn!("{} denied {}", self.caller(), operation);
        Err(CatalogError::AccessDenied {
            operation,
            required,
        })
    }

    fn abandon_unreachable_edits(&mut self) {
        let capabilities = self.current_capabilities();
        if !capabilities.has_employee_access {
            self.books.cancel();
        }
        if !capabilities.has_manager_access {
            self.users.cancel();
        }
    }

    // Books

    pub fn list_books(&self) -> Vec<BookRecord> {
        self.books.list()
    }

    pub fn search_books(&self, filter: &BookFilter, pagination: Pagination) -> BookSearchResult {
        search::search_books(
            self.books.repository().records(),
            filter,
            pagination,
            self.config.page_limits(),
        )
    }

    pub fn get_book(&self, id: RecordId) -> Result<BookRecord, CatalogError> {
        Ok(self.books.get(id)?)
    }

    pub fn create_book(&mut self, fields: &Value) -> Result<BookRecord, CatalogError> {
        self.require("create book", Role::Employee)?;
        Ok(self.books.create(fields)?)
    }

    pub fn update_book(
        &mut self,
        id: RecordId,
        fields: &Value,
    ) -> Result<BookRecord, CatalogError> {
        self.require("update book", Role::Employee)?;
        Ok(self.books.update(id, fields)?)
    }

    pub fn delete_book(
        &mut self,
        id: RecordId,
        confirmed: bool,
    ) -> Result<DeleteOutcome, CatalogError> {
        self.require("delete book", Role::Employee)?;
        Ok(self.books.delete(id, confirmed))
    }

    pub fn book_editing_state(&self) -> EditingState {
        self.books.editing_state()
    }

    pub fn begin_book_edit(&mut self, row_id: RecordId) -> Result<BookRecord, CatalogError> {
        self.require("edit book", Role::Employee)?;
        Ok(self.books.begin_edit(row_id)?)
    }

    pub fn begin_book_create(&mut self) -> Result<(), CatalogError> {
        self.require("add book", Role::Employee)?;
        Ok(self.books.begin_create()?)
    }

    pub fn commit_book(&mut self, fields: &Value) -> Result<BookRecord, CatalogError> {
        self.require("save book", Role::Employee)?;
        Ok(self.books.commit(fields)?)
    }

    pub fn cancel_book_edit(&mut self) -> EditingState {
        self.books.cancel()
    }

    // Users

    pub fn list_users(&self) -> Result<Vec<UserRecord>, CatalogError> {
        self.require("list users", Role::Manager)?;
        Ok(self.users.list())
    }

    pub fn get_user(&self, id: RecordId) -> Result<UserRecord, CatalogError> {
        self.require("view user", Role::Manager)?;
        Ok(self.users.get(id)?)
    }

    pub fn create_user(&mut self, fields: &Value) -> Result<UserRecord, CatalogError> {
        self.require("create user", Role::Manager)?;
        Ok(self.users.create(fields)?)
    }

    pub fn update_user(
        &mut self,
        id: RecordId,
        fields: &Value,
    ) -> Result<UserRecord, CatalogError> {
        self.require("update user", Role::Manager)?;
        Ok(self.users.update(id, fields)?)
    }

    pub fn delete_user(
        &mut self,
        id: RecordId,
        confirmed: bool,
    ) -> Result<DeleteOutcome, CatalogError> {
        self.require("delete user", Role::Manager)?;
        Ok(self.users.delete(id, confirmed))
    }

    pub fn user_editing_state(&self) -> EditingState {
        self.users.editing_state()
    }

    pub fn begin_user_edit(&mut self, row_id: RecordId) -> Result<UserRecord, CatalogError> {
        self.require("edit user", Role::Manager)?;
        Ok(self.users.begin_edit(row_id)?)
    }

    pub fn begin_user_create(&mut self) -> Result<(), CatalogError> {
        self.require("add user", Role::Manager)?;
        Ok(self.users.begin_create()?)
    }

    pub fn commit_user(&mut self, fields: &Value) -> Result<UserRecord, CatalogError> {
        self.require("save user", Role::Manager)?;
        Ok(self.users.commit(fields)?)
    }

    pub fn cancel_user_edit(&mut self) -> EditingState {
        self.users.cancel()
    }

    // Loans

    pub fn list_loans(&self) -> Result<Vec<LoanRecord>, CatalogError> {
        self.require("list loans", Role::Employee)?;
        Ok(self.loans.list())
    }

    pub fn get_loan(&self, loan_id: RecordId) -> Result<LoanRecord, CatalogError> {
        self.require("view loan", Role::Employee)?;
        Ok(self.loans.get(loan_id)?)
    }

    /// Loans held by the signed-in user, empty when signed out
    pub fn my_loans(&self) -> Vec<LoanRecord> {
        self.identity
            .as_ref()
            .map(|identity| self.loans.loans_for(&identity.case_id))
            .unwrap_or_default()
    }

    pub fn checkout_book(
        &mut self,
        book_id: RecordId,
        case_id: &str,
    ) -> Result<LoanRecord, CatalogError> {
        self.require("check out book", Role::Employee)?;
        Ok(self.loans.checkout(
            self.books.repository_mut(),
            self.users.repository(),
            book_id,
            case_id,
            Utc::now(),
        )?)
    }

    pub fn return_loan(&mut self, loan_id: RecordId) -> Result<LoanRecord, CatalogError> {
        self.require("return loan", Role::Employee)?;
        Ok(self
            .loans
            .return_loan(self.books.repository_mut(), loan_id)?)
    }

    pub fn renew_loan(&mut self, loan_id: RecordId) -> Result<LoanRecord, CatalogError> {
        self.require("renew loan", Role::Employee)?;
        Ok(self.loans.renew(loan_id)?)
    }
}
