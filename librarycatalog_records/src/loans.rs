//! Checking copies out to users and taking them back.
//!
//! Loans are records of their own, held in a record repository. Every loan
//! out takes one copy off the book's `available` count and a return puts it back.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use crate::api::{BookRecord, LoanRecord, RecordId, UserRecord};
use crate::records_repository::{
    InMemoryRecordRepository, RecordRepository, RecordRepositoryError,
};

#[derive(thiserror::Error, Debug)]
pub enum LoanError {
    #[error("No user with caseID {0}")]
    UnknownBorrower(String),

    #[error("User {0} is restricted from borrowing")]
    BorrowerRestricted(String),

    #[error("Book {0} has no copies available")]
    NoCopiesAvailable(RecordId),

    #[error(transparent)]
    Repository(#[from] RecordRepositoryError),
}

pub struct LoanDesk {
    loans: InMemoryRecordRepository<LoanRecord>,
    loan_period: Duration,
}

impl Default for LoanDesk {
    fn default() -> Self {
        Self::new(14)
    }
}

impl LoanDesk {
    /// `loan_period_days` is both the initial loan length and the extension granted per renewal
    pub fn new(loan_period_days: u32) -> Self {
        Self {
            loans: InMemoryRecordRepository::default(),
            loan_period: Duration::days(i64::from(loan_period_days)),
        }
    }

    pub fn list(&self) -> Vec<LoanRecord> {
        self.loans.list()
    }

    pub fn get(&self, loan_id: RecordId) -> Result<LoanRecord, LoanError> {
        Ok(self.loans.get(loan_id)?)
    }

    pub fn loans_for(&self, case_id: &str) -> Vec<LoanRecord> {
        self.loans
            .records()
            .iter()
            .filter(|loan| loan.case_id == case_id.trim())
            .cloned()
            .collect()
    }

    /// Lends one available copy of the book to the user, due one loan period from `now`
    pub fn checkout(
        &mut self,
        books: &mut impl RecordRepository<BookRecord>,
        users: &InMemoryRecordRepository<UserRecord>,
        book_id: RecordId,
        case_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LoanRecord, LoanError> {
        let borrower = users
            .find_by_case_id(case_id)
            .ok_or_else(|| LoanError::UnknownBorrower(case_id.trim().to_string()))?;
        if borrower.is_restricted {
            tracing::info!("Refused loan of book {} to restricted {}", book_id, borrower.case_id);
            return Err(LoanError::BorrowerRestricted(borrower.case_id));
        }
        let book = books.get(book_id)?;
        if book.available == 0 {
            tracing::info!("Refused loan of book {}, no copies available", book_id);
            return Err(LoanError::NoCopiesAvailable(book_id));
        }

        let loan = self.loans.create(&json!({
            "bookID": book_id,
            "caseID": borrower.case_id,
            "loanDate": now.to_rfc3339(),
            "dueDate": (now + self.loan_period).to_rfc3339(),
        }))?;
        if let Err(err) = books.update(book_id, &json!({"available": book.available - 1})) {
            self.loans.delete(loan.id, true);
            return Err(err.into());
        }
        tracing::info!(
            "Book {} lent to {} until {}",
            book_id,
            loan.case_id,
            loan.due_date
        );
        Ok(loan)
    }

    /// Closes the loan and puts the copy back, `available` never rises above `copies`
    pub fn return_loan(
        &mut self,
        books: &mut impl RecordRepository<BookRecord>,
        loan_id: RecordId,
    ) -> Result<LoanRecord, LoanError> {
        let loan = self.loans.get(loan_id)?;
        match books.get(loan.book_id) {
            Ok(book) if book.available < book.copies => {
                books.update(book.id, &json!({"available": book.available + 1}))?;
            }
            Ok(book) => {
                tracing::warn!(
                    "Book {} already has all {} copies available",
                    book.id,
                    book.copies
                );
            }
            Err(RecordRepositoryError::NotFound { .. }) => {
                tracing::warn!("Book {} of loan {} left the catalog", loan.book_id, loan_id);
            }
            Err(err) => return Err(err.into()),
        }
        self.loans.delete(loan_id, true);
        tracing::info!("Loan {} of book {} returned", loan_id, loan.book_id);
        Ok(loan)
    }

    /// Pushes the due date out by one loan period
    pub fn renew(&mut self, loan_id: RecordId) -> Result<LoanRecord, LoanError> {
        let loan = self.loans.get(loan_id)?;
        let renewed = self.loans.update(
            loan_id,
            &json!({
                "dueDate": (loan.due_date + self.loan_period).to_rfc3339(),
                "numRenewals": loan.num_renewals + 1,
            }),
        )?;
        tracing::info!(
            "Loan {} renewed until {}, renewal {}",
            loan_id,
            renewed.due_date,
            renewed.num_renewals
        );
        Ok(renewed)
    }
}
