pub mod api;
pub mod loans;
pub mod record;
pub mod records_repository;
pub mod search;
pub mod validator;
