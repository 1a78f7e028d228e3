//! Entity store: persistence operations grouped by entity, plus the
//! aggregate report queries.
//!
//! Every function takes a `&PgPool` and returns a tagged [`StoreError`] so
//! handlers can tell a uniqueness conflict or a bad reference from a generic
//! database failure without inspecting driver error types themselves.

pub mod attendances;
pub mod campaigns;
pub mod candidates;
pub mod events;
pub mod reports;
pub mod roles;
pub mod volunteers;

use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a row with the same unique fields already exists")]
    Conflict,
    #[error("a referenced row does not exist")]
    InvalidReference,
    #[error("value rejected by a table constraint: {0}")]
    InvalidValue(String),
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation => return StoreError::Conflict,
                ErrorKind::ForeignKeyViolation => return StoreError::InvalidReference,
                ErrorKind::CheckViolation => {
                    return StoreError::InvalidValue(db_err.message().to_string());
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}
