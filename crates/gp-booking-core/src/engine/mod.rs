//! The slot-allocation and lifecycle engine.
//!
//! Each component borrows the [`Database`](crate::db::Database) for one
//! short-lived operation; no state is held between calls. The store
//! transaction boundary is the only concurrency mechanism: every decision
//! re-reads current store state inside the transaction that acts on it.

mod allocator;
mod lifecycle;
mod rating;

pub use allocator::*;
pub use lifecycle::*;
pub use rating::*;

use chrono::Duration;
use thiserror::Error;

use crate::db::DbError;

/// How far either side of the timeslot a patient may check in.
pub fn check_in_window() -> Duration {
    Duration::hours(1)
}

/// Minimum notice for a cancellation, measured back from the timeslot.
pub fn cancellation_notice() -> Duration {
    Duration::days(5)
}

/// Typed outcomes of engine operations. Every variant maps to a distinct,
/// actionable message; the engine never retries internally.
#[derive(Error, Debug, PartialEq)]
pub enum EngineError {
    #[error("this slot was just taken or is no longer offered - choose another")]
    SlotUnavailable,

    #[error("check-in is only possible within an hour of the appointment time")]
    OutsideCheckInWindow,

    #[error("appointments can only be cancelled five or more days in advance")]
    CancellationWindowClosed,

    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("this visit has already been rated")]
    AlreadyRated,

    #[error("the GP has not confirmed this appointment yet")]
    NotConfirmed,

    #[error("only attended appointments can be rated")]
    NotYetAttended,

    #[error("no matching record: {0}")]
    NotFound(String),

    #[error("storage unavailable, try again: {0}")]
    StoreUnavailable(String),

    #[error("the record changed underneath this request - re-read and retry")]
    Conflict,
}

pub type EngineResult<T> = Result<T, EngineError>;

impl From<DbError> for EngineError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => EngineError::NotFound(what),
            DbError::Sqlite(e) => e.into(),
            DbError::Constraint(msg) => EngineError::StoreUnavailable(msg),
        }
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(e: rusqlite::Error) -> Self {
        if is_constraint_violation(&e) {
            // A constraint caught mid-transaction means another writer won
            EngineError::Conflict
        } else {
            EngineError::StoreUnavailable(e.to_string())
        }
    }
}

pub(crate) fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    e.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation)
}

/// Whether a constraint failure was specifically a foreign-key violation,
/// as opposed to a unique-index collision.
pub(crate) fn is_foreign_key_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_maps_through() {
        let err: EngineError = DbError::NotFound("visit b-1".into()).into();
        assert_eq!(err, EngineError::NotFound("visit b-1".into()));
    }

    #[test]
    fn test_messages_are_distinct() {
        let errors = [
            EngineError::SlotUnavailable,
            EngineError::OutsideCheckInWindow,
            EngineError::CancellationWindowClosed,
            EngineError::InvalidRating(7),
            EngineError::AlreadyRated,
            EngineError::NotConfirmed,
            EngineError::NotYetAttended,
            EngineError::NotFound("x".into()),
            EngineError::StoreUnavailable("x".into()),
            EngineError::Conflict,
        ];
        let messages: std::collections::HashSet<String> =
            errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(messages.len(), errors.len());
    }
}
