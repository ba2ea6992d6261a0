//! Repository implementations for database operations.

pub mod email_setting;
pub mod feedback;

pub use email_setting::EmailSettingRepository;
pub use feedback::FeedbackRepository;

use domain::services::StoreError;

/// Connection-level failures mean the database is unreachable; everything
/// else is a query error.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        other => StoreError::Database(other.to_string()),
    }
}
