//! Storage-specific error type wrapping sqlx errors.

use zonelight_domain::error::ZonelightError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// A stored JSON value could not be encoded or decoded.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for ZonelightError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
