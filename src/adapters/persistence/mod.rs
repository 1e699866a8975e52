use sqlx::PgPool;

use crate::app_error::AppError;

pub mod waitlist;

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }
}

/// PostgreSQL unique violation, detected by message since the non-macro
/// query API is in use.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = db_err.message();
            msg.contains("duplicate key") || msg.contains("unique constraint")
        }
        _ => false,
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        // Log the actual error for debugging, but don't expose details
        tracing::error!(error = ?err, "Database error");
        AppError::Database("Database operation failed".into())
    }
}
