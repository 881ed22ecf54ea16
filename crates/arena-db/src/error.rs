//! Database error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

impl DbError {
    /// Map a query error, surfacing unique-constraint violations as
    /// duplicates so callers can translate them to conflict responses.
    pub(crate) fn from_query(err: sqlx::Error, context: &str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return DbError::Duplicate(context.to_string());
            }
        }
        DbError::Query(err.to_string())
    }
}
