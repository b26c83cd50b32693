//! Persistence for users, classes, selections, enrollments and payments.
//!
//! Each store wraps a clone of one shared SQLite pool; nothing here holds
//! process-wide state.

pub mod classes;
pub mod enrollments;
pub mod payments;
pub mod selections;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::error::AppError;

pub use classes::ClassCatalog;
pub use enrollments::EnrollmentWorkflow;
pub use payments::PaymentLog;
pub use selections::SelectionStore;
pub use users::UserStore;

/// Opens (creating if needed) the database and applies pending migrations.
pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database; every connection to `:memory:`
/// is its own database, so the pool must never open a second one.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();
    pool
}

/// Same pool settings as production on a throwaway database file. The
/// directory must outlive the pool.
#[cfg(test)]
pub async fn file_pool() -> (SqlitePool, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("camp.db").display());
    let pool = connect(&url).await.unwrap();
    (pool, dir)
}
