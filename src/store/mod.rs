//! Entity stores: parameterized CRUD over one record table.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::model::Record;
use crate::sql::ConstraintViolation;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Violation(ConstraintViolation),
    #[error("database: {0}")]
    Db(sqlx::Error),
}

/// Unique and not-null violations become structured descriptors; every other
/// driver error is kept as is.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match ConstraintViolation::from_sqlx(&err) {
            Some(v) => StoreError::Violation(v),
            None => StoreError::Db(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Parameterized operations against the table of `R`.
///
/// Lookups return `None` or a zero count when nothing matches; only failed
/// writes and backend faults are errors.
#[async_trait]
pub trait EntityStore<R: Record>: Send + Sync {
    /// Rows in canonical order (natural key in byte order, then id), after skipping `offset`.
    async fn page(&self, limit: i64, offset: i64) -> StoreResult<Vec<R>>;

    async fn all(&self) -> StoreResult<Vec<R>>;

    async fn by_id(&self, id: i32) -> StoreResult<Option<R>>;

    async fn by_key(&self, key: &str) -> StoreResult<Option<R>>;

    /// Insert and return the generated id.
    async fn create(&self, record: &R) -> StoreResult<i32>;

    /// Replace the row `id` with `record` (including `record.id()`). Returns rows affected.
    async fn update(&self, id: i32, record: &R) -> StoreResult<u64>;

    async fn delete(&self, id: i32) -> StoreResult<u64>;

    async fn count_id(&self, id: i32) -> StoreResult<i64>;

    async fn count_key(&self, key: &str) -> StoreResult<i64>;

    async fn count_key_excluding(&self, key: &str, exclude_id: i32) -> StoreResult<i64>;

    async fn count_id_excluding(&self, new_id: i32, current_id: i32) -> StoreResult<i64>;

    /// Drop and recreate the table. Destroys all rows.
    async fn initialize(&self) -> StoreResult<()>;

    /// Remove all rows and restart id generation.
    async fn truncate(&self) -> StoreResult<()>;
}
