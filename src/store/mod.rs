//! Persistence contract for messages.
//!
//! The HTTP layer only sees [`MessageStore`]. [`SqlStore`] talks to MySQL or
//! SQLite through sqlx; [`InMemoryStore`] keeps everything in a map and is
//! what the tests run against.

mod memory;
mod sql;

pub use memory::InMemoryStore;
pub use sql::SqlStore;

use crate::config::StoreConfig;
use crate::db::Db;
use crate::models::Message;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Message not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(#[source] BoxError),
    #[error("constraint violation: {0}")]
    ConstraintViolation(#[source] BoxError),
    #[error("store failure: {0}")]
    Failure(#[source] BoxError),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if matches!(e, sqlx::Error::RowNotFound) {
            StoreError::NotFound
        } else if is_unavailable(&e) {
            StoreError::Unavailable(Box::new(e))
        } else if is_constraint_violation(&e) {
            StoreError::ConstraintViolation(Box::new(e))
        } else {
            StoreError::Failure(Box::new(e))
        }
    }
}

fn is_unavailable(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

fn is_constraint_violation(e: &sqlx::Error) -> bool {
    use sqlx::error::ErrorKind;

    match e {
        sqlx::Error::Database(db) => matches!(
            db.kind(),
            ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation
        ),
        _ => false,
    }
}

/// Each operation is a single statement; nothing here retries or wraps
/// calls in a transaction.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Inserts `msg`. A positive `msg.id` is used as-is, otherwise the store
    /// assigns one and writes it back into `msg.id`.
    async fn create(&self, msg: &mut Message) -> Result<(), StoreError>;

    /// Fails with [`StoreError::NotFound`] when no row has `id`.
    async fn read(&self, id: i64) -> Result<Message, StoreError>;

    /// Overwrites the text of `msg.id`. Missing rows are not an error.
    async fn update(&self, msg: &Message) -> Result<(), StoreError>;

    /// Removes `id`. Missing rows are not an error.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// Every stored message, in whatever order the store yields them.
    async fn list_all(&self) -> Result<Vec<Message>, StoreError>;
}

/// Picks the adapter named by `cfg.driver`.
pub async fn connect(cfg: &StoreConfig) -> anyhow::Result<Arc<dyn MessageStore>> {
    if cfg.driver == "memory" {
        log::warn!("using in-memory message store, data will not survive a restart");
        return Ok(Arc::new(InMemoryStore::new()));
    }
    let db = Db::connect(cfg).await?;
    Ok(Arc::new(SqlStore::new(db)))
}
