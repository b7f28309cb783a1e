use super::{MessageStore, StoreError};
use crate::db::Db;
use crate::models::Message;
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};

/// Message storage over the `messages(id, msg)` table.
#[derive(Clone)]
pub struct SqlStore {
    db: Db,
}

impl SqlStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.db.0
    }
}

fn message_from_row(row: &AnyRow) -> Result<Message, sqlx::Error> {
    Ok(Message {
        id: row.try_get("id")?,
        text: row.try_get("msg")?,
    })
}

#[async_trait]
impl MessageStore for SqlStore {
    async fn create(&self, msg: &mut Message) -> Result<(), StoreError> {
        if msg.has_assigned_id() {
            sqlx::query("INSERT INTO messages (id, msg) VALUES (?, ?)")
                .bind(msg.id)
                .bind(msg.text.as_str())
                .execute(self.pool())
                .await?;
            return Ok(());
        }

        let result = sqlx::query("INSERT INTO messages (msg) VALUES (?)")
            .bind(msg.text.as_str())
            .execute(self.pool())
            .await?;
        msg.id = result.last_insert_id().ok_or_else(|| {
            StoreError::Failure("database did not report the assigned id".into())
        })?;
        log::debug!("inserted message id={}", msg.id);
        Ok(())
    }

    async fn read(&self, id: i64) -> Result<Message, StoreError> {
        let row = sqlx::query("SELECT id, msg FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        let row = row.ok_or(StoreError::NotFound)?;
        Ok(message_from_row(&row)?)
    }

    async fn update(&self, msg: &Message) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE messages SET msg = ? WHERE id = ?")
            .bind(msg.text.as_str())
            .bind(msg.id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            log::debug!("update of message id={} matched no rows", msg.id);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            log::debug!("delete of message id={id} matched no rows");
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query("SELECT id, msg FROM messages")
            .fetch_all(self.pool())
            .await?;
        let messages = rows
            .iter()
            .map(message_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(messages)
    }
}
