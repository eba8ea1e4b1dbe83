//! # Record Store Module
//!
//! The persistence seam handed to every handler. Handlers only see
//! `Arc<dyn RecordStore>`; the Postgres implementation delegates to [`crate::db`].

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPool;

use crate::db::{self, User};

/// Lookup-or-insert operations over the `user` and `message` tables
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Point lookup by surrogate key
    async fn get_user(&self, id: i32) -> Result<Option<User>>;

    /// Point lookup by Telegram chat identifier
    async fn get_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>>;

    /// Insert the user, or overwrite the name when the identifier is known
    async fn upsert_user(&self, telegram_id: i64, name: &str) -> Result<User>;

    /// Unconditionally append a message, returning its row ID
    async fn insert_message(&self, telegram_id: i64, text: &str) -> Result<i64>;
}

/// Postgres-backed record store
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn get_user(&self, id: i32) -> Result<Option<User>> {
        db::get_user(&self.pool, id).await
    }

    async fn get_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        db::get_user_by_telegram_id(&self.pool, telegram_id).await
    }

    async fn upsert_user(&self, telegram_id: i64, name: &str) -> Result<User> {
        db::upsert_user(&self.pool, telegram_id, name).await
    }

    async fn insert_message(&self, telegram_id: i64, text: &str) -> Result<i64> {
        db::insert_message(&self.pool, telegram_id, text).await
    }
}
