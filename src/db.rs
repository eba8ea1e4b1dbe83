use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use sqlx::postgres::PgPool;
use sqlx::Row;

/// Represents a user known to the bot
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub telegram_id: i64,
}

/// Represents a logged free-text message
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema...");

    // "user" is a reserved word in Postgres and has to stay quoted
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS "user" (
            id SERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            telegram_id BIGINT NOT NULL UNIQUE
        )"#,
    )
    .execute(pool)
    .await
    .context("Failed to create user table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS message (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL,
            text TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create message table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS message_user_id_idx ON message (user_id)")
        .execute(pool)
        .await
        .context("Failed to create message index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        telegram_id: row.try_get("telegram_id")?,
    })
}

/// Read a user by its surrogate key
pub async fn get_user(pool: &PgPool, id: i32) -> Result<Option<User>> {
    let row = sqlx::query(r#"SELECT id, name, telegram_id FROM "user" WHERE id = $1"#)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to read user")?;

    row.as_ref().map(user_from_row).transpose()
}

/// Read a user by its Telegram chat identifier
pub async fn get_user_by_telegram_id(pool: &PgPool, telegram_id: i64) -> Result<Option<User>> {
    let row = sqlx::query(r#"SELECT id, name, telegram_id FROM "user" WHERE telegram_id = $1"#)
        .bind(telegram_id)
        .fetch_optional(pool)
        .await
        .context("Failed to read user by telegram_id")?;

    row.as_ref().map(user_from_row).transpose()
}

/// Insert a user or overwrite the name of the existing one
///
/// This is a plain check-then-act sequence with no surrounding transaction.
/// Two concurrent first contacts for the same `telegram_id` race on the
/// insert; the loser hits the unique constraint and its error propagates.
pub async fn upsert_user(pool: &PgPool, telegram_id: i64, name: &str) -> Result<User> {
    if let Some(existing) = get_user_by_telegram_id(pool, telegram_id).await? {
        info!("Updating name for telegram_id: {}", telegram_id);

        sqlx::query(r#"UPDATE "user" SET name = $1 WHERE telegram_id = $2"#)
            .bind(name)
            .bind(telegram_id)
            .execute(pool)
            .await
            .context("Failed to update user")?;

        return Ok(User {
            name: name.to_string(),
            ..existing
        });
    }

    info!("Creating new user for telegram_id: {}", telegram_id);

    let row = sqlx::query(
        r#"INSERT INTO "user" (name, telegram_id) VALUES ($1, $2) RETURNING id, name, telegram_id"#,
    )
    .bind(name)
    .bind(telegram_id)
    .fetch_one(pool)
    .await
    .context("Failed to insert new user")?;

    let user = user_from_row(&row)?;
    info!("User created with ID: {}", user.id);
    Ok(user)
}

/// Append a message to the log and return its row ID
pub async fn insert_message(pool: &PgPool, telegram_id: i64, text: &str) -> Result<i64> {
    let message_id: i64 =
        sqlx::query_scalar("INSERT INTO message (user_id, text) VALUES ($1, $2) RETURNING id")
            .bind(telegram_id)
            .bind(text)
            .fetch_one(pool)
            .await
            .context("Failed to insert message")?;

    info!(
        "Message {} logged for telegram_id: {}",
        message_id, telegram_id
    );
    Ok(message_id)
}

/// List the messages logged for a chat, oldest first
pub async fn list_messages(pool: &PgPool, telegram_id: i64) -> Result<Vec<MessageRecord>> {
    let rows = sqlx::query(
        "SELECT id, user_id, text, created_at FROM message WHERE user_id = $1 ORDER BY id",
    )
    .bind(telegram_id)
    .fetch_all(pool)
    .await
    .context("Failed to list messages")?;

    rows.iter()
        .map(|row| -> Result<MessageRecord> {
            Ok(MessageRecord {
                id: row.try_get("id")?,
                user_id: row.try_get("user_id")?,
                text: row.try_get("text")?,
                created_at: row.try_get("created_at")?,
            })
        })
        .collect()
}

/// Count user rows holding a Telegram chat identifier
pub async fn count_users_with_telegram_id(pool: &PgPool, telegram_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "user" WHERE telegram_id = $1"#)
        .bind(telegram_id)
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;

    Ok(count)
}
