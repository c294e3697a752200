use crate::models::LogEntry;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

/// Opens (creating if missing) the SQLite database at `db_url` and applies the schema.
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    info!("Initializing database at: {}", db_url);

    let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;

    info!("Database initialized and migrations applied.");

    Ok(pool)
}

/// Creates the log table if it does not exist. Safe to run repeatedly.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS log_entries (
            id TEXT PRIMARY KEY,
            source TEXT,
            format TEXT,
            intent TEXT,
            payload TEXT,
            timestamp DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        CREATE INDEX IF NOT EXISTS idx_log_entries_timestamp ON log_entries(timestamp);
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Row filter for [`fetch_entries`].
#[derive(Debug, Clone, Copy)]
pub enum EntryFilter<'a> {
    All,
    Source(&'a str),
    Intent(&'a str),
}

// --- Log entries ---

pub async fn insert_entry(
    tx: &mut Transaction<'_, Sqlite>,
    source: &str,
    format: &str,
    intent: &str,
    payload: &str,
) -> Result<LogEntry, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let timestamp: DateTime<Utc> = Utc::now();

    sqlx::query_as::<_, LogEntry>(
        r#"
        INSERT INTO log_entries (id, source, format, intent, payload, timestamp)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, source, format, intent, payload, timestamp
        "#,
    )
    .bind(&id)
    .bind(source)
    .bind(format)
    .bind(intent)
    .bind(payload)
    .bind(timestamp)
    .fetch_one(&mut **tx)
    .await
}

/// Newest entries first; rows written in the same instant keep insertion order.
pub async fn fetch_entries(
    pool: &SqlitePool,
    filter: EntryFilter<'_>,
    limit: u32,
) -> Result<Vec<LogEntry>, sqlx::Error> {
    const COLUMNS: &str = "SELECT id, source, format, intent, payload, timestamp FROM log_entries";
    const ORDER: &str = "ORDER BY timestamp DESC, rowid DESC LIMIT ?";

    match filter {
        EntryFilter::All => {
            sqlx::query_as::<_, LogEntry>(&format!("{} {}", COLUMNS, ORDER))
                .bind(limit)
                .fetch_all(pool)
                .await
        }
        EntryFilter::Source(source) => {
            sqlx::query_as::<_, LogEntry>(&format!("{} WHERE source = ? {}", COLUMNS, ORDER))
                .bind(source)
                .bind(limit)
                .fetch_all(pool)
                .await
        }
        EntryFilter::Intent(intent) => {
            sqlx::query_as::<_, LogEntry>(&format!("{} WHERE intent = ? {}", COLUMNS, ORDER))
                .bind(intent)
                .bind(limit)
                .fetch_all(pool)
                .await
        }
    }
}

pub async fn count_entries(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM log_entries")
        .fetch_one(pool)
        .await
}

/// Counts per distinct non-empty value of `column` (`format` or `intent`).
pub async fn count_by(
    pool: &SqlitePool,
    column: GroupColumn,
) -> Result<Vec<(String, i64)>, sqlx::Error> {
    let column = column.as_str();
    sqlx::query_as::<_, (String, i64)>(&format!(
        "SELECT {col}, COUNT(*) FROM log_entries \
         WHERE {col} IS NOT NULL AND {col} != '' \
         GROUP BY {col} ORDER BY {col}",
        col = column
    ))
    .fetch_all(pool)
    .await
}

/// Columns [`count_by`] may group on.
#[derive(Debug, Clone, Copy)]
pub enum GroupColumn {
    Format,
    Intent,
}

impl GroupColumn {
    fn as_str(&self) -> &'static str {
        match self {
            GroupColumn::Format => "format",
            GroupColumn::Intent => "intent",
        }
    }
}
