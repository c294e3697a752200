//! Persistent log of routing outcomes.

use crate::database::{self, EntryFilter, GroupColumn};
use crate::error::AppError;
use crate::models::{LogEntry, MemoryStats, StatsReport};
use serde::Serialize;
use sqlx::sqlite::SqlitePool;
use std::collections::BTreeMap;
use tracing::{debug, error, instrument};

/// Writes and queries [`LogEntry`] rows.
///
/// Writes report failures to the caller; reads never fail and answer an empty
/// list (or an error report for [`get_stats`](Self::get_stats)) instead.
#[derive(Clone)]
pub struct MemoryLogger {
    pool: SqlitePool,
}

impl MemoryLogger {
    /// Opens the database at `db_url`, creating the file and schema if needed.
    pub async fn connect(db_url: &str) -> Result<Self, AppError> {
        let pool = database::init_db(db_url).await?;
        Ok(Self { pool })
    }

    /// Wraps an existing pool. The schema must already be applied.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persists one entry inside a transaction and returns it.
    ///
    /// Any failure leaves the table untouched.
    #[instrument(skip(self, payload))]
    pub async fn log_entry<P>(
        &self,
        source: &str,
        format: &str,
        intent: &str,
        payload: &P,
    ) -> Result<LogEntry, AppError>
    where
        P: Serialize + ?Sized,
    {
        let payload = serde_json::to_string(payload)?;
        let mut tx = self.pool.begin().await?;
        let entry = database::insert_entry(&mut tx, source, format, intent, &payload).await?;
        tx.commit().await?;
        debug!("Logged entry {}", entry.id);
        Ok(entry)
    }

    pub async fn fetch_all(&self, limit: u32) -> Vec<LogEntry> {
        self.fetch(EntryFilter::All, limit).await
    }

    pub async fn fetch_by_source(&self, source: &str, limit: u32) -> Vec<LogEntry> {
        self.fetch(EntryFilter::Source(source), limit).await
    }

    pub async fn fetch_by_intent(&self, intent: &str, limit: u32) -> Vec<LogEntry> {
        self.fetch(EntryFilter::Intent(intent), limit).await
    }

    async fn fetch(&self, filter: EntryFilter<'_>, limit: u32) -> Vec<LogEntry> {
        database::fetch_entries(&self.pool, filter, limit)
            .await
            .unwrap_or_else(|e| {
                error!("Failed to fetch log entries ({:?}): {}", filter, e);
                Vec::new()
            })
    }

    /// Total entry count plus counts per distinct format and intent, over the whole table.
    pub async fn get_stats(&self) -> StatsReport {
        match self.collect_stats().await {
            Ok(stats) => StatsReport::Stats(stats),
            Err(e) => {
                error!("Failed to compute log statistics: {}", e);
                StatsReport::Error {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn collect_stats(&self) -> Result<MemoryStats, AppError> {
        let total = database::count_entries(&self.pool).await?;
        let formats = database::count_by(&self.pool, GroupColumn::Format).await?;
        let intents = database::count_by(&self.pool, GroupColumn::Intent).await?;

        let to_counts = |rows: Vec<(String, i64)>| -> BTreeMap<String, u64> {
            rows.into_iter()
                .map(|(value, count)| (value, count.max(0) as u64))
                .collect()
        };

        Ok(MemoryStats {
            total_entries: total.max(0) as u64,
            format_counts: to_counts(formats),
            intent_counts: to_counts(intents),
        })
    }

    /// Closes the pool; later operations fail (writes) or come back empty (reads).
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
