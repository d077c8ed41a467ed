//! Image record persistence
//!
//! `RecordStore` is the document-store view the orchestrator depends on;
//! `SqliteRecordStore` backs it with the shared `images` table.

use async_trait::async_trait;
use myagara_common::Result;
use sqlx::SqlitePool;

use crate::models::Record;

/// Key-value access to classification records
///
/// `save` inserts or overwrites by `id`. `delete_by_id` on an unknown id is
/// a no-op; existence checks belong to the caller.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Record>>;

    /// All records, in no particular order
    async fn find_all(&self) -> Result<Vec<Record>>;

    async fn save(&self, record: &Record) -> Result<Record>;

    async fn exists_by_id(&self, id: &str) -> Result<bool>;

    async fn delete_by_id(&self, id: &str) -> Result<()>;

    async fn delete_all(&self) -> Result<()>;
}

type RecordRow = (String, String, i64, String, f64);

fn from_row((id, filename, timestamp, label, confidence): RecordRow) -> Record {
    Record {
        id,
        filename,
        timestamp,
        label,
        confidence,
    }
}

/// SQLite-backed record store
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM images")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Record>> {
        let row: Option<RecordRow> = sqlx::query_as(
            "SELECT id, filename, timestamp, label, confidence FROM images WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(from_row))
    }

    async fn find_all(&self) -> Result<Vec<Record>> {
        let rows: Vec<RecordRow> =
            sqlx::query_as("SELECT id, filename, timestamp, label, confidence FROM images")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(from_row).collect())
    }

    async fn save(&self, record: &Record) -> Result<Record> {
        sqlx::query(
            r#"
            INSERT INTO images (id, filename, timestamp, label, confidence, updated_at)
            VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(id) DO UPDATE SET
                filename = excluded.filename,
                timestamp = excluded.timestamp,
                label = excluded.label,
                confidence = excluded.confidence,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&record.id)
        .bind(&record.filename)
        .bind(record.timestamp)
        .bind(&record.label)
        .bind(record.confidence)
        .execute(&self.pool)
        .await?;

        Ok(record.clone())
    }

    async fn exists_by_id(&self, id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM images WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        let result = sqlx::query("DELETE FROM images").execute(&self.pool).await?;
        tracing::debug!(deleted = result.rows_affected(), "Deleted all image records");
        Ok(())
    }
}
