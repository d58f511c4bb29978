use chrono::{DateTime, Datelike, Duration, Utc};
use sqlx::PgPool;

use crate::db::SCHEMA;
use crate::errors::AppError;
use super::types::*;

const SELECT_COLUMNS: &str = "document_id, document_number, document_title, request_user, \
                              request_group, request_factory, amount, flow_status, end_date, \
                              downloaded, json_data, created_at";

/// Create the table if it does not exist. With `force`, drop it first.
///
/// The drop and re-create share a transaction, so a failed reset leaves the
/// existing table in place.
pub async fn ensure_schema(pool: &PgPool, force: bool) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    if force {
        sqlx::query("DROP TABLE IF EXISTS purchase_requisition")
            .execute(&mut *tx)
            .await?;
        log::warn!("Dropped table purchase_requisition");
    }
    sqlx::raw_sql(SCHEMA).execute(&mut *tx).await?;
    tx.commit().await?;
    log::info!("Schema ready (force={force})");
    Ok(())
}

/// Store a document unless one with the same id already exists.
///
/// A duplicate id is not an error; the first submission wins.
pub async fn ingest(pool: &PgPool, doc: &NewDocument) -> Result<(), AppError> {
    let result = sqlx::query(
        "INSERT INTO purchase_requisition \
             (document_id, document_number, document_title, request_user, request_group, \
              request_factory, amount, flow_status, end_date, json_data) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (document_id) DO NOTHING",
    )
    .bind(doc.document_id)
    .bind(&doc.document_number)
    .bind(&doc.document_title)
    .bind(&doc.request_user)
    .bind(&doc.request_group)
    .bind(&doc.request_factory)
    .bind(doc.amount)
    .bind(&doc.flow_status)
    .bind(&doc.end_date)
    .bind(&doc.json_data)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        log::debug!("document_id {} already stored, submission skipped", doc.document_id);
    } else {
        log::debug!("document_id {} inserted", doc.document_id);
    }
    Ok(())
}

/// Oldest `created_at` a downloaded document may have and still be listed.
///
/// `None` when the window reaches back past year 1, which Postgres cannot
/// represent; every downloaded document is then inside the window.
pub fn retention_cutoff(now: DateTime<Utc>, retention: Duration) -> Option<DateTime<Utc>> {
    now.checked_sub_signed(retention).filter(|cutoff| cutoff.year() >= 1)
}

/// Every undownloaded document, plus downloaded ones created within `retention`.
/// Newest first.
pub async fn list_pending_and_recent(
    pool: &PgPool,
    retention: Duration,
) -> Result<Vec<DocumentRecord>, AppError> {
    list_pending_and_recent_at(pool, retention, Utc::now()).await
}

/// [`list_pending_and_recent`] evaluated as of `now`.
/// The window is inclusive: `now - created_at <= retention` is listed.
pub async fn list_pending_and_recent_at(
    pool: &PgPool,
    retention: Duration,
    now: DateTime<Utc>,
) -> Result<Vec<DocumentRecord>, AppError> {
    let cutoff = retention_cutoff(now, retention);
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM purchase_requisition \
         WHERE downloaded = 0 \
            OR (downloaded = 1 AND ($1::timestamptz IS NULL OR created_at >= $1)) \
         ORDER BY created_at DESC, document_id DESC"
    );
    let rows = sqlx::query_as::<_, DocumentRecord>(&sql)
        .bind(cutoff)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Set the downloaded flag. `NotFound` when no row has `document_id`.
pub async fn set_downloaded(
    pool: &PgPool,
    document_id: i64,
    flag: DownloadedFlag,
) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE purchase_requisition SET downloaded = $1 WHERE document_id = $2")
        .bind(flag.as_i32())
        .bind(document_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn count(pool: &PgPool) -> Result<i64, AppError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchase_requisition")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

pub async fn find_by_id(pool: &PgPool, document_id: i64) -> Result<Option<DocumentRecord>, AppError> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM purchase_requisition WHERE document_id = $1");
    let row = sqlx::query_as::<_, DocumentRecord>(&sql)
        .bind(document_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}
