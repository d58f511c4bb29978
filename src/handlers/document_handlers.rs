use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::PgPool;

use crate::auth::api_key::check_key;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::document::{self, DownloadedFlag};

/// Body of `update_downloaded`, parsed after the key has been checked.
#[derive(Debug, Deserialize)]
pub struct UpdateDownloadedRequest {
    pub document_id: i64,
    pub downloaded: i64,
}

/// The shared secret travels in the JSON body as `key`.
///
/// Runs on the raw bytes so a body that is not JSON at all is still a 401,
/// never a 400. Returns the parsed body once the key matches.
fn require_key(body: &[u8], config: &AppConfig) -> Result<Value, AppError> {
    let parsed = serde_json::from_slice::<Value>(body).ok();
    let key = parsed.as_ref().and_then(|v| v.get("key")).and_then(Value::as_str);
    check_key(key, &config.secret_key)?;
    parsed.ok_or(AppError::Unauthorized)
}

/// POST /submit
/// Stores a document unless its id is already present; the reply is the same either way.
pub async fn submit(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let payload = body.into_inner();
    let doc = document::extract_submission(&payload, &config.field_map, config.canonical_offset)
        .map_err(AppError::Validation)?;

    document::ingest(&pool, &doc).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("document_id {} Data inserted successfully", doc.document_id)
    })))
}

/// POST /get_document_list
/// Pending documents plus those downloaded within the retention window, newest first.
pub async fn list(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    require_key(&body, &config)?;

    let documents = document::list_pending_and_recent(&pool, config.retention()).await?;
    log::info!(
        "Listed {} documents (retention {} days)",
        documents.len(),
        config.retention_days
    );

    Ok(HttpResponse::Ok().json(documents))
}

/// POST /update_downloaded
pub async fn update_downloaded(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let body = require_key(&body, &config)?;

    let req: UpdateDownloadedRequest = serde_json::from_value(body)
        .map_err(|e| AppError::Validation(vec![e.to_string()]))?;
    let flag = DownloadedFlag::try_from(req.downloaded).map_err(|e| AppError::Validation(vec![e]))?;

    document::set_downloaded(&pool, req.document_id, flag).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!(
            "downloaded updated for document_id {} to {}",
            req.document_id,
            flag.as_i32()
        )
    })))
}

/// POST /init_db
/// Drops and re-creates the table.
pub async fn init_db(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    require_key(&body, &config)?;

    document::ensure_schema(&pool, true).await?;
    log::warn!("Database re-initialized via {}", config.paths.init_db);

    Ok(HttpResponse::Ok().json(json!({ "message": "Database initialized." })))
}
