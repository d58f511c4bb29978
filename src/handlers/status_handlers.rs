use actix_web::{web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::document;

/// GET /
pub async fn index(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let total = document::count(&pool).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Service is Active. Total documents count: {total}")
    })))
}
