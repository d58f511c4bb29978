pub mod document_handlers;
pub mod status_handlers;

use actix_web::web;

use crate::config::EndpointPaths;
use crate::errors::AppError;

/// Reject unreadable JSON bodies with the same 400 shape as field validation.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1 << 20)
        .error_handler(|err, _req| AppError::Validation(vec![err.to_string()]).into())
}

/// Size cap for the raw bodies the protected routes read.
pub fn payload_config() -> web::PayloadConfig {
    web::PayloadConfig::new(1 << 20)
}

/// Register every route at its configured path.
pub fn configure(cfg: &mut web::ServiceConfig, paths: &EndpointPaths) {
    cfg.app_data(json_config())
        .app_data(payload_config())
        .route(&paths.status, web::get().to(status_handlers::index))
        .route(&paths.submit, web::post().to(document_handlers::submit))
        .route(&paths.get_document_list, web::post().to(document_handlers::list))
        .route(&paths.update_downloaded, web::post().to(document_handlers::update_downloaded))
        .route(&paths.init_db, web::post().to(document_handlers::init_db));
}
