pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod subscriptions;
pub mod utils;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::error::AppError;

/// Malformed JSON bodies answer with the same error shape as everything else.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1 << 20)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            AppError::bad_request(format!("Invalid request body: {}", err)).into()
        })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        AppError::bad_request(format!("Invalid path parameter: {}", err)).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::bad_request(format!("Invalid query parameter: {}", err)).into()
    })
}

/// Routes, extractor settings and API docs. Callers add app data
/// (`PgPool`, `JwtConfig`) and middleware.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .configure(handlers::configure)
        .service(openapi::swagger_ui());
}
