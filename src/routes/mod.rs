pub mod auth;
pub mod health;
pub mod tasks;

use actix_cors::Cors;
use actix_web::{http::header, web};

use crate::error::AppError;

/// Registers every route. The caller wraps the app in `AuthMiddleware`, which lets
/// `/health` and `/auth/**` through and guards the rest.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(health::health)
        .service(
            web::scope("/auth")
                .service(auth::login)
                .service(auth::register),
        )
        .service(
            web::scope("/api/tasks")
                .service(tasks::update_task_status)
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}

/// CORS policy for the browser frontend: one allowed origin, credentials on.
pub fn cors(allowed_origin: &str) -> Cors {
    Cors::default()
        .allowed_origin(allowed_origin)
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"])
        .allow_any_header()
        .expose_headers(vec![header::CONTENT_TYPE])
        .supports_credentials()
        .max_age(3600)
}

/// Malformed or incomplete JSON bodies answer 400 with the usual `{"error": ...}` body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// A path segment that does not parse (a non-numeric user id, a malformed task id) names
/// no resource: 404 with a JSON body.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::NotFound(format!("Resource not found: {}", err)).into())
}
