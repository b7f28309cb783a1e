pub mod health;
pub mod messages;

use crate::errors::ApiError;
use actix_web::error::JsonPayloadError;
use actix_web::web;

/// Request bodies larger than this many bytes are rejected with 413.
pub const DEFAULT_BODY_LIMIT: usize = 4 * 1024 * 1024;

fn json_error(err: JsonPayloadError) -> ApiError {
    match err {
        JsonPayloadError::Overflow { limit } | JsonPayloadError::OverflowKnownLength { limit, .. } => {
            ApiError::PayloadTooLarge(format!("Request payload exceeds {limit} bytes"))
        }
        other => {
            log::debug!("rejected request body: {other}");
            ApiError::BadRequest("Invalid request payload".into())
        }
    }
}

/// Registers every route. `resource_path` is the joined version and resource
/// segment, e.g. `/v1/messages`; `body_limit` caps JSON bodies in bytes.
pub fn configure(cfg: &mut web::ServiceConfig, resource_path: &str, body_limit: usize) {
    let json_cfg = web::JsonConfig::default()
        .limit(body_limit)
        .content_type_required(false)
        .error_handler(|err, _req| json_error(err).into());

    cfg.app_data(json_cfg)
        .route("/hello", web::get().to(health::hello))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope(resource_path)
                .route("", web::get().to(messages::list_messages))
                .route("", web::post().to(messages::create_message))
                .route("/palindromeChk/{id}", web::get().to(messages::palindrome_check))
                .route("/{id}", web::get().to(messages::get_message))
                .route("/{id}", web::put().to(messages::update_message))
                .route("/{id}", web::delete().to(messages::delete_message)),
        );
}
