use actix_web::http::StatusCode;
use actix_web::{get, web, HttpResponse, ResponseError};
use rand::Rng;
use serde_json::json;
use validator::ValidationErrors;

use crate::model::participant::error_messages;
use crate::services::ServiceError;

pub mod countdown;
pub mod users;

/// Largest registration payload accepted
const JSON_LIMIT: usize = 16 * 1024;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Invalid registration: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("{0}")]
    ServiceError(#[from] ServiceError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(errors) => HttpResponse::BadRequest().json(error_messages(errors)),
            ApiError::MalformedPayload(detail) => {
                HttpResponse::BadRequest().json(json!({ "detail": detail }))
            }
            ApiError::ServiceError(error) => {
                tracing::error!("Could not process the request: {}", error);
                HttpResponse::InternalServerError().json(json!({"type":"/problem/database",
                    "title": "Error with the database",
                    "status": 500,
                    "detail": "Unexpected error with the database"}))
            }
        }
    }
}

#[get("/api/ping")]
#[tracing::instrument]
pub async fn ping() -> HttpResponse {
    let mut rng = rand::thread_rng();
    let quotes = [
        "Ho ho ho",
        "He's making a list, he's checking it twice",
        "Better not pout, better not cry",
        "Keep the change, ya filthy animal",
        "You'll shoot your eye out",
        "Bah! Humbug!",
        "The best way to spread Christmas cheer is singing loud for all to hear",
        "Every time a bell rings, an angel gets his wings",
        "Son of a nutcracker!",
        "I'm dreaming of a white Christmas",
    ];

    HttpResponse::Ok()
        .content_type("text/plain")
        .body(quotes[rng.gen_range(0..quotes.len())])
}

/// Bad JSON is reported like the other client errors, as a 400 with a body
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|error, _request| ApiError::MalformedPayload(error.to_string()).into())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .configure(users::configure)
        .configure(countdown::configure);
}
