use actix_web::{post, web, HttpResponse};
use serde_json::json;

use crate::model::RegistrationRequest;
use crate::routes::ApiError;
use crate::startup::ApplicationServices;

#[post("/users")]
#[tracing::instrument(skip(services))]
async fn register_user(
    registration: web::Json<RegistrationRequest>,
    services: web::Data<ApplicationServices>,
) -> Result<HttpResponse, ApiError> {
    let participant = registration.into_inner().validated().map_err(|errors| {
        tracing::debug!("Registration rejected: {}", errors);
        errors
    })?;

    services.registration_service.register(participant).await?;

    Ok(HttpResponse::Ok().json(json!({"message": "Registration successful!"})))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(register_user);
}
