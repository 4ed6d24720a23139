use actix_web::{get, web, HttpResponse};
use chrono::Utc;

use crate::startup::ApplicationServices;

#[get("/countdown")]
#[tracing::instrument(skip(services), level = "debug")]
async fn get_countdown(services: web::Data<ApplicationServices>) -> HttpResponse {
    HttpResponse::Ok().json(services.countdown_service.countdown(Utc::now()))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_countdown);
}
