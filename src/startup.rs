use std::net::TcpListener;
use std::path::Path;
use std::sync::Arc;

use actix_governor::Governor;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::model::configuration::ApplicationConfiguration;
use crate::rate_limiting::build_rate_limiting_conf;
use crate::routes;
use crate::services::countdown::CountdownService;
use crate::services::participants::{
    ParticipantStore, PostgresParticipantStore, RegistrationService,
};

#[derive(Clone)]
pub struct ApplicationServices {
    pub registration_service: RegistrationService,
    pub countdown_service: CountdownService,
}

impl ApplicationServices {
    pub fn new(store: Arc<dyn ParticipantStore>, deadline: Option<DateTime<Utc>>) -> Self {
        ApplicationServices {
            registration_service: RegistrationService::new(store),
            countdown_service: CountdownService::new(deadline),
        }
    }
}

fn build_services(
    database: PgPool,
    configuration: &ApplicationConfiguration,
) -> ApplicationServices {
    let store = Arc::new(PostgresParticipantStore::new(database));

    ApplicationServices::new(store, configuration.deadline)
}

pub async fn startup(
    database: PgPool,
    configuration: ApplicationConfiguration,
    listener: TcpListener,
) -> anyhow::Result<()> {
    let services = Data::new(build_services(database, &configuration));
    let governor_conf = build_rate_limiting_conf(&configuration.rate_limiting)?;
    let static_dir = configuration.static_dir;

    HttpServer::new(move || {
        App::new()
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(services.clone())
            .service(routes::ping)
            .service(
                web::scope("/api")
                    .wrap(Governor::new(&governor_conf))
                    .configure(routes::configure),
            )
            .configure(|cfg| serve_frontend(cfg, &static_dir))
    })
    .listen(listener)?
    .run()
    .await?;

    Ok(())
}

fn serve_frontend(cfg: &mut web::ServiceConfig, static_dir: &Path) {
    if static_dir.is_dir() {
        cfg.service(actix_files::Files::new("/", static_dir).index_file("index.html"));
    } else {
        tracing::debug!("No frontend found in {:?}, serving the API only", static_dir);
    }
}
