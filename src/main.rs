use std::net::TcpListener;

use secret_santa_api::database::{init_postgres_connection, run_migrations};
use secret_santa_api::model::configuration::ApplicationConfiguration;
use secret_santa_api::observability;
use secret_santa_api::startup::startup;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init dotenv
    dotenvy::dotenv().ok();

    let configuration = ApplicationConfiguration::from_env()?;

    let subscriber = observability::get_subscriber("secret_santa", &configuration.telemetry);
    observability::init_subscriber(subscriber)?;

    let postgres_connection = init_postgres_connection(&configuration.database_url).await?;
    run_migrations(&postgres_connection).await?;

    let listener = TcpListener::bind(configuration.listen_on)?;
    tracing::info!("Listening on {}", configuration.listen_on);

    let result = startup(postgres_connection, configuration, listener).await;
    observability::shutdown_telemetry();

    result
}
