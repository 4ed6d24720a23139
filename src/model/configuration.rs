use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use secrecy::Secret;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("{0} environment variable is mandatory")]
    Missing(&'static str),
    #[error("{name} environment variable is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// # Application configuration
#[derive(Debug, Clone)]
pub struct ApplicationConfiguration {
    /// Address the HTTP server listens on
    pub listen_on: SocketAddr,
    pub database_url: Secret<String>,
    /// Directory of the frontend, served on `/`
    pub static_dir: PathBuf,
    /// Registration deadline. November 1st of the current year when not set.
    pub deadline: Option<DateTime<Utc>>,
    pub rate_limiting: RateLimitingConfiguration,
    pub telemetry: TelemetryConfiguration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitingConfiguration {
    /// Seconds needed to replenish one request
    pub fill_rate: u64,
    pub bucket_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfiguration {
    /// `EnvFilter` directives, `RUST_LOG` syntax
    pub log_filter: String,
    /// Where spans are exported, if anywhere
    pub exporter: Option<TelemetryExporter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryExporter {
    Datadog { agent_endpoint: String },
    Jaeger,
}

impl ApplicationConfiguration {
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigurationError> {
        let database_url = lookup("DATABASE_URL")
            .map(Secret::new)
            .ok_or(ConfigurationError::Missing("DATABASE_URL"))?;

        let listen_on = parse(
            "SECRET_SANTA_LISTEN_ON",
            lookup("SECRET_SANTA_LISTEN_ON").unwrap_or_else(|| "0.0.0.0:8080".to_owned()),
        )?;

        let static_dir = lookup("SECRET_SANTA_STATIC_DIR")
            .unwrap_or_else(|| "./static/".to_owned())
            .into();

        let deadline = lookup("SECRET_SANTA_DEADLINE")
            .map(|value| {
                DateTime::parse_from_rfc3339(&value)
                    .map(|deadline| deadline.with_timezone(&Utc))
                    .map_err(|e| ConfigurationError::Invalid {
                        name: "SECRET_SANTA_DEADLINE",
                        reason: e.to_string(),
                    })
            })
            .transpose()?;

        let rate_limiting = RateLimitingConfiguration {
            fill_rate: parse(
                "RATE_LIMITING_FILL_RATE",
                lookup("RATE_LIMITING_FILL_RATE").unwrap_or_else(|| "10".to_owned()),
            )?,
            bucket_size: parse(
                "RATE_LIMITING_BUCKET_SIZE",
                lookup("RATE_LIMITING_BUCKET_SIZE").unwrap_or_else(|| "100".to_owned()),
            )?,
        };

        Ok(ApplicationConfiguration {
            listen_on,
            database_url,
            static_dir,
            deadline,
            rate_limiting,
            telemetry: TelemetryConfiguration::from_lookup(&lookup),
        })
    }
}

impl TelemetryConfiguration {
    // Datadog wins when both exporters are enabled
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let exporter = if lookup("DD_ENABLED").is_some() {
            Some(TelemetryExporter::Datadog {
                agent_endpoint: lookup("DD_AGENT")
                    .unwrap_or_else(|| "http://127.0.0.1:8126".to_owned()),
            })
        } else if lookup("JAEGER_ENABLED").is_some() {
            Some(TelemetryExporter::Jaeger)
        } else {
            None
        };

        TelemetryConfiguration {
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| "info".to_owned()),
            exporter,
        }
    }
}

fn parse<T>(name: &'static str, value: String) -> Result<T, ConfigurationError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigurationError::Invalid {
        name,
        reason: e.to_string(),
    })
}
