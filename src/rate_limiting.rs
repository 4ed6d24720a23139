use std::net::IpAddr;

use actix_governor::governor::middleware::StateInformationMiddleware;
use actix_governor::{
    GovernorConfig, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError,
};
use actix_web::dev::ServiceRequest;

use crate::model::configuration::{ConfigurationError, RateLimitingConfiguration};

/// Registrations are anonymous, so clients are told apart by their address
#[derive(Clone)]
pub struct ClientIp;

impl KeyExtractor for ClientIp {
    type Key = IpAddr;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        req.peer_addr()
            .map(|x| x.ip())
            .ok_or_else(|| SimpleKeyExtractionError::new("Can't extract client address"))
    }
}

pub fn build_rate_limiting_conf(
    settings: &RateLimitingConfiguration,
) -> Result<GovernorConfig<ClientIp, StateInformationMiddleware>, ConfigurationError> {
    GovernorConfigBuilder::default()
        .per_second(settings.fill_rate)
        .burst_size(settings.bucket_size)
        .key_extractor(ClientIp)
        .use_headers()
        .finish()
        .ok_or_else(|| ConfigurationError::Invalid {
            name: "RATE_LIMITING_FILL_RATE/RATE_LIMITING_BUCKET_SIZE",
            reason: "both must be greater than zero".to_owned(),
        })
}
