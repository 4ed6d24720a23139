use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;

use crate::model::{NewParticipant, Participant};
use crate::services::ServiceError;

/// Where the participants end up
#[async_trait]
pub trait ParticipantStore: Send + Sync {
    async fn insert(&self, participant: &NewParticipant) -> Result<Participant, ServiceError>;
}

#[derive(Clone)]
pub struct PostgresParticipantStore {
    db: PgPool,
}

impl PostgresParticipantStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ParticipantStore for PostgresParticipantStore {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn insert(&self, participant: &NewParticipant) -> Result<Participant, ServiceError> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            INSERT INTO participants (name, address, email) VALUES ($1, $2, $3)
            RETURNING id, name, registration_timestamp
            "#,
        )
        .bind(&participant.name)
        .bind(participant.address.expose_secret())
        .bind(participant.email.expose_secret())
        .fetch_one(&self.db)
        .await?;

        Ok(participant)
    }
}

#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn ParticipantStore>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn ParticipantStore>) -> Self {
        Self { store }
    }

    /// Save a new participant. Submitting the same person twice registers them twice.
    #[tracing::instrument(skip(self))]
    pub async fn register(&self, participant: NewParticipant) -> Result<Participant, ServiceError> {
        let participant = self.store.insert(&participant).await?;
        tracing::info!(participant_id = participant.id, "New participant registered");

        Ok(participant)
    }
}
