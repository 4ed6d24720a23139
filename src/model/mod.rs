pub mod configuration;
pub mod participant;

pub use participant::{NewParticipant, Participant, RegistrationRequest};
