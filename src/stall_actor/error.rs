//! Error types for the Stall actor.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StallError {
    #[error("Stall not found: {0}")]
    NotFound(String),

    #[error("Stall already exists: {0}")]
    AlreadyExists(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
