//! Error types for the capacity ledger.

use crate::model::StallDayKey;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LedgerError {
    /// Admitting one more order would pass the stall's daily capacity.
    #[error("Stall day {key} is full: capacity {capacity}")]
    CapacityExceeded { key: StallDayKey, capacity: u32 },

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
