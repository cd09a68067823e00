//! Error types for the Order actor.

use crate::model::{OrderId, OrderStatus};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Order already exists: {0}")]
    AlreadyExists(String),

    /// The target status is not reachable from the current one.
    #[error("Illegal transition for {order_id}: {from} -> {to}")]
    IllegalTransition {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// The caller's view of the order's status is out of date.
    #[error("Stale status for {order_id}: expected {expected}, order is {actual}")]
    StaleStatus {
        order_id: OrderId,
        expected: OrderStatus,
        actual: OrderStatus,
    },

    /// The transition timestamp precedes the last history entry.
    #[error("History out of order for {order_id}: {attempted} is before {last}")]
    HistoryOutOfOrder {
        order_id: OrderId,
        last: DateTime<Utc>,
        attempted: DateTime<Utc>,
    },

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
