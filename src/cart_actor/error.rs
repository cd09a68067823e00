//! Error types for the Cart actor.

use crate::model::{CartId, Cents, ItemKey};
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    /// The cart id does not name the customer's live cart.
    #[error("Cart not found: {0}")]
    CartNotFound(CartId),

    /// The cart has passed its expiry and can no longer be used.
    #[error("Cart expired: {0}")]
    CartExpired(CartId),

    /// No cart is stored for the customer.
    #[error("No cart stored for customer {0}")]
    NoCart(String),

    /// Another cart was stored for the customer first.
    #[error("Cart already exists for customer {0}")]
    AlreadyExists(String),

    /// The stored cart changed since it was read.
    #[error("Cart for customer {customer} changed: expected version {expected}, found {actual}")]
    Conflict {
        customer: String,
        expected: u64,
        actual: u64,
    },

    #[error("Invalid quantity {quantity}: must be between 1 and {max}")]
    InvalidQuantity { quantity: i64, max: u32 },

    #[error("Invalid unit price: {0}")]
    InvalidPrice(Cents),

    /// Merging into an existing line would pass the per-item cap.
    #[error("Item limit exceeded for {key}: {requested} requested, maximum is {max}")]
    ItemLimitExceeded {
        key: ItemKey,
        requested: u32,
        max: u32,
    },

    #[error("Item not in cart: {0}")]
    ItemNotFound(ItemKey),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
