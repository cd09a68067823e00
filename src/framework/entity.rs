//! # ActorEntity Trait
//!
//! The `ActorEntity` trait is the contract every stored record (Cart, Order,
//! Product, Stall, StallDayLedger) implements to be managed by the generic
//! [`ResourceActor`](crate::framework::ResourceActor).
//!
//! Records carry their own identity (`id()`), so the store never invents keys.
//! Everything that mutates a record in place, under the actor's exclusive
//! ownership, goes through [`ActorEntity::handle_action`]. Whole-record
//! replacement goes through the versioned `Put` request instead.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any record must implement to be managed by `ResourceActor`.
///
/// # Associated types
/// - `Id`: the store key. It is also what appears in log lines.
/// - `Action` / `ActionResult`: record-specific atomic operations
///   (e.g. `OrderAction::Transition`, `LedgerAction::Reserve`).
/// - `Error`: the per-record error type. One enum per record keeps client code
///   matching on a single type.
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this record.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// Enum representing record-specific atomic operations.
    type Action: Send + Sync + Debug;

    /// The result type returned by actions.
    type ActionResult: Send + Sync + Debug;

    /// The error type for this record.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The store key of this record.
    fn id(&self) -> Self::Id;

    /// Initial value for an action addressed to an id that has no record yet.
    ///
    /// Returning `None` (the default) makes such actions fail with `NotFound`.
    fn seed(_id: &Self::Id) -> Option<Self> {
        None
    }

    /// Handle a record-specific action.
    ///
    /// On `Err` the store discards every change the handler made, so
    /// implementations may mutate `self` before deciding to fail.
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}
