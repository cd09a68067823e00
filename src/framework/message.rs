//! # Generic Messages
//!
//! This module defines the message types exchanged between a
//! [`ResourceClient`](crate::framework::ResourceClient) and a
//! [`ResourceActor`](crate::framework::ResourceActor).

use crate::framework::entity::ActorEntity;
use crate::framework::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Predicate evaluated inside the actor for `Query` requests.
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// A stored record together with its version stamp.
///
/// The version starts at 1 on insert and increases by one on every accepted
/// `Put` or `Action`. Conditional writes compare against it.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub version: u64,
    pub record: T,
}

/// Internal message type sent to the actor to request operations.
///
/// # Record store semantics
/// - **Get**: point read by id.
/// - **Insert**: put-if-not-exists. Fails with `AlreadyExists`.
/// - **Put**: put-if-version-matches. Fails with `VersionConflict` when the
///   stored version differs from `expected_version`, `NotFound` when absent.
/// - **Query**: every record matching the filter, in unspecified order.
/// - **Action**: atomic read-modify-write through
///   [`ActorEntity::handle_action`].
pub enum ResourceRequest<T: ActorEntity> {
    Get {
        id: T::Id,
        respond_to: Response<Option<Versioned<T>>>,
    },
    Insert {
        record: T,
        respond_to: Response<Versioned<T>>,
    },
    Put {
        record: T,
        expected_version: u64,
        respond_to: Response<Versioned<T>>,
    },
    Query {
        filter: Filter<T>,
        respond_to: Response<Vec<Versioned<T>>>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<(T::ActionResult, Versioned<T>)>,
    },
}

impl<T: ActorEntity> ResourceRequest<T> {
    /// Short name of the request, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Get { .. } => "Get",
            Self::Insert { .. } => "Insert",
            Self::Put { .. } => "Put",
            Self::Query { .. } => "Query",
            Self::Action { .. } => "Action",
        }
    }
}
