//! # Generic Actor Server
//!
//! This module defines the `ResourceActor`, the record store behind every
//! client in the engine. It implements the "Server" side of the Actor Model,
//! processing messages sequentially and owning its map of versioned records.

use crate::framework::client::ResourceClient;
use crate::framework::entity::ActorEntity;
use crate::framework::error::FrameworkError;
use crate::framework::message::{ResourceRequest, Versioned};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of versioned records.
///
/// # Concurrency Model
/// Each actor processes its messages *sequentially*. A conditional write is
/// therefore compared and applied without any other request interleaving, which
/// is what makes `Insert`, `Put` and `Action` atomic with no `Mutex` around the
/// store. Callers see concurrency only as version conflicts on `Put`.
///
/// # Operations
///
/// * **Get**: clone of the stored record, or `None`.
/// * **Insert**: stores the record at version 1 unless the id is taken.
/// * **Put**: replaces the record when `expected_version` matches, bumping the
///   version.
/// * **Query**: clones of every record accepted by the filter.
/// * **Action**: runs [`ActorEntity::handle_action`] on a working copy. The
///   copy replaces the stored record only when the handler succeeds. Missing
///   ids fall back to [`ActorEntity::seed`].
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, Versioned<T>>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the capacity of the mailbox. When it is full, client
    /// calls wait for space.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Runs the actor's event loop, processing messages until every client
    /// has been dropped.
    pub async fn run(mut self) {
        // Extract just the type name (e.g., "Cart" instead of "order_engine::model::cart::Cart")
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            debug!(entity_type, request = msg.kind(), "Request");
            match msg {
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Insert { record, respond_to } => {
                    let id = record.id();
                    if self.store.contains_key(&id) {
                        warn!(entity_type, %id, "Insert rejected, id taken");
                        let _ = respond_to.send(Err(FrameworkError::AlreadyExists(id.to_string())));
                        continue;
                    }
                    let stored = Versioned { version: 1, record };
                    self.store.insert(id.clone(), stored.clone());
                    info!(entity_type, %id, size = self.store.len(), "Inserted");
                    let _ = respond_to.send(Ok(stored));
                }
                ResourceRequest::Put {
                    record,
                    expected_version,
                    respond_to,
                } => {
                    let id = record.id();
                    let result = match self.store.get_mut(&id) {
                        None => Err(FrameworkError::NotFound(id.to_string())),
                        Some(current) if current.version != expected_version => {
                            warn!(
                                entity_type,
                                %id,
                                expected_version,
                                actual = current.version,
                                "Put rejected, stale version"
                            );
                            Err(FrameworkError::VersionConflict {
                                id: id.to_string(),
                                expected: expected_version,
                                actual: current.version,
                            })
                        }
                        Some(current) => {
                            current.version += 1;
                            current.record = record;
                            debug!(entity_type, %id, version = current.version, "Put");
                            Ok(current.clone())
                        }
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Query { filter, respond_to } => {
                    let matches: Vec<Versioned<T>> = self
                        .store
                        .values()
                        .filter(|stored| filter(&stored.record))
                        .cloned()
                        .collect();
                    debug!(entity_type, matched = matches.len(), "Query");
                    let _ = respond_to.send(Ok(matches));
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let result = self.apply_action(&id, action);
                    match &result {
                        Ok(_) => info!(entity_type, %id, "Action ok"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Action failed"),
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }

    fn apply_action(
        &mut self,
        id: &T::Id,
        action: T::Action,
    ) -> Result<(T::ActionResult, Versioned<T>), FrameworkError> {
        let (mut working, version) = match self.store.get(id) {
            Some(stored) => (stored.record.clone(), stored.version),
            None => match T::seed(id) {
                Some(seeded) => (seeded, 0),
                None => return Err(FrameworkError::NotFound(id.to_string())),
            },
        };

        let outcome = working
            .handle_action(action)
            .map_err(|e| FrameworkError::EntityError(Box::new(e)))?;

        let stored = Versioned {
            version: version + 1,
            record: working,
        };
        self.store.insert(id.clone(), stored.clone());
        Ok((outcome, stored))
    }
}
