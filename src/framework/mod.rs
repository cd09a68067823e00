//! # Record Store Framework
//!
//! A generic, versioned record store built on the actor model. Each record type
//! gets its own [`ResourceActor`] task; callers talk to it through a cloneable
//! [`ResourceClient`].
//!
//! The protocol is deliberately small: point reads, put-if-not-exists,
//! put-if-version-matches, filtered queries, and record-specific atomic actions.
//! Everything the engine needs from storage is expressed with those five.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{Filter, ResourceRequest, Response, Versioned};
