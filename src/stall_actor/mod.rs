//! Stall storage for the in-process catalog.

pub mod entity;
pub mod error;

pub use entity::StallAction;
pub use error::*;

use crate::clients::StallClient;
use crate::framework::ResourceActor;
use crate::model::Stall;

/// Creates a new Stall actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Stall>, StallClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, StallClient::new(generic_client))
}
