//! Per-(stall, day) capacity ledgers.

pub mod entity;
pub mod error;

pub use entity::LedgerAction;
pub use error::*;

use crate::clients::LedgerClient;
use crate::framework::ResourceActor;
use crate::model::StallDayLedger;

/// Creates a new ledger actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<StallDayLedger>, LedgerClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, LedgerClient::new(generic_client))
}
