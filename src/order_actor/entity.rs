//! ActorEntity implementation for [`Order`].
//!
//! Orders are inserted once and afterwards only change through
//! [`OrderAction::Transition`], which the store applies atomically. Two
//! transitions racing on the same order are therefore serialized, and the
//! loser sees the winner's status.

use super::OrderError;
use crate::framework::ActorEntity;
use crate::model::{Order, OrderId, OrderStatus};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Move to `to`, stamped `at`. With `expected` set, fails with
    /// `StaleStatus` unless the order is currently in that state.
    Transition {
        to: OrderStatus,
        expected: Option<OrderStatus>,
        at: DateTime<Utc>,
    },
}

impl ActorEntity for Order {
    type Id = OrderId;
    type Action = OrderAction;
    /// The status the order had before the action.
    type ActionResult = OrderStatus;
    type Error = OrderError;

    fn id(&self) -> OrderId {
        self.id
    }

    fn handle_action(&mut self, action: OrderAction) -> Result<OrderStatus, OrderError> {
        match action {
            OrderAction::Transition { to, expected, at } => self.transition(to, expected, at),
        }
    }
}
