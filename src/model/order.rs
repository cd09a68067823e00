//! Orders and their status lifecycle.

use super::{Cents, CustomerId, OrderId, ProductId, StallDayKey, StallId};
use crate::order_actor::OrderError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an order.
///
/// ```text
/// pending        -> confirmed | cancelled
/// confirmed      -> in_preparation | cancelled
/// in_preparation -> ready | completed
/// ready          -> completed
/// ```
///
/// `completed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InPreparation,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::InPreparation,
        Self::Ready,
        Self::Completed,
        Self::Cancelled,
    ];

    /// States reachable in one step from `self`.
    pub fn next_states(self) -> &'static [OrderStatus] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Cancelled],
            Self::Confirmed => &[Self::InPreparation, Self::Cancelled],
            Self::InPreparation => &[Self::Ready, Self::Completed],
            Self::Ready => &[Self::Completed],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.next_states().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.next_states().is_empty()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InPreparation => "in_preparation",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: OrderStatus,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Cents,
    pub line_total: Cents,
    pub instructions: Option<String>,
}

/// An assembled order.
///
/// Items, pricing and the customer/stall association are fixed at assembly.
/// Status only moves through [`Order::transition`], which appends to the
/// history and never rewrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub stall_id: StallId,
    pub items: Vec<OrderItem>,
    pub subtotal: Cents,
    pub tax: Cents,
    pub total: Cents,
    /// ISO currency code stamped at assembly. Never converted.
    pub currency: String,
    pub requested_time: DateTime<Utc>,
    /// Calendar day of `requested_time` in the stall's time zone.
    pub service_day: NaiveDate,
    pub instructions: Option<String>,
    status: OrderStatus,
    history: Vec<StatusEntry>,
    pub created_at: DateTime<Utc>,
}

/// The parts of an order fixed by the assembler.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer_id: CustomerId,
    pub stall_id: StallId,
    pub items: Vec<OrderItem>,
    pub subtotal: Cents,
    pub tax: Cents,
    pub total: Cents,
    pub currency: String,
    pub requested_time: DateTime<Utc>,
    pub service_day: NaiveDate,
    pub instructions: Option<String>,
}

impl Order {
    /// A `pending` order whose history holds a single `pending` entry stamped
    /// `created_at`.
    pub fn create(draft: OrderDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id: OrderId::new(),
            customer_id: draft.customer_id,
            stall_id: draft.stall_id,
            items: draft.items,
            subtotal: draft.subtotal,
            tax: draft.tax,
            total: draft.total,
            currency: draft.currency,
            requested_time: draft.requested_time,
            service_day: draft.service_day,
            instructions: draft.instructions,
            status: OrderStatus::Pending,
            history: vec![StatusEntry {
                status: OrderStatus::Pending,
                at: created_at,
            }],
            created_at,
        }
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Status history, oldest first.
    pub fn history(&self) -> &[StatusEntry] {
        &self.history
    }

    /// The capacity ledger slot this order occupies.
    pub fn slot(&self) -> StallDayKey {
        StallDayKey {
            stall_id: self.stall_id,
            day: self.service_day,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }

    /// Moves the order to `next`, appending a history entry stamped `at`.
    ///
    /// `expected`, when given, must equal the current status. Nothing changes
    /// on error.
    pub fn transition(
        &mut self,
        next: OrderStatus,
        expected: Option<OrderStatus>,
        at: DateTime<Utc>,
    ) -> Result<OrderStatus, OrderError> {
        let current = self.status;
        if let Some(expected) = expected {
            if expected != current {
                return Err(OrderError::StaleStatus {
                    order_id: self.id,
                    expected,
                    actual: current,
                });
            }
        }
        if !current.can_transition_to(next) {
            return Err(OrderError::IllegalTransition {
                order_id: self.id,
                from: current,
                to: next,
            });
        }
        if let Some(last) = self.history.last() {
            if at < last.at {
                return Err(OrderError::HistoryOutOfOrder {
                    order_id: self.id,
                    last: last.at,
                    attempted: at,
                });
            }
        }

        self.history.push(StatusEntry { status: next, at });
        self.status = next;
        Ok(current)
    }
}
