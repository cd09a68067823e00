//! Order creation and lifecycle.

pub mod assembler;
mod service;

pub use assembler::{assemble, compute_tax, compute_totals, Totals};
pub use service::OrderService;

use crate::model::{Order, ValidationResult, ValidationWarning};

/// Outcome of an order placement request.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderPlacement {
    /// The order was stored and the cart cleared.
    Created {
        order: Order,
        warnings: Vec<ValidationWarning>,
    },
    /// Blocking findings. Nothing was written.
    Rejected(ValidationResult),
}

impl OrderPlacement {
    pub fn order(&self) -> Option<&Order> {
        match self {
            Self::Created { order, .. } => Some(order),
            Self::Rejected(_) => None,
        }
    }

    pub fn into_order(self) -> Option<Order> {
        match self {
            Self::Created { order, .. } => Some(order),
            Self::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&ValidationResult> {
        match self {
            Self::Rejected(result) => Some(result),
            Self::Created { .. } => None,
        }
    }
}
