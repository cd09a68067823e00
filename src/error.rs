//! Caller-facing error type.
//!
//! Validation findings are not errors: they come back inside
//! [`OrderPlacement::Rejected`](crate::orders::OrderPlacement). `EngineError`
//! covers requests the engine could not carry out, split into caller
//! mistakes (bad cart id, illegal transition) and infrastructure trouble
//! worth retrying.

use crate::cart_actor::CartError;
use crate::clients::CatalogError;
use crate::ledger_actor::LedgerError;
use crate::order_actor::OrderError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Conditional writes kept losing to concurrent writers.
    #[error("Write contention on {target}: gave up after {attempts} attempts")]
    Contention { target: String, attempts: u32 },

    #[error("Amount overflow while pricing order")]
    AmountOverflow,
}

impl EngineError {
    /// True when the same request may succeed if simply tried again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Contention { .. } | Self::Catalog(_) => true,
            Self::Cart(e) => matches!(
                e,
                CartError::Conflict { .. } | CartError::ActorCommunicationError(_)
            ),
            Self::Order(e) => matches!(e, OrderError::ActorCommunicationError(_)),
            Self::Ledger(e) => matches!(e, LedgerError::ActorCommunicationError(_)),
            Self::AmountOverflow => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OrderId, OrderStatus};

    #[test]
    fn infrastructure_errors_are_retryable() {
        let contention = EngineError::Contention {
            target: "cart".into(),
            attempts: 5,
        };
        assert!(contention.is_retryable());
        assert!(EngineError::from(CartError::ActorCommunicationError("closed".into())).is_retryable());
    }

    #[test]
    fn caller_errors_are_not_retryable() {
        let illegal = EngineError::from(OrderError::IllegalTransition {
            order_id: OrderId::new(),
            from: OrderStatus::Completed,
            to: OrderStatus::Pending,
        });
        assert!(!illegal.is_retryable());
    }
}
