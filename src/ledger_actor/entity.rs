//! ActorEntity implementation for [`StallDayLedger`].
//!
//! Reservations are check-and-insert in a single action, so the capacity
//! check cannot be raced by concurrent order placement on the same day.
//! Ledgers are seeded empty on first use.

use super::LedgerError;
use crate::framework::ActorEntity;
use crate::model::{OrderId, StallDayKey, StallDayLedger};

#[derive(Debug, Clone)]
pub enum LedgerAction {
    /// Admit `order_id` unless the day already holds `capacity` orders.
    /// Zero capacity means unlimited. Re-reserving an admitted order is a
    /// no-op.
    Reserve { order_id: OrderId, capacity: u32 },
    /// Free the slot held by `order_id`, if any.
    Release { order_id: OrderId },
}

impl ActorEntity for StallDayLedger {
    type Id = StallDayKey;
    type Action = LedgerAction;
    /// Orders booked for the day after the action.
    type ActionResult = u32;
    type Error = LedgerError;

    fn id(&self) -> StallDayKey {
        self.key
    }

    fn seed(id: &StallDayKey) -> Option<Self> {
        Some(StallDayLedger::empty(*id))
    }

    fn handle_action(&mut self, action: LedgerAction) -> Result<u32, LedgerError> {
        match action {
            LedgerAction::Reserve { order_id, capacity } => {
                if !self.orders.contains(&order_id) && capacity > 0 && self.booked() >= capacity {
                    return Err(LedgerError::CapacityExceeded {
                        key: self.key,
                        capacity,
                    });
                }
                self.orders.insert(order_id);
            }
            LedgerAction::Release { order_id } => {
                self.orders.remove(&order_id);
            }
        }
        Ok(self.booked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StallId;
    use chrono::NaiveDate;

    fn ledger() -> StallDayLedger {
        StallDayLedger::empty(StallDayKey {
            stall_id: StallId::new(),
            day: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        })
    }

    #[test]
    fn reserve_stops_at_capacity() {
        let mut ledger = ledger();
        for _ in 0..2 {
            ledger
                .handle_action(LedgerAction::Reserve { order_id: OrderId::new(), capacity: 2 })
                .unwrap();
        }
        let err = ledger
            .handle_action(LedgerAction::Reserve { order_id: OrderId::new(), capacity: 2 })
            .unwrap_err();
        assert!(matches!(err, LedgerError::CapacityExceeded { capacity: 2, .. }));
        assert_eq!(ledger.booked(), 2);
    }

    #[test]
    fn zero_capacity_is_unlimited() {
        let mut ledger = ledger();
        for _ in 0..50 {
            ledger
                .handle_action(LedgerAction::Reserve { order_id: OrderId::new(), capacity: 0 })
                .unwrap();
        }
        assert_eq!(ledger.booked(), 50);
    }

    #[test]
    fn release_frees_a_slot_and_reserve_is_idempotent() {
        let mut ledger = ledger();
        let first = OrderId::new();
        ledger.handle_action(LedgerAction::Reserve { order_id: first, capacity: 1 }).unwrap();
        assert_eq!(
            ledger.handle_action(LedgerAction::Reserve { order_id: first, capacity: 1 }).unwrap(),
            1
        );

        ledger.handle_action(LedgerAction::Release { order_id: first }).unwrap();
        let booked = ledger
            .handle_action(LedgerAction::Reserve { order_id: OrderId::new(), capacity: 1 })
            .unwrap();
        assert_eq!(booked, 1);
    }
}
