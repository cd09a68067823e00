//! ActorEntity implementation for [`Stall`].

use super::StallError;
use crate::framework::ActorEntity;
use crate::model::{Stall, StallId, StallStatus, WeeklyHours};

/// Catalog maintenance operations on a stall.
#[derive(Debug, Clone)]
pub enum StallAction {
    SetStatus(StallStatus),
    SetHours(WeeklyHours),
    SetCapacity(u32),
}

impl ActorEntity for Stall {
    type Id = StallId;
    type Action = StallAction;
    type ActionResult = ();
    type Error = StallError;

    fn id(&self) -> StallId {
        self.id
    }

    fn handle_action(&mut self, action: StallAction) -> Result<(), StallError> {
        match action {
            StallAction::SetStatus(status) => self.status = status,
            StallAction::SetHours(hours) => self.hours = hours,
            StallAction::SetCapacity(capacity) => self.capacity_per_day = capacity,
        }
        Ok(())
    }
}
