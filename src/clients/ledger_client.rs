use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::ledger_actor::{LedgerAction, LedgerError};
use crate::model::{OrderId, StallDayKey, StallDayLedger};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for the per-(stall, day) capacity ledgers.
#[derive(Clone)]
pub struct LedgerClient {
    inner: ResourceClient<StallDayLedger>,
}

impl LedgerClient {
    pub fn new(inner: ResourceClient<StallDayLedger>) -> Self {
        Self { inner }
    }

    /// Orders currently booked for the stall day.
    #[instrument(skip(self))]
    pub async fn booked(&self, key: StallDayKey) -> Result<u32, LedgerError> {
        debug!("Sending request");
        self.inner
            .get(key)
            .await
            .map(|found| found.map_or(0, |stored| stored.record.booked()))
            .map_err(Self::map_error)
    }

    /// Claims a slot for `order_id`. Fails with `CapacityExceeded` when the
    /// day is full.
    #[instrument(skip(self))]
    pub async fn reserve(&self, key: StallDayKey, order_id: OrderId, capacity: u32) -> Result<u32, LedgerError> {
        debug!("Sending request");
        self.inner
            .perform_action(key, LedgerAction::Reserve { order_id, capacity })
            .await
            .map(|(booked, _)| booked)
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn release(&self, key: StallDayKey, order_id: OrderId) -> Result<u32, LedgerError> {
        debug!("Sending request");
        self.inner
            .perform_action(key, LedgerAction::Release { order_id })
            .await
            .map(|(booked, _)| booked)
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<StallDayLedger> for LedgerClient {
    type Error = LedgerError;

    fn inner(&self) -> &ResourceClient<StallDayLedger> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.into_entity_error::<LedgerError>()
            .unwrap_or_else(|e| LedgerError::ActorCommunicationError(e.to_string()))
    }
}
