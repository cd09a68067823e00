use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{Order, OrderId, OrderStatus, StallId};
use crate::order_actor::{OrderAction, OrderError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info, instrument};

/// Client for interacting with the Order store.
///
/// Orders are written once with [`OrderClient::insert`] and afterwards only
/// change through [`OrderClient::transition`].
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn insert(&self, order: Order) -> Result<Order, OrderError> {
        debug!(?order, "insert called");
        info!("Sending insert to actor");
        self.inner
            .insert(order)
            .await
            .map(|stored| stored.record)
            .map_err(Self::map_error)
    }

    /// Applies a status transition atomically. Returns the previous status
    /// and the updated order.
    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        id: OrderId,
        to: OrderStatus,
        expected: Option<OrderStatus>,
        at: DateTime<Utc>,
    ) -> Result<(OrderStatus, Order), OrderError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, OrderAction::Transition { to, expected, at })
            .await
            .map(|(previous, stored)| (previous, stored.record))
            .map_err(Self::map_error)
    }

    /// Non-cancelled orders for `stall_id` booked on the stall-local `day`.
    #[instrument(skip(self))]
    pub async fn orders_for_stall_day(&self, stall_id: StallId, day: NaiveDate) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        self.inner
            .query(move |order: &Order| {
                order.stall_id == stall_id && order.service_day == day && !order.is_cancelled()
            })
            .await
            .map(|found| found.into_iter().map(|stored| stored.record).collect())
            .map_err(Self::map_error)
    }

    /// Non-cancelled orders for `stall_id` requested within `window` of `at`,
    /// bounds included.
    #[instrument(skip(self))]
    pub async fn orders_near(
        &self,
        stall_id: StallId,
        at: DateTime<Utc>,
        window: Duration,
    ) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        self.inner
            .query(move |order: &Order| {
                order.stall_id == stall_id
                    && !order.is_cancelled()
                    && (order.requested_time - at).abs() <= window
            })
            .await
            .map(|found| found.into_iter().map(|stored| stored.record).collect())
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::AlreadyExists(id) => OrderError::AlreadyExists(id),
            other => other
                .into_entity_error::<OrderError>()
                .unwrap_or_else(|e| OrderError::ActorCommunicationError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{create_mock_client, expect_action};

    #[tokio::test]
    async fn test_transition_recovers_typed_error() {
        let (client, mut receiver) = create_mock_client::<Order>(10);
        let order_client = OrderClient::new(client);
        let order_id = OrderId::new();
        let at = Utc::now();

        let transition_task = tokio::spawn(async move {
            order_client
                .transition(order_id, OrderStatus::Pending, None, at)
                .await
        });

        let (id, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert_eq!(id, order_id);
        assert!(matches!(
            action,
            OrderAction::Transition { to: OrderStatus::Pending, expected: None, .. }
        ));

        let rejected = OrderError::IllegalTransition {
            order_id,
            from: OrderStatus::Completed,
            to: OrderStatus::Pending,
        };
        responder
            .send(Err(FrameworkError::EntityError(Box::new(rejected.clone()))))
            .unwrap();

        let result = transition_task.await.unwrap();
        assert_eq!(result.unwrap_err(), rejected);
    }

    #[tokio::test]
    async fn test_missing_order_maps_to_not_found() {
        let (client, mut receiver) = create_mock_client::<Order>(10);
        let order_client = OrderClient::new(client);
        let order_id = OrderId::new();

        let transition_task = tokio::spawn(async move {
            order_client
                .transition(order_id, OrderStatus::Confirmed, None, Utc::now())
                .await
        });

        let (_, _, responder) = expect_action(&mut receiver).await.unwrap();
        responder
            .send(Err(FrameworkError::NotFound(order_id.to_string())))
            .unwrap();

        let result = transition_task.await.unwrap();
        assert_eq!(result.unwrap_err(), OrderError::NotFound(order_id.to_string()));
    }
}
