use crate::cart_actor::CartError;
use crate::framework::{ActorClient, FrameworkError, ResourceClient, Versioned};
use crate::model::{Cart, CustomerId};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for the cart store.
///
/// Exposes the versioned reads and conditional writes the cart manager builds
/// its retry loop on.
#[derive(Clone)]
pub struct CartClient {
    inner: ResourceClient<Cart>,
}

impl CartClient {
    pub fn new(inner: ResourceClient<Cart>) -> Self {
        Self { inner }
    }

    /// The customer's stored cart with its version, expired or not.
    #[instrument(skip(self))]
    pub async fn load(&self, customer_id: CustomerId) -> Result<Option<Versioned<Cart>>, CartError> {
        debug!("Sending request");
        self.inner.get(customer_id).await.map_err(Self::map_error)
    }

    /// Stores a cart for a customer who has none.
    #[instrument(skip(self, cart), fields(customer_id = %cart.customer_id, cart_id = %cart.id))]
    pub async fn create(&self, cart: Cart) -> Result<Versioned<Cart>, CartError> {
        debug!("Sending request");
        self.inner.insert(cart).await.map_err(Self::map_error)
    }

    /// Replaces the stored cart if it is still at `expected_version`.
    #[instrument(skip(self, cart), fields(customer_id = %cart.customer_id, cart_id = %cart.id))]
    pub async fn save(&self, cart: Cart, expected_version: u64) -> Result<Versioned<Cart>, CartError> {
        debug!("Sending request");
        self.inner
            .put(cart, expected_version)
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<Cart> for CartClient {
    type Error = CartError;

    fn inner(&self) -> &ResourceClient<Cart> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::VersionConflict {
                id,
                expected,
                actual,
            } => CartError::Conflict {
                customer: id,
                expected,
                actual,
            },
            FrameworkError::AlreadyExists(id) => CartError::AlreadyExists(id),
            FrameworkError::NotFound(id) => CartError::NoCart(id),
            other => other
                .into_entity_error::<CartError>()
                .unwrap_or_else(|e| CartError::ActorCommunicationError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{create_mock_client, expect_put};
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_save_maps_version_conflict() {
        let (client, mut receiver) = create_mock_client::<Cart>(10);
        let cart_client = CartClient::new(client);
        let cart = Cart::new(CustomerId::new(), Utc::now(), Duration::hours(24));

        let save_task = tokio::spawn(async move { cart_client.save(cart, 3).await });

        let (record, expected_version, responder) =
            expect_put(&mut receiver).await.expect("Expected Put request");
        assert_eq!(expected_version, 3);
        responder
            .send(Err(FrameworkError::VersionConflict {
                id: record.customer_id.to_string(),
                expected: 3,
                actual: 4,
            }))
            .unwrap();

        let result = save_task.await.unwrap();
        assert!(matches!(
            result,
            Err(CartError::Conflict { expected: 3, actual: 4, .. })
        ));
    }

    #[tokio::test]
    async fn test_closed_store_is_communication_error() {
        let (client, receiver) = create_mock_client::<Cart>(10);
        drop(receiver);

        let result = CartClient::new(client).load(CustomerId::new()).await;
        assert!(matches!(result, Err(CartError::ActorCommunicationError(_))));
    }
}
