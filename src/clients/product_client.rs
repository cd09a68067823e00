//! # Product Client
//!
//! Catalog-side API over the `Product` store: seeding and maintenance. The
//! engine itself reads products through [`CatalogGateway`](super::CatalogGateway).
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{Product, ProductId};
use crate::product_actor::{ProductAction, ProductError};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn create_product(&self, product: Product) -> Result<ProductId, ProductError> {
        debug!("Sending request");
        self.inner
            .insert(product)
            .await
            .map(|stored| stored.record.id)
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_product(&self, id: ProductId, action: ProductAction) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, action)
            .await
            .map(|((), stored)| stored.record)
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<Product> for ProductClient {
    type Error = ProductError;

    fn inner(&self) -> &ResourceClient<Product> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => ProductError::NotFound(id),
            FrameworkError::AlreadyExists(id) => ProductError::AlreadyExists(id),
            other => ProductError::ActorCommunicationError(other.to_string()),
        }
    }
}
