//! Read-only catalog lookups used by the validators.

use crate::clients::{ProductClient, StallClient};
use crate::framework::ActorClient;
use crate::model::{Product, ProductId, Stall, StallId};
use crate::product_actor::ProductError;
use crate::stall_actor::StallError;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

impl From<ProductError> for CatalogError {
    fn from(e: ProductError) -> Self {
        CatalogError::Unavailable(e.to_string())
    }
}

impl From<StallError> for CatalogError {
    fn from(e: StallError) -> Self {
        CatalogError::Unavailable(e.to_string())
    }
}

/// Product and stall lookups. An absent record is `Ok(None)`; `Err` is
/// reserved for an unreachable catalog.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError>;
    async fn get_stall(&self, id: StallId) -> Result<Option<Stall>, CatalogError>;
}

/// Catalog backed by the in-process product and stall stores.
#[derive(Clone)]
pub struct StoreCatalog {
    products: ProductClient,
    stalls: StallClient,
}

impl StoreCatalog {
    pub fn new(products: ProductClient, stalls: StallClient) -> Self {
        Self { products, stalls }
    }
}

#[async_trait]
impl CatalogGateway for StoreCatalog {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self.products.get(id).await?)
    }

    async fn get_stall(&self, id: StallId) -> Result<Option<Stall>, CatalogError> {
        Ok(self.stalls.get(id).await?)
    }
}
