//! ActorEntity implementation for [`Product`].
//!
//! The engine only reads products. The actions below exist for whoever
//! maintains the catalog (and for tests that need a product to go stale).

use super::ProductError;
use crate::framework::ActorEntity;
use crate::model::{Cents, Product, ProductId, ProductStatus};

/// Catalog maintenance operations on a product.
#[derive(Debug, Clone)]
pub enum ProductAction {
    SetStatus(ProductStatus),
    SetPrice(Cents),
    SetStock(u32),
}

impl ActorEntity for Product {
    type Id = ProductId;
    type Action = ProductAction;
    type ActionResult = ();
    type Error = ProductError;

    fn id(&self) -> ProductId {
        self.id
    }

    fn handle_action(&mut self, action: ProductAction) -> Result<(), ProductError> {
        match action {
            ProductAction::SetStatus(status) => self.status = status,
            ProductAction::SetPrice(price) => self.unit_price = price,
            ProductAction::SetStock(stock) => self.stock = stock,
        }
        Ok(())
    }
}
