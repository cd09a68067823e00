//! # Availability Validator
//!
//! Checks each requested line against the catalog: existence, status, owning
//! stall, stock and price. Findings are reported per line, in line order.
//! Stock is compared with the total quantity of a product over all lines, so
//! splitting a product across pickup times cannot oversell it.

use crate::clients::CatalogGateway;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::model::{
    CartItem, Cents, Product, ProductId, StallId, ValidationIssue, ValidationResult, ValidationWarning,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

/// A line as submitted for validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineItem {
    pub product_id: ProductId,
    pub stall_id: StallId,
    pub quantity: u32,
    pub unit_price: Cents,
}

impl From<&CartItem> for LineItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            stall_id: item.stall_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

#[derive(Clone)]
pub struct AvailabilityValidator {
    catalog: Arc<dyn CatalogGateway>,
    config: Arc<EngineConfig>,
}

impl AvailabilityValidator {
    pub fn new(catalog: Arc<dyn CatalogGateway>, config: Arc<EngineConfig>) -> Self {
        Self { catalog, config }
    }

    /// Checks every line. Stock is checked against the total requested for a
    /// product across all lines, reported once on the product's first line.
    #[instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn validate(&self, items: &[LineItem]) -> Result<ValidationResult, EngineError> {
        let mut requested: HashMap<ProductId, u64> = HashMap::new();
        for item in items {
            *requested.entry(item.product_id).or_default() += u64::from(item.quantity);
        }

        let mut catalog: HashMap<ProductId, Option<Product>> = HashMap::new();
        let mut stock_checked: HashSet<ProductId> = HashSet::new();
        let mut result = ValidationResult::new();
        for item in items {
            let product = match catalog.get(&item.product_id) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.catalog.get_product(item.product_id).await?;
                    catalog.insert(item.product_id, fetched.clone());
                    fetched
                }
            };
            let total = if stock_checked.insert(item.product_id) {
                requested.get(&item.product_id).copied()
            } else {
                None
            };
            self.check(item, product.as_ref(), total, &mut result);
        }
        debug!(valid = result.is_valid(), warnings = result.warnings.len(), "Availability checked");
        Ok(result)
    }

    /// `total` is the product's summed quantity when this line carries the
    /// stock check, `None` on later lines of the same product.
    fn check(&self, item: &LineItem, product: Option<&Product>, total: Option<u64>, result: &mut ValidationResult) {
        let product_id = item.product_id;
        let Some(product) = product else {
            result.error(ValidationIssue::ProductNotFound { product_id });
            return;
        };
        if !product.is_active() {
            result.error(ValidationIssue::ProductUnavailable {
                product_id,
                status: product.status,
            });
            return;
        }

        if product.stall_id != item.stall_id {
            result.error(ValidationIssue::StallMismatch {
                product_id,
                declared: item.stall_id,
                actual: product.stall_id,
            });
        }
        let stock = u64::from(product.stock);
        if let Some(total) = total {
            if stock < total {
                result.error(ValidationIssue::InsufficientInventory {
                    product_id,
                    available: product.stock,
                    requested: u32::try_from(total).unwrap_or(u32::MAX),
                });
            }
        }
        if item.unit_price != product.unit_price {
            result.error(ValidationIssue::PriceMismatch {
                product_id,
                submitted: item.unit_price,
                current: product.unit_price,
            });
        }

        if let Some(total) = total.filter(|total| *total <= stock) {
            let remaining = stock - total;
            let floor = u64::from(self.config.low_inventory_factor) * total;
            if remaining <= floor {
                result.warn(ValidationWarning::LowInventory {
                    product_id,
                    remaining: u32::try_from(remaining).unwrap_or(u32::MAX),
                });
            }
        }
        if item.quantity > self.config.large_quantity_threshold {
            result.warn(ValidationWarning::LargeQuantity {
                product_id,
                quantity: item.quantity,
            });
        }
    }
}
