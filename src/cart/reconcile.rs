use super::CartManager;
use crate::cart_actor::CartError;
use crate::clients::{CatalogError, CatalogGateway};
use crate::error::EngineError;
use crate::model::{Cart, CartId, CartItem, CustomerId, ItemKey, ProductId, ProductStatus, StallId};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, instrument};

/// Why reconciliation dropped a line.
#[derive(Debug, Clone, PartialEq)]
pub enum RemovalReason {
    ProductNotFound,
    ProductUnavailable(ProductStatus),
    StallMismatch { actual: StallId },
    InsufficientStock { available: u32, requested: u32 },
    TimeInPast,
    BeyondHorizon,
}

impl fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProductNotFound => write!(f, "product no longer exists"),
            Self::ProductUnavailable(status) => write!(f, "product is {status}"),
            Self::StallMismatch { actual } => write!(f, "product is now sold by {actual}"),
            Self::InsufficientStock {
                available,
                requested,
            } => write!(f, "only {available} in stock, {requested} requested"),
            Self::TimeInPast => write!(f, "requested time has passed"),
            Self::BeyondHorizon => write!(f, "requested time is beyond the booking horizon"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemovedItem {
    pub key: ItemKey,
    pub reason: RemovalReason,
}

/// The cart after reconciliation and every line that was taken out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport {
    pub cart: Cart,
    pub removed: Vec<RemovedItem>,
}

impl CartManager {
    /// Re-checks every line against the catalog and the booking window, and
    /// removes the ones that can no longer be ordered. Lines of one product
    /// share its stock; earlier lines keep their claim first. Removed lines are
    /// reported with their reason so the caller can tell the customer.
    #[instrument(skip(self))]
    pub async fn reconcile(&self, customer_id: CustomerId, cart_id: CartId) -> Result<ReconcileReport, EngineError> {
        let attempts = self.config.write_attempts();
        let horizon = self.config.max_advance();
        for attempt in 1..=attempts {
            let stored = self.load_live(customer_id, cart_id).await?;
            let now = self.clock.now();

            let mut removed = Vec::new();
            let mut kept: HashMap<ProductId, u32> = HashMap::new();
            for item in stored.record.items() {
                let already = kept.get(&item.product_id).copied().unwrap_or(0);
                match removal_reason(self.catalog.as_ref(), item, already, now, horizon).await? {
                    None => *kept.entry(item.product_id).or_default() += item.quantity,
                    Some(reason) => {
                        debug!(key = %item.key(), %reason, "Dropping cart line");
                        removed.push(RemovedItem {
                            key: item.key(),
                            reason,
                        });
                    }
                }
            }
            if removed.is_empty() {
                return Ok(ReconcileReport {
                    cart: stored.record,
                    removed,
                });
            }

            let mut cart = stored.record;
            for line in &removed {
                cart.remove_item(&line.key, now);
            }
            match self.carts.save(cart, stored.version).await {
                Ok(saved) => {
                    info!(%cart_id, removed = removed.len(), "Cart reconciled");
                    return Ok(ReconcileReport {
                        cart: saved.record,
                        removed,
                    });
                }
                Err(CartError::Conflict { .. }) => {
                    debug!(%cart_id, attempt, "Cart changed during reconcile, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(self.contention(customer_id, attempts))
    }
}

/// `already` is the quantity of the same product on lines that are staying,
/// which the stock must cover as well.
async fn removal_reason(
    catalog: &dyn CatalogGateway,
    item: &CartItem,
    already: u32,
    now: DateTime<Utc>,
    horizon: Duration,
) -> Result<Option<RemovalReason>, CatalogError> {
    if let Some(at) = item.requested_time {
        if at <= now {
            return Ok(Some(RemovalReason::TimeInPast));
        }
        if at > now + horizon {
            return Ok(Some(RemovalReason::BeyondHorizon));
        }
    }

    let Some(product) = catalog.get_product(item.product_id).await? else {
        return Ok(Some(RemovalReason::ProductNotFound));
    };
    let reason = if !product.is_active() {
        Some(RemovalReason::ProductUnavailable(product.status))
    } else if product.stall_id != item.stall_id {
        Some(RemovalReason::StallMismatch {
            actual: product.stall_id,
        })
    } else if product.stock.saturating_sub(already) < item.quantity {
        Some(RemovalReason::InsufficientStock {
            available: product.stock.saturating_sub(already),
            requested: item.quantity,
        })
    } else {
        None
    };
    Ok(reason)
}
