//! # Cart Manager
//!
//! Owns the customer's pre-order basket. Every mutation is a read, a pure edit
//! on the copy, and a conditional write against the version that was read. A
//! write that loses to a concurrent writer is retried from a fresh read, up to
//! [`EngineConfig::write_retries`](crate::config::EngineConfig) attempts.

mod reconcile;

pub use reconcile::{ReconcileReport, RemovalReason, RemovedItem};

use crate::cart_actor::CartError;
use crate::clients::{CartClient, CatalogGateway};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::framework::Versioned;
use crate::model::{Cart, CartId, CartItem, Cents, CustomerId, ItemKey};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Clone)]
pub struct CartManager {
    carts: CartClient,
    catalog: Arc<dyn CatalogGateway>,
    clock: Arc<dyn Clock>,
    config: Arc<EngineConfig>,
}

impl CartManager {
    pub fn new(
        carts: CartClient,
        catalog: Arc<dyn CatalogGateway>,
        clock: Arc<dyn Clock>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            carts,
            catalog,
            clock,
            config,
        }
    }

    /// Returns the customer's live cart, creating one when none exists or the
    /// stored one has expired. Expired carts are replaced, never revived.
    #[instrument(skip(self))]
    pub async fn get_or_create(&self, customer_id: CustomerId) -> Result<Cart, EngineError> {
        let attempts = self.config.write_attempts();
        for attempt in 1..=attempts {
            let now = self.clock.now();
            let fresh = Cart::new(customer_id, now, self.config.cart_ttl());
            let written = match self.carts.load(customer_id).await? {
                Some(stored) if !stored.record.is_expired(now) => return Ok(stored.record),
                Some(stored) => {
                    info!(expired_cart = %stored.record.id, "Replacing expired cart");
                    self.carts.save(fresh, stored.version).await
                }
                None => self.carts.create(fresh).await,
            };
            match written {
                Ok(stored) => {
                    info!(cart_id = %stored.record.id, "Cart created");
                    return Ok(stored.record);
                }
                Err(CartError::Conflict { .. } | CartError::AlreadyExists(_)) => {
                    debug!(attempt, "Lost cart creation race, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(self.contention(customer_id, attempts))
    }

    /// Adds an item, merging it into an existing line with the same
    /// (product, stall, requested time) key.
    #[instrument(skip(self, item), fields(product_id = %item.product_id, quantity = item.quantity))]
    pub async fn add_item(&self, customer_id: CustomerId, cart_id: CartId, item: CartItem) -> Result<Cart, EngineError> {
        let max = self.config.max_item_quantity;
        self.mutate(customer_id, cart_id, move |cart, now| {
            cart.add_item(item.clone(), max, now)
        })
        .await
    }

    /// Removes the line with `key`. Removing an absent line is a no-op.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, customer_id: CustomerId, cart_id: CartId, key: ItemKey) -> Result<Cart, EngineError> {
        self.mutate(customer_id, cart_id, move |cart, now| {
            cart.remove_item(&key, now);
            Ok(())
        })
        .await
    }

    /// Sets a line's quantity. Zero or below removes the line.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        customer_id: CustomerId,
        cart_id: CartId,
        key: ItemKey,
        quantity: i64,
    ) -> Result<Cart, EngineError> {
        let max = self.config.max_item_quantity;
        self.mutate(customer_id, cart_id, move |cart, now| {
            cart.update_quantity(&key, quantity, max, now)
        })
        .await
    }

    /// Empties the cart, keeping its id and expiry.
    #[instrument(skip(self))]
    pub async fn clear(&self, customer_id: CustomerId, cart_id: CartId) -> Result<Cart, EngineError> {
        self.mutate(customer_id, cart_id, |cart, now| {
            cart.clear(now);
            Ok(())
        })
        .await
    }

    /// Folds a batch of items into the cart in one write, e.g. a basket built
    /// before sign-in. Either every item is applied or none is.
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn merge_items(
        &self,
        customer_id: CustomerId,
        cart_id: CartId,
        items: Vec<CartItem>,
    ) -> Result<Cart, EngineError> {
        let max = self.config.max_item_quantity;
        self.mutate(customer_id, cart_id, move |cart, now| {
            items
                .iter()
                .try_for_each(|item| cart.add_item(item.clone(), max, now))
        })
        .await
    }

    pub fn compute_total(cart: &Cart) -> Cents {
        cart.total()
    }

    pub fn compute_item_count(cart: &Cart) -> u64 {
        cart.item_count()
    }

    /// The customer's stored cart with its version, provided it is `cart_id`
    /// and still live.
    pub(crate) async fn load_live(
        &self,
        customer_id: CustomerId,
        cart_id: CartId,
    ) -> Result<Versioned<Cart>, EngineError> {
        let stored = self
            .carts
            .load(customer_id)
            .await?
            .ok_or(CartError::CartNotFound(cart_id))?;
        if stored.record.id != cart_id {
            return Err(CartError::CartNotFound(cart_id).into());
        }
        if stored.record.is_expired(self.clock.now()) {
            return Err(CartError::CartExpired(cart_id).into());
        }
        Ok(stored)
    }

    /// Clears the cart only if it is still exactly `snapshot`.
    pub(crate) async fn clear_snapshot(&self, snapshot: &Versioned<Cart>) -> Result<Cart, CartError> {
        let mut cart = snapshot.record.clone();
        cart.clear(self.clock.now());
        self.carts
            .save(cart, snapshot.version)
            .await
            .map(|stored| stored.record)
    }

    /// Puts `items` back into the cart after a failed checkout. Lines that no
    /// longer fit are dropped and logged.
    pub(crate) async fn restore_items(&self, customer_id: CustomerId, cart_id: CartId, items: Vec<CartItem>) {
        let max = self.config.max_item_quantity;
        let restored = self
            .mutate(customer_id, cart_id, |cart, now| {
                for (key, e) in cart.restore_items(items.clone(), max, now) {
                    warn!(%cart_id, %key, error = %e, "Dropping cart line on restore");
                }
                Ok(())
            })
            .await;
        if let Err(e) = restored {
            warn!(%cart_id, error = %e, "Could not restore cart items");
        }
    }

    async fn mutate<F>(&self, customer_id: CustomerId, cart_id: CartId, mut edit: F) -> Result<Cart, EngineError>
    where
        F: FnMut(&mut Cart, DateTime<Utc>) -> Result<(), CartError>,
    {
        let attempts = self.config.write_attempts();
        for attempt in 1..=attempts {
            let stored = self.load_live(customer_id, cart_id).await?;
            let mut cart = stored.record;
            edit(&mut cart, self.clock.now())?;
            match self.carts.save(cart, stored.version).await {
                Ok(saved) => {
                    debug!(%cart_id, version = saved.version, "Cart saved");
                    return Ok(saved.record);
                }
                Err(CartError::Conflict { .. }) => {
                    debug!(%cart_id, attempt, "Cart changed concurrently, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(self.contention(customer_id, attempts))
    }

    fn contention(&self, customer_id: CustomerId, attempts: u32) -> EngineError {
        warn!(%customer_id, attempts, "Giving up on contended cart");
        EngineError::Contention {
            target: format!("cart of {customer_id}"),
            attempts,
        }
    }
}
