use super::{assembler, OrderPlacement};
use crate::cart::CartManager;
use crate::cart_actor::CartError;
use crate::clients::{LedgerClient, OrderClient};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::framework::ActorClient;
use crate::ledger_actor::LedgerError;
use crate::model::{
    CartId, CustomerId, Order, OrderId, OrderStatus, StallDayKey, StallId, ValidationIssue,
    ValidationResult, ValidationWarning,
};
use crate::notify::{Notifier, OrderEvent};
use crate::validation::{AvailabilityValidator, LineItem, SchedulingValidator};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Validates carts into orders and drives order status.
///
/// Placement is validate, reserve a capacity slot, clear the cart (conditional
/// on the version that was validated), then store the order. Each step undoes
/// the previous ones if it fails, so no order exists without its slot and a
/// cleared cart, and no slot outlives a failed placement.
#[derive(Clone)]
pub struct OrderService {
    carts: CartManager,
    availability: AvailabilityValidator,
    scheduling: SchedulingValidator,
    orders: OrderClient,
    ledgers: LedgerClient,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
    config: Arc<EngineConfig>,
}

impl OrderService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        carts: CartManager,
        availability: AvailabilityValidator,
        scheduling: SchedulingValidator,
        orders: OrderClient,
        ledgers: LedgerClient,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            carts,
            availability,
            scheduling,
            orders,
            ledgers,
            notifier,
            clock,
            config,
        }
    }

    /// Validates the customer's cart for `stall_id` at `requested_time` and,
    /// when nothing blocks, creates the order and clears the cart.
    ///
    /// Blocking findings come back as [`OrderPlacement::Rejected`]; `Err` is
    /// reserved for requests the engine could not carry out.
    ///
    /// The whole order is scheduled at `requested_time`. A line that carries
    /// a different pickup time of its own is kept but flagged with
    /// [`ValidationWarning::LineTimeIgnored`].
    #[instrument(skip(self, instructions))]
    pub async fn validate_and_create_order(
        &self,
        customer_id: CustomerId,
        cart_id: CartId,
        stall_id: StallId,
        requested_time: DateTime<Utc>,
        instructions: Option<String>,
    ) -> Result<OrderPlacement, EngineError> {
        let attempts = self.config.write_attempts();
        for attempt in 1..=attempts {
            let snapshot = self.carts.load_live(customer_id, cart_id).await?;
            let cart = &snapshot.record;

            let mut findings = ValidationResult::new();
            if cart.is_empty() {
                findings.error(ValidationIssue::EmptyCart);
            }
            for item in cart.items().iter().filter(|item| item.stall_id != stall_id) {
                findings.error(ValidationIssue::ItemForOtherStall {
                    product_id: item.product_id,
                    item_stall: item.stall_id,
                    order_stall: stall_id,
                });
            }
            for item in cart.items() {
                if let Some(line_time) = item.requested_time.filter(|t| *t != requested_time) {
                    findings.warn(ValidationWarning::LineTimeIgnored {
                        product_id: item.product_id,
                        line_time,
                        order_time: requested_time,
                    });
                }
            }

            let lines: Vec<LineItem> = cart.items().iter().map(LineItem::from).collect();
            let (availability, decision) = tokio::join!(
                self.availability.validate(&lines),
                self.scheduling
                    .validate(stall_id, requested_time, cart.item_count()),
            );
            let decision = decision?;
            let mut findings = findings.merge(availability?).merge(decision.result);

            let stall = match decision.stall {
                Some(stall) if findings.is_valid() => stall,
                _ => {
                    info!(errors = findings.errors.len(), "Order rejected");
                    return Ok(OrderPlacement::Rejected(findings));
                }
            };

            let order = assembler::assemble(
                cart,
                &stall,
                requested_time,
                instructions.clone(),
                &self.config,
                self.clock.now(),
            )?;
            let slot = order.slot();

            match self.ledgers.reserve(slot, order.id, stall.capacity_per_day).await {
                Ok(booked) => debug!(%slot, booked, "Slot reserved"),
                Err(LedgerError::CapacityExceeded { capacity, .. }) => {
                    info!(%slot, capacity, "Order rejected, day is full");
                    findings.error(ValidationIssue::AtCapacity { capacity });
                    return Ok(OrderPlacement::Rejected(findings));
                }
                Err(e) => return Err(e.into()),
            }

            match self.carts.clear_snapshot(&snapshot).await {
                Ok(_) => {}
                Err(CartError::Conflict { .. }) => {
                    debug!(%cart_id, attempt, "Cart changed during checkout, revalidating");
                    self.release_slot(slot, order.id).await;
                    continue;
                }
                Err(e) => {
                    self.release_slot(slot, order.id).await;
                    return Err(e.into());
                }
            }

            let order_id = order.id;
            let items = snapshot.record.items().to_vec();
            return match self.orders.insert(order).await {
                Ok(order) => {
                    info!(order_id = %order.id, total = order.total, "Order created");
                    self.notify(&order);
                    Ok(OrderPlacement::Created {
                        order,
                        warnings: findings.warnings,
                    })
                }
                Err(e) => {
                    error!(%cart_id, error = %e, "Order insert failed after cart was cleared");
                    self.release_slot(slot, order_id).await;
                    self.carts.restore_items(customer_id, cart_id, items).await;
                    Err(e.into())
                }
            };
        }

        warn!(%cart_id, attempts, "Giving up on contended checkout");
        Err(EngineError::Contention {
            target: format!("checkout of {cart_id}"),
            attempts,
        })
    }

    /// Moves an order to `new_status`, whatever its current state.
    #[instrument(skip(self))]
    pub async fn transition_order(&self, order_id: OrderId, new_status: OrderStatus) -> Result<Order, EngineError> {
        self.apply_transition(order_id, None, new_status).await
    }

    /// Moves an order to `new_status` only if it is still in `expected`.
    /// Fails with `StaleStatus` otherwise.
    #[instrument(skip(self))]
    pub async fn transition_order_from(
        &self,
        order_id: OrderId,
        expected: OrderStatus,
        new_status: OrderStatus,
    ) -> Result<Order, EngineError> {
        self.apply_transition(order_id, Some(expected), new_status).await
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, EngineError> {
        Ok(self.orders.get(order_id).await?)
    }

    /// Non-cancelled orders booked for a stall on a stall-local day.
    #[instrument(skip(self))]
    pub async fn orders_for_stall_day(&self, stall_id: StallId, day: NaiveDate) -> Result<Vec<Order>, EngineError> {
        Ok(self.orders.orders_for_stall_day(stall_id, day).await?)
    }

    async fn apply_transition(
        &self,
        order_id: OrderId,
        expected: Option<OrderStatus>,
        new_status: OrderStatus,
    ) -> Result<Order, EngineError> {
        let (previous, order) = self
            .orders
            .transition(order_id, new_status, expected, self.clock.now())
            .await?;
        info!(%order_id, from = %previous, to = %new_status, "Order transitioned");

        if new_status == OrderStatus::Cancelled {
            self.release_slot(order.slot(), order.id).await;
        }
        self.notify(&order);
        Ok(order)
    }

    /// Frees a ledger slot. A failure only leaves the day under-booked, so it
    /// is logged rather than returned.
    async fn release_slot(&self, slot: StallDayKey, order_id: OrderId) {
        match self.ledgers.release(slot, order_id).await {
            Ok(booked) => debug!(%slot, %order_id, booked, "Slot released"),
            Err(e) => error!(%slot, %order_id, error = %e, "Could not release slot"),
        }
    }

    fn notify(&self, order: &Order) {
        self.notifier.dispatch(OrderEvent {
            order_id: order.id,
            customer_id: order.customer_id,
            stall_id: order.stall_id,
            new_status: order.status(),
        });
    }
}
