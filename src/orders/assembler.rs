//! # Order Assembler
//!
//! Turns a validated cart into an immutable `pending` order.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::model::{Cart, Cents, Order, OrderDraft, OrderItem, Stall, StallDayKey};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Cents,
    pub tax: Cents,
    pub total: Cents,
}

/// `round(subtotal × rate)` to whole cents, halves rounded up.
pub fn compute_tax(subtotal: Cents, rate: Decimal) -> Option<Cents> {
    Decimal::from(subtotal)
        .checked_mul(rate)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Subtotal, tax and total for `(quantity, unit_price)` lines. `None` on
/// overflow.
pub fn compute_totals<I>(lines: I, rate: Decimal) -> Option<Totals>
where
    I: IntoIterator<Item = (u32, Cents)>,
{
    let subtotal = lines.into_iter().try_fold(0i64, |acc, (quantity, unit_price)| {
        acc.checked_add(Cents::from(quantity).checked_mul(unit_price)?)
    })?;
    let tax = compute_tax(subtotal, rate)?;
    Some(Totals {
        subtotal,
        tax,
        total: subtotal.checked_add(tax)?,
    })
}

/// Builds the order for `cart` at `stall`.
///
/// Callers must have validated the cart and the schedule first; this only
/// prices and stamps.
pub fn assemble(
    cart: &Cart,
    stall: &Stall,
    requested_time: DateTime<Utc>,
    instructions: Option<String>,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<Order, EngineError> {
    let items: Vec<OrderItem> = cart
        .items()
        .iter()
        .map(|item| OrderItem {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total(),
            instructions: item.instructions.clone(),
        })
        .collect();
    let totals = compute_totals(
        items.iter().map(|item| (item.quantity, item.unit_price)),
        config.tax_rate,
    )
    .ok_or(EngineError::AmountOverflow)?;

    let draft = OrderDraft {
        customer_id: cart.customer_id,
        stall_id: stall.id,
        items,
        subtotal: totals.subtotal,
        tax: totals.tax,
        total: totals.total,
        currency: config.currency.clone(),
        requested_time,
        service_day: StallDayKey::local(stall.id, stall.timezone, requested_time).day,
        instructions,
    };
    Ok(Order::create(draft, now))
}
