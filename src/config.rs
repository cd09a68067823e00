//! Engine configuration.

use chrono::Duration;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::warn;

/// Tunables for the order engine.
///
/// # Environment variables
///
/// Every field can be overridden with an `ORDER_ENGINE_` prefixed variable:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | ORDER_ENGINE_TAX_RATE | 0.16 | Tax rate applied to the subtotal |
/// | ORDER_ENGINE_CURRENCY | MXN | Currency stamped on orders |
/// | ORDER_ENGINE_MAX_ITEM_QUANTITY | 100 | Per-line quantity cap |
/// | ORDER_ENGINE_CART_TTL_HOURS | 24 | Lifetime of a new cart |
/// | ORDER_ENGINE_MAX_ADVANCE_DAYS | 30 | Booking horizon |
/// | ORDER_ENGINE_CONFLICT_WINDOW_MINUTES | 30 | Nearby-order warning window |
/// | ORDER_ENGINE_CAPACITY_WARNING_RATIO | 0.8 | Share of capacity that triggers a warning |
/// | ORDER_ENGINE_LARGE_QUANTITY_THRESHOLD | 10 | Quantities above this get a warning |
/// | ORDER_ENGINE_LOW_INVENTORY_FACTOR | 2 | Low-stock warning multiplier |
/// | ORDER_ENGINE_WRITE_RETRIES | 5 | Attempts for conditional writes |
/// | ORDER_ENGINE_STORE_BUFFER | 32 | Mailbox size of each store actor |
///
/// Unparseable values fall back to the default, and so do durations outside
/// their accepted range (see [`EngineConfig::sanitized`]).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tax_rate: Decimal,
    pub currency: String,
    pub max_item_quantity: u32,
    pub cart_ttl_hours: i64,
    pub max_advance_days: i64,
    pub conflict_window_minutes: i64,
    pub capacity_warning_ratio: f64,
    pub large_quantity_threshold: u32,
    pub low_inventory_factor: u32,
    pub write_retries: u32,
    pub store_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(16, 2),
            currency: "MXN".into(),
            max_item_quantity: 100,
            cart_ttl_hours: 24,
            max_advance_days: 30,
            conflict_window_minutes: 30,
            capacity_warning_ratio: 0.8,
            large_quantity_threshold: 10,
            low_inventory_factor: 2,
            write_retries: 5,
            store_buffer: 32,
        }
    }
}

/// Accepted ranges for the duration knobs.
const CART_TTL_HOURS: RangeInclusive<i64> = 1..=24 * 365;
const MAX_ADVANCE_DAYS: RangeInclusive<i64> = 0..=3_650;
const CONFLICT_WINDOW_MINUTES: RangeInclusive<i64> = 0..=24 * 60;

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl EngineConfig {
    /// Loads the configuration from the environment, using defaults for
    /// anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tax_rate: env_or("ORDER_ENGINE_TAX_RATE", defaults.tax_rate),
            currency: std::env::var("ORDER_ENGINE_CURRENCY").unwrap_or(defaults.currency),
            max_item_quantity: env_or("ORDER_ENGINE_MAX_ITEM_QUANTITY", defaults.max_item_quantity),
            cart_ttl_hours: env_or("ORDER_ENGINE_CART_TTL_HOURS", defaults.cart_ttl_hours),
            max_advance_days: env_or("ORDER_ENGINE_MAX_ADVANCE_DAYS", defaults.max_advance_days),
            conflict_window_minutes: env_or(
                "ORDER_ENGINE_CONFLICT_WINDOW_MINUTES",
                defaults.conflict_window_minutes,
            ),
            capacity_warning_ratio: env_or(
                "ORDER_ENGINE_CAPACITY_WARNING_RATIO",
                defaults.capacity_warning_ratio,
            ),
            large_quantity_threshold: env_or(
                "ORDER_ENGINE_LARGE_QUANTITY_THRESHOLD",
                defaults.large_quantity_threshold,
            ),
            low_inventory_factor: env_or("ORDER_ENGINE_LOW_INVENTORY_FACTOR", defaults.low_inventory_factor),
            write_retries: env_or("ORDER_ENGINE_WRITE_RETRIES", defaults.write_retries),
            store_buffer: env_or("ORDER_ENGINE_STORE_BUFFER", defaults.store_buffer),
        }
        .sanitized()
    }

    /// Replaces out-of-range durations with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.cart_ttl_hours = within(
            "cart_ttl_hours",
            self.cart_ttl_hours,
            CART_TTL_HOURS,
            defaults.cart_ttl_hours,
        );
        self.max_advance_days = within(
            "max_advance_days",
            self.max_advance_days,
            MAX_ADVANCE_DAYS,
            defaults.max_advance_days,
        );
        self.conflict_window_minutes = within(
            "conflict_window_minutes",
            self.conflict_window_minutes,
            CONFLICT_WINDOW_MINUTES,
            defaults.conflict_window_minutes,
        );
        self
    }

    pub fn cart_ttl(&self) -> Duration {
        bounded(self.cart_ttl_hours, CART_TTL_HOURS, Duration::try_hours, 24)
    }

    pub fn max_advance(&self) -> Duration {
        bounded(self.max_advance_days, MAX_ADVANCE_DAYS, Duration::try_days, 30)
    }

    pub fn conflict_window(&self) -> Duration {
        bounded(self.conflict_window_minutes, CONFLICT_WINDOW_MINUTES, Duration::try_minutes, 30)
    }

    /// Total attempts for a conditional write, never less than one.
    pub fn write_attempts(&self) -> u32 {
        self.write_retries.max(1)
    }
}

fn within(name: &str, value: i64, range: RangeInclusive<i64>, default: i64) -> i64 {
    if range.contains(&value) {
        value
    } else {
        warn!(name, value, default, "Configured duration out of range, using default");
        default
    }
}

/// `value` in the unit of `unit` when it lies in `range`, `default` otherwise.
fn bounded(
    value: i64,
    range: RangeInclusive<i64>,
    unit: fn(i64) -> Option<Duration>,
    default: i64,
) -> Duration {
    let value = if range.contains(&value) { value } else { default };
    unit(value).unwrap_or_else(Duration::zero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert_eq!(config.tax_rate.to_string(), "0.16");
        assert_eq!(config.cart_ttl(), Duration::hours(24));
        assert_eq!(config.max_advance(), Duration::days(30));
        assert_eq!(config.conflict_window(), Duration::minutes(30));
    }

    #[test]
    fn unset_variable_uses_default() {
        assert_eq!(env_or("ORDER_ENGINE_TEST_UNSET_VARIABLE", 7u32), 7);
    }

    #[test]
    fn out_of_range_durations_fall_back_to_defaults() {
        let config = EngineConfig {
            cart_ttl_hours: 0,
            max_advance_days: 1_000_000_000_000,
            conflict_window_minutes: -15,
            ..EngineConfig::default()
        };

        // Accessors never panic, even before sanitizing.
        assert_eq!(config.max_advance(), Duration::days(30));
        assert_eq!(config.conflict_window(), Duration::minutes(30));
        assert_eq!(config.cart_ttl(), Duration::hours(24));

        let clean = config.sanitized();
        assert_eq!(clean.max_advance_days, 30);
        assert_eq!(clean.conflict_window_minutes, 30);
        assert_eq!(clean.cart_ttl_hours, 24);
    }

    #[test]
    fn in_range_durations_are_kept() {
        let config = EngineConfig {
            max_advance_days: 0,
            conflict_window_minutes: 5,
            ..EngineConfig::default()
        }
        .sanitized();
        assert_eq!(config.max_advance(), Duration::zero());
        assert_eq!(config.conflict_window(), Duration::minutes(5));
    }
}
