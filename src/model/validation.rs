//! Structured validation findings.
//!
//! Blocking issues prevent order creation. Warnings are advisory and travel
//! alongside a successful result.

use super::catalog::weekday_name;
use super::{Cents, ProductId, ProductStatus, StallId};
use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::Serialize;
use std::fmt;

/// A finding that blocks order creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationIssue {
    EmptyCart,
    ProductNotFound {
        product_id: ProductId,
    },
    ProductUnavailable {
        product_id: ProductId,
        status: ProductStatus,
    },
    StallMismatch {
        product_id: ProductId,
        declared: StallId,
        actual: StallId,
    },
    InsufficientInventory {
        product_id: ProductId,
        available: u32,
        requested: u32,
    },
    PriceMismatch {
        product_id: ProductId,
        submitted: Cents,
        current: Cents,
    },
    ItemForOtherStall {
        product_id: ProductId,
        item_stall: StallId,
        order_stall: StallId,
    },
    StallNotFound {
        stall_id: StallId,
    },
    StallNotAccepting {
        stall_id: StallId,
    },
    NotInFuture {
        requested: DateTime<Utc>,
    },
    AdvanceLimitExceeded {
        requested: DateTime<Utc>,
        latest: DateTime<Utc>,
    },
    ClosedDay {
        weekday: Weekday,
    },
    AtCapacity {
        capacity: u32,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCart => write!(f, "cart is empty"),
            Self::ProductNotFound { product_id } => write!(f, "product not found: {product_id}"),
            Self::ProductUnavailable { product_id, status } => {
                write!(f, "product unavailable: {product_id} is {status}")
            }
            Self::StallMismatch {
                product_id,
                declared,
                actual,
            } => write!(
                f,
                "stall mismatch: {product_id} is sold by {actual}, not {declared}"
            ),
            Self::InsufficientInventory {
                product_id,
                available,
                requested,
            } => write!(
                f,
                "insufficient inventory for {product_id}: {available} available, {requested} requested"
            ),
            Self::PriceMismatch {
                product_id,
                submitted,
                current,
            } => write!(
                f,
                "price mismatch for {product_id}: submitted {submitted}, current {current}"
            ),
            Self::ItemForOtherStall {
                product_id,
                item_stall,
                order_stall,
            } => write!(
                f,
                "item {product_id} belongs to another stall: {item_stall}, order is for {order_stall}"
            ),
            Self::StallNotFound { stall_id } => write!(f, "stall not found: {stall_id}"),
            Self::StallNotAccepting { stall_id } => {
                write!(f, "stall not accepting orders: {stall_id}")
            }
            Self::NotInFuture { requested } => write!(
                f,
                "order must be scheduled in the future: {}",
                requested.to_rfc3339()
            ),
            Self::AdvanceLimitExceeded { requested, latest } => write!(
                f,
                "advance booking limit exceeded: {} is after {}",
                requested.to_rfc3339(),
                latest.to_rfc3339()
            ),
            Self::ClosedDay { weekday } => {
                write!(f, "stall is closed on {}", weekday_name(*weekday))
            }
            Self::AtCapacity { capacity } => write!(
                f,
                "stall at capacity for this day: limit is {capacity} orders"
            ),
        }
    }
}

/// An advisory finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationWarning {
    LowInventory {
        product_id: ProductId,
        remaining: u32,
    },
    LargeQuantity {
        product_id: ProductId,
        quantity: u32,
    },
    OutsideHours {
        local_time: NaiveTime,
        open: NaiveTime,
        close: NaiveTime,
    },
    ApproachingCapacity {
        booked: u32,
        capacity: u32,
    },
    NearbyOrders {
        count: usize,
        window_minutes: i64,
    },
    /// A cart line asked for its own pickup time. Orders have a single
    /// pickup time, so the line is scheduled with the order.
    LineTimeIgnored {
        product_id: ProductId,
        line_time: DateTime<Utc>,
        order_time: DateTime<Utc>,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LowInventory {
                product_id,
                remaining,
            } => write!(f, "low inventory for {product_id}: {remaining} left after this order"),
            Self::LargeQuantity {
                product_id,
                quantity,
            } => write!(
                f,
                "large quantity ({quantity}) of {product_id} may affect preparation time"
            ),
            Self::OutsideHours {
                local_time,
                open,
                close,
            } => write!(
                f,
                "{} is outside normal operating hours ({}-{})",
                local_time.format("%H:%M"),
                open.format("%H:%M"),
                close.format("%H:%M")
            ),
            Self::ApproachingCapacity { booked, capacity } => {
                write!(f, "approaching capacity: {booked} of {capacity} orders booked")
            }
            Self::NearbyOrders {
                count,
                window_minutes,
            } => write!(
                f,
                "{count} other order(s) scheduled within {window_minutes} minutes"
            ),
            Self::LineTimeIgnored {
                product_id,
                line_time,
                order_time,
            } => write!(
                f,
                "{product_id} was requested for {line_time}, it will be ready with the order at {order_time}"
            ),
        }
    }
}

/// Aggregated findings of one or more validators. Valid when no blocking
/// issue is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejected(issue: ValidationIssue) -> Self {
        Self {
            errors: vec![issue],
            warnings: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
    }

    pub fn warn(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Appends `other`'s findings after this result's, preserving order.
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "valid")?;
        } else {
            let errors: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
            write!(f, "invalid: {}", errors.join("; "))?;
        }
        if !self.warnings.is_empty() {
            let warnings: Vec<String> = self.warnings.iter().map(ToString::to_string).collect();
            write!(f, " (warnings: {})", warnings.join("; "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_day_names_the_day() {
        let issue = ValidationIssue::ClosedDay {
            weekday: Weekday::Sun,
        };
        assert_eq!(issue.to_string(), "stall is closed on Sunday");
    }

    #[test]
    fn warnings_do_not_invalidate() {
        let mut result = ValidationResult::new();
        result.warn(ValidationWarning::ApproachingCapacity {
            booked: 9,
            capacity: 10,
        });
        assert!(result.is_valid());

        let merged = result.merge(ValidationResult::rejected(ValidationIssue::EmptyCart));
        assert!(!merged.is_valid());
        assert_eq!(merged.warnings.len(), 1);
    }
}
