//! # Scheduling Validator
//!
//! Decides whether a stall can take an order at a requested time.
//!
//! Blocking: unknown or suspended stall, a time that is not in the future or
//! lies beyond the booking horizon, a day the stall is closed, and a day that
//! is already at capacity. Advisory: a time outside the day's opening window,
//! a day close to capacity, and other bookings within the conflict window.

use crate::clients::{CatalogGateway, LedgerClient, OrderClient};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::model::{DayHours, Stall, StallDayKey, StallId, ValidationIssue, ValidationResult, ValidationWarning};
use chrono::{DateTime, Datelike, Utc};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Outcome of a scheduling check, carrying the stall it was made against.
#[derive(Debug, Clone)]
pub struct SchedulingDecision {
    pub stall: Option<Stall>,
    pub requested_time: DateTime<Utc>,
    pub result: ValidationResult,
}

impl SchedulingDecision {
    /// The ledger slot the requested time falls into.
    pub fn slot(&self) -> Option<StallDayKey> {
        self.stall
            .as_ref()
            .map(|stall| StallDayKey::local(stall.id, stall.timezone, self.requested_time))
    }
}

#[derive(Clone)]
pub struct SchedulingValidator {
    catalog: Arc<dyn CatalogGateway>,
    ledgers: LedgerClient,
    orders: OrderClient,
    clock: Arc<dyn Clock>,
    config: Arc<EngineConfig>,
}

impl SchedulingValidator {
    pub fn new(
        catalog: Arc<dyn CatalogGateway>,
        ledgers: LedgerClient,
        orders: OrderClient,
        clock: Arc<dyn Clock>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            catalog,
            ledgers,
            orders,
            clock,
            config,
        }
    }

    #[instrument(skip(self))]
    pub async fn validate(
        &self,
        stall_id: StallId,
        requested_time: DateTime<Utc>,
        item_count: u64,
    ) -> Result<SchedulingDecision, EngineError> {
        let Some(stall) = self.catalog.get_stall(stall_id).await? else {
            return Ok(SchedulingDecision {
                stall: None,
                requested_time,
                result: ValidationResult::rejected(ValidationIssue::StallNotFound { stall_id }),
            });
        };
        if !stall.is_accepting_orders() {
            return Ok(SchedulingDecision {
                stall: Some(stall),
                requested_time,
                result: ValidationResult::rejected(ValidationIssue::StallNotAccepting { stall_id }),
            });
        }

        let mut result = ValidationResult::new();
        self.check_window(requested_time, &mut result);
        check_hours(&stall, requested_time, &mut result);
        self.check_capacity(&stall, requested_time, &mut result).await?;
        self.check_conflicts(stall_id, requested_time, &mut result).await?;

        debug!(valid = result.is_valid(), warnings = result.warnings.len(), "Schedule checked");
        Ok(SchedulingDecision {
            stall: Some(stall),
            requested_time,
            result,
        })
    }

    fn check_window(&self, requested_time: DateTime<Utc>, result: &mut ValidationResult) {
        let now = self.clock.now();
        if requested_time <= now {
            result.error(ValidationIssue::NotInFuture {
                requested: requested_time,
            });
        }
        let latest = now
            .checked_add_signed(self.config.max_advance())
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        if requested_time > latest {
            result.error(ValidationIssue::AdvanceLimitExceeded {
                requested: requested_time,
                latest,
            });
        }
    }

    async fn check_capacity(
        &self,
        stall: &Stall,
        requested_time: DateTime<Utc>,
        result: &mut ValidationResult,
    ) -> Result<(), EngineError> {
        let capacity = stall.capacity_per_day;
        if capacity == 0 {
            return Ok(());
        }
        let slot = StallDayKey::local(stall.id, stall.timezone, requested_time);
        let booked = self.ledgers.booked(slot).await?.saturating_add(1);
        if booked > capacity {
            result.error(ValidationIssue::AtCapacity { capacity });
        } else if f64::from(booked) > f64::from(capacity) * self.config.capacity_warning_ratio {
            result.warn(ValidationWarning::ApproachingCapacity { booked, capacity });
        }
        Ok(())
    }

    async fn check_conflicts(
        &self,
        stall_id: StallId,
        requested_time: DateTime<Utc>,
        result: &mut ValidationResult,
    ) -> Result<(), EngineError> {
        let window = self.config.conflict_window();
        let nearby = self
            .orders
            .orders_near(stall_id, requested_time, window)
            .await?;
        if !nearby.is_empty() {
            result.warn(ValidationWarning::NearbyOrders {
                count: nearby.len(),
                window_minutes: window.num_minutes(),
            });
        }
        Ok(())
    }
}

fn check_hours(stall: &Stall, requested_time: DateTime<Utc>, result: &mut ValidationResult) {
    let local = requested_time.with_timezone(&stall.timezone);
    let weekday = local.weekday();
    match stall.hours.day(weekday) {
        DayHours::Closed => result.error(ValidationIssue::ClosedDay { weekday }),
        hours @ DayHours::Open { open, close } => {
            if !hours.contains(local.time()) {
                result.warn(ValidationWarning::OutsideHours {
                    local_time: local.time(),
                    open,
                    close,
                });
            }
        }
    }
}
