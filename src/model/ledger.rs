//! Per-stall, per-day capacity ledger.
//!
//! One ledger exists for every (stall, local calendar day) that has ever
//! admitted an order. It holds the ids of the non-cancelled orders booked for
//! that day, so its size is the day's booked count.

use super::{OrderId, StallId};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StallDayKey {
    pub stall_id: StallId,
    pub day: NaiveDate,
}

impl StallDayKey {
    /// The key for `at` as seen on the wall clock of a stall in `timezone`.
    pub fn local(stall_id: StallId, timezone: Tz, at: DateTime<Utc>) -> Self {
        Self {
            stall_id,
            day: at.with_timezone(&timezone).date_naive(),
        }
    }
}

impl fmt::Display for StallDayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.stall_id, self.day)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StallDayLedger {
    pub key: StallDayKey,
    pub orders: BTreeSet<OrderId>,
}

impl StallDayLedger {
    pub fn empty(key: StallDayKey) -> Self {
        Self {
            key,
            orders: BTreeSet::new(),
        }
    }

    pub fn booked(&self) -> u32 {
        u32::try_from(self.orders.len()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_day_follows_stall_timezone() {
        // 03:30 UTC on the 5th is still the evening of the 4th in Mexico City.
        let at = DateTime::parse_from_rfc3339("2026-06-05T03:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let key = StallDayKey::local(StallId::new(), chrono_tz::America::Mexico_City, at);
        assert_eq!(key.day, NaiveDate::from_ymd_opt(2026, 6, 4).unwrap());
    }
}
