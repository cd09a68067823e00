//! Catalog records: products and the stalls that sell them.
//!
//! The engine only ever reads these. They are kept in their own stores so the
//! in-memory catalog can be seeded and edited by tests and adapters.

use super::{Cents, ProductId, StallId};
use chrono::{NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    Inactive,
    Deleted,
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Deleted => "deleted",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub stall_id: StallId,
    pub name: String,
    pub status: ProductStatus,
    pub unit_price: Cents,
    pub stock: u32,
}

impl Product {
    /// An active product with a fresh id.
    pub fn new(stall_id: StallId, name: impl Into<String>, unit_price: Cents, stock: u32) -> Self {
        Self {
            id: ProductId::new(),
            stall_id,
            name: name.into(),
            status: ProductStatus::Active,
            unit_price,
            stock,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StallStatus {
    Active,
    Suspended,
}

/// Opening hours for one day of the week, in the stall's local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayHours {
    Closed,
    /// When `close <= open` the window runs past midnight into the next day.
    Open { open: NaiveTime, close: NaiveTime },
}

impl DayHours {
    pub fn open(open: NaiveTime, close: NaiveTime) -> Self {
        Self::Open { open, close }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Whether `time` falls inside the window. Opening is inclusive, closing
    /// exclusive.
    pub fn contains(&self, time: NaiveTime) -> bool {
        match *self {
            Self::Closed => false,
            Self::Open { open, close } if open < close => open <= time && time < close,
            Self::Open { open, close } => time >= open || time < close,
        }
    }
}

/// The weekly open-hours table, one entry per weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHours {
    days: [DayHours; 7],
}

impl WeeklyHours {
    pub fn closed() -> Self {
        Self {
            days: [DayHours::Closed; 7],
        }
    }

    /// Same window on every day of the week.
    pub fn every_day(open: NaiveTime, close: NaiveTime) -> Self {
        Self {
            days: [DayHours::open(open, close); 7],
        }
    }

    pub fn with_day(mut self, weekday: Weekday, hours: DayHours) -> Self {
        self.days[weekday.num_days_from_monday() as usize] = hours;
        self
    }

    pub fn day(&self, weekday: Weekday) -> DayHours {
        self.days[weekday.num_days_from_monday() as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stall {
    pub id: StallId,
    pub name: String,
    pub status: StallStatus,
    /// Time zone that defines the stall's calendar days and opening hours.
    pub timezone: Tz,
    pub hours: WeeklyHours,
    /// Maximum orders accepted for a single local calendar day. Zero means
    /// unlimited.
    pub capacity_per_day: u32,
}

impl Stall {
    pub fn new(name: impl Into<String>, timezone: Tz, hours: WeeklyHours, capacity_per_day: u32) -> Self {
        Self {
            id: StallId::new(),
            name: name.into(),
            status: StallStatus::Active,
            timezone,
            hours,
            capacity_per_day,
        }
    }

    pub fn is_accepting_orders(&self) -> bool {
        self.status == StallStatus::Active
    }
}

/// Full English name of a weekday, used in validation messages.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
