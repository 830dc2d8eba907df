//! Period selectors and their date lower bounds.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::Serialize;

/// Selector strings the dashboard offers, in display order.
pub const PERIOD_CHOICES: [&str; 3] = ["1week", "1month", "all"];

/// Symbolic history window for the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Period {
    #[serde(rename = "1week")]
    OneWeek,
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "all")]
    All,
}

impl Period {
    /// Unrecognized selectors mean the whole history.
    #[must_use]
    pub fn from_selector(selector: &str) -> Self {
        match selector {
            "1week" => Self::OneWeek,
            "1month" => Self::OneMonth,
            _ => Self::All,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneWeek => "1week",
            Self::OneMonth => "1month",
            Self::All => "all",
        }
    }

    /// Days covered, `None` for unbounded history.
    #[must_use]
    pub const fn days(self) -> Option<i64> {
        match self {
            Self::OneWeek => Some(7),
            Self::OneMonth => Some(30),
            Self::All => None,
        }
    }

    /// First calendar date included when looking back from `now`.
    #[must_use]
    pub fn start_date(self, now: NaiveDateTime) -> NaiveDate {
        self.days()
            .and_then(|days| now.checked_sub_signed(TimeDelta::days(days)))
            .map_or_else(history_floor, |t| t.date())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentinel lower bound that selects every stored observation.
#[must_use]
pub fn history_floor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Resolve a raw period selector against `now`.
#[must_use]
pub fn resolve_start_date(selector: &str, now: NaiveDateTime) -> NaiveDate {
    Period::from_selector(selector).start_date(now)
}
