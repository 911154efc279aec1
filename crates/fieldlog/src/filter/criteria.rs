//! Individual filter criteria: date windows, sort orders and the `all`
//! sentinel for equality filters.

use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Restricts records to a window ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    /// No restriction.
    #[default]
    All,
    /// Same calendar day as now, in the evaluating time zone.
    Today,
    /// Within the last 7 days.
    Last7Days,
    /// Within the last 30 days.
    Last30Days,
}

impl DateFilter {
    /// Check whether `timestamp` falls inside the window ending at `now`.
    ///
    /// "Today" compares calendar days in `now`'s time zone. The rolling
    /// windows are inclusive at the cutoff.
    #[must_use]
    pub fn matches<Tz: TimeZone>(self, timestamp: DateTime<Utc>, now: &DateTime<Tz>) -> bool {
        match self {
            Self::All => true,
            Self::Today => timestamp.with_timezone(&now.timezone()).date_naive() == now.date_naive(),
            Self::Last7Days => timestamp >= now.with_timezone(&Utc) - Duration::days(7),
            Self::Last30Days => timestamp >= now.with_timezone(&Utc) - Duration::days(30),
        }
    }
}

impl std::fmt::Display for DateFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Today => write!(f, "today"),
            Self::Last7Days => write!(f, "last7"),
            Self::Last30Days => write!(f, "last30"),
        }
    }
}

impl FromStr for DateFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "7" | "last7" | "last-7" => Ok(Self::Last7Days),
            "30" | "last30" | "last-30" => Ok(Self::Last30Days),
            _ => Err(Error::invalid_filter("date filter", s)),
        }
    }
}

/// Order of a filtered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recent first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
    /// Keep the stored order.
    Stored,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Newest => write!(f, "newest"),
            Self::Oldest => write!(f, "oldest"),
            Self::Stored => write!(f, "stored"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "stored" => Ok(Self::Stored),
            _ => Err(Error::invalid_filter("sort order", s)),
        }
    }
}

/// An equality filter with an `all` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Criterion<T> {
    /// Accept every value.
    #[default]
    All,
    /// Accept only this value.
    Only(T),
}

impl<T: PartialEq> Criterion<T> {
    /// Check a single-valued field.
    #[must_use]
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == value,
        }
    }

    /// Check an optional field. An absent value only passes `All`.
    #[must_use]
    pub fn matches_option(&self, value: Option<&T>) -> bool {
        match (self, value) {
            (Self::All, _) => true,
            (Self::Only(wanted), Some(value)) => wanted == value,
            (Self::Only(_), None) => false,
        }
    }

    /// Check a set-valued field: passes when the set contains the value.
    #[must_use]
    pub fn matches_any(&self, values: &[T]) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => values.contains(wanted),
        }
    }

    /// Check whether this criterion accepts everything.
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl<T> From<Option<T>> for Criterion<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::All, Self::Only)
    }
}

impl<T: FromStr> FromStr for Criterion<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}
