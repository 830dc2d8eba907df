//! Row types read from the collector database.

#![allow(missing_docs)]

use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlResult, ValueRef};
use serde::Serialize;

/// `(name, id)` pair from `channel_lists`, in storage order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelListing {
    pub name: String,
    pub id: String,
}

/// A channel with its fixed capacity in satoshis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSummary {
    pub id: String,
    pub name: String,
    pub capacity: i64,
}

/// Result of resolving a channel by name.
///
/// An unknown name yields [`ChannelInfo::absent`] rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelInfo {
    pub id: Option<String>,
    pub capacity: i64,
}

impl ChannelInfo {
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            id: None,
            capacity: 0,
        }
    }

    #[must_use]
    pub const fn is_absent(&self) -> bool {
        self.id.is_none()
    }
}

/// A column value exactly as SQLite stored it.
///
/// The collector is loose about types, so numbers may arrive as text. Coercion
/// happens in the normalizer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl RawValue {
    /// Numeric reading of the value, `None` when missing or unparseable.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Null | Self::Blob(_) => return None,
            Self::Integer(i) => *i as f64,
            Self::Real(r) => *r,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Textual form for identifier and timestamp columns; `None` for NULL.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Integer(i) => Some(i.to_string()),
            Self::Real(r) => Some(r.to_string()),
            Self::Text(s) => Some(s),
            Self::Blob(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}

impl FromSql for RawValue {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(i) => Self::Integer(i),
            ValueRef::Real(r) => Self::Real(r),
            ValueRef::Text(bytes) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Self::Blob(bytes.to_vec()),
        })
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl<T: Into<Self>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One row of `channel_datas`, ordered by `timestamp` within a channel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChannelObservation {
    pub timestamp: NaiveDateTime,
    pub local_balance: RawValue,
    pub local_fee: RawValue,
    pub local_infee: RawValue,
    pub remote_balance: RawValue,
    pub remote_fee: RawValue,
    pub remote_infee: RawValue,
    pub num_updates: RawValue,
    pub amboss_fee: RawValue,
    pub active: RawValue,
}

impl ChannelObservation {
    /// Observation at `timestamp` with every measurement missing.
    #[must_use]
    pub fn at(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }
}

/// Latest state of one channel for the snapshot table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRow {
    pub channel_name: String,
    pub channel_id: String,
    pub capacity: i64,
    pub last_updated: Option<String>,
    pub local_balance: f64,
    pub local_balance_ratio: f64,
    pub local_fee: f64,
    pub local_infee: f64,
    pub remote_balance: f64,
    pub remote_fee: f64,
    pub remote_infee: f64,
    pub num_updates: f64,
    pub amboss_fee: f64,
}
