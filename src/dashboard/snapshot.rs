//! Latest-state table across all channels.

#![allow(missing_docs)]

use std::fmt;

use serde::Serialize;

use crate::store::rows::SnapshotRow;

/// Selectable columns of the snapshot table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotColumn {
    ChannelName,
    ChannelId,
    Capacity,
    LastUpdated,
    LocalBalance,
    LocalBalanceRatio,
    LocalFee,
    LocalInfee,
    RemoteBalance,
    RemoteFee,
    RemoteInfee,
    NumUpdates,
    AmbossFee,
}

impl SnapshotColumn {
    pub const ALL: [Self; 13] = [
        Self::ChannelName,
        Self::ChannelId,
        Self::Capacity,
        Self::LastUpdated,
        Self::LocalBalance,
        Self::LocalBalanceRatio,
        Self::LocalFee,
        Self::LocalInfee,
        Self::RemoteBalance,
        Self::RemoteFee,
        Self::RemoteInfee,
        Self::NumUpdates,
        Self::AmbossFee,
    ];

    /// Columns shown before the user picks any.
    pub const DEFAULT: [Self; 9] = [
        Self::ChannelName,
        Self::Capacity,
        Self::LocalBalanceRatio,
        Self::LocalFee,
        Self::LocalInfee,
        Self::RemoteFee,
        Self::RemoteInfee,
        Self::NumUpdates,
        Self::AmbossFee,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ChannelName => "channel_name",
            Self::ChannelId => "channel_id",
            Self::Capacity => "capacity",
            Self::LastUpdated => "last_updated",
            Self::LocalBalance => "local_balance",
            Self::LocalBalanceRatio => "local_balance_ratio",
            Self::LocalFee => "local_fee",
            Self::LocalInfee => "local_infee",
            Self::RemoteBalance => "remote_balance",
            Self::RemoteFee => "remote_fee",
            Self::RemoteInfee => "remote_infee",
            Self::NumUpdates => "num_updates",
            Self::AmbossFee => "amboss_fee",
        }
    }

    /// Human header for tables.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::ChannelName => "Channel",
            Self::ChannelId => "Channel ID",
            Self::Capacity => "Capacity",
            Self::LastUpdated => "Last updated",
            Self::LocalBalance => "Local balance",
            Self::LocalBalanceRatio => "Local ratio %",
            Self::LocalFee => "Local fee",
            Self::LocalInfee => "Local in-fee",
            Self::RemoteBalance => "Remote balance",
            Self::RemoteFee => "Remote fee",
            Self::RemoteInfee => "Remote in-fee",
            Self::NumUpdates => "Updates",
            Self::AmbossFee => "Amboss fee",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name.trim())
    }

    #[must_use]
    pub fn cell(self, row: &SnapshotRow) -> SnapshotCell {
        match self {
            Self::ChannelName => SnapshotCell::Text(row.channel_name.clone()),
            Self::ChannelId => SnapshotCell::Text(row.channel_id.clone()),
            Self::Capacity => SnapshotCell::Sats(row.capacity),
            Self::LastUpdated => row
                .last_updated
                .clone()
                .map_or(SnapshotCell::Missing, SnapshotCell::Text),
            Self::LocalBalance => SnapshotCell::Number(row.local_balance),
            Self::LocalBalanceRatio => SnapshotCell::Number(row.local_balance_ratio),
            Self::LocalFee => SnapshotCell::Number(row.local_fee),
            Self::LocalInfee => SnapshotCell::Number(row.local_infee),
            Self::RemoteBalance => SnapshotCell::Number(row.remote_balance),
            Self::RemoteFee => SnapshotCell::Number(row.remote_fee),
            Self::RemoteInfee => SnapshotCell::Number(row.remote_infee),
            Self::NumUpdates => SnapshotCell::Number(row.num_updates),
            Self::AmbossFee => SnapshotCell::Number(row.amboss_fee),
        }
    }
}

impl fmt::Display for SnapshotColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SnapshotCell {
    Text(String),
    Sats(i64),
    Number(f64),
    Missing,
}

impl fmt::Display for SnapshotCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Sats(sat) => f.write_str(&format_capacity(*sat)),
            Self::Number(n) if n.fract() == 0.0 => write!(f, "{n:.0}"),
            Self::Number(n) => write!(f, "{n:.2}"),
            Self::Missing => f.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotTable {
    pub columns: Vec<SnapshotColumn>,
    pub rows: Vec<Vec<SnapshotCell>>,
}

impl SnapshotTable {
    /// Project `rows` onto `columns`; an empty selection shows every column.
    #[must_use]
    pub fn project(rows: &[SnapshotRow], columns: &[SnapshotColumn]) -> Self {
        let columns = if columns.is_empty() {
            SnapshotColumn::ALL.to_vec()
        } else {
            columns.to_vec()
        };
        let rows = rows
            .iter()
            .map(|row| columns.iter().map(|c| c.cell(row)).collect())
            .collect();
        Self { columns, rows }
    }
}

/// Capacity with thousands separators, e.g. `"1,234,567 sat"`.
#[must_use]
pub fn format_capacity(sat: i64) -> String {
    let digits = sat.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 5);
    if sat < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push_str(" sat");
    grouped
}
