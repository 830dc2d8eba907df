//! Addressable series columns and the per-field clipping policy.

use std::fmt;

use serde::Serialize;

use crate::store::rows::{ChannelObservation, RawValue};

/// Upper bound for any fee reading, in ppm or sat.
pub const FEE_LIMIT: f64 = 1_000_000.0;

/// Every column a normalized series exposes to the chart builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesField {
    Date,
    LocalBalance,
    LocalFee,
    LocalInfee,
    RemoteBalance,
    RemoteFee,
    RemoteInfee,
    NumUpdates,
    AmbossFee,
    Active,
    Capacity,
    LocalBalanceRatio,
}

impl SeriesField {
    /// All columns, in table order.
    pub const ALL: [Self; 12] = [
        Self::Date,
        Self::LocalBalance,
        Self::LocalFee,
        Self::LocalInfee,
        Self::RemoteBalance,
        Self::RemoteFee,
        Self::RemoteInfee,
        Self::NumUpdates,
        Self::AmbossFee,
        Self::Active,
        Self::Capacity,
        Self::LocalBalanceRatio,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::LocalBalance => "local_balance",
            Self::LocalFee => "local_fee",
            Self::LocalInfee => "local_infee",
            Self::RemoteBalance => "remote_balance",
            Self::RemoteFee => "remote_fee",
            Self::RemoteInfee => "remote_infee",
            Self::NumUpdates => "num_updates",
            Self::AmbossFee => "amboss_fee",
            Self::Active => "active",
            Self::Capacity => "capacity",
            Self::LocalBalanceRatio => "local_balance_ratio",
        }
    }

    /// Exact, case-sensitive lookup by column name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    /// Raw measurement for this field, `None` for derived and temporal columns.
    #[must_use]
    pub const fn raw(self, obs: &ChannelObservation) -> Option<&RawValue> {
        match self {
            Self::LocalBalance => Some(&obs.local_balance),
            Self::LocalFee => Some(&obs.local_fee),
            Self::LocalInfee => Some(&obs.local_infee),
            Self::RemoteBalance => Some(&obs.remote_balance),
            Self::RemoteFee => Some(&obs.remote_fee),
            Self::RemoteInfee => Some(&obs.remote_infee),
            Self::NumUpdates => Some(&obs.num_updates),
            Self::AmbossFee => Some(&obs.amboss_fee),
            Self::Active => Some(&obs.active),
            Self::Date | Self::Capacity | Self::LocalBalanceRatio => None,
        }
    }
}

impl fmt::Display for SeriesField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a measured field is bounded after coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipPolicy {
    Unclipped,
    /// Outbound fee rate: `[0, FEE_LIMIT]`.
    Fee,
    /// Inbound fee, negative means rebate: `[-FEE_LIMIT, FEE_LIMIT]`.
    SignedFee,
}

impl ClipPolicy {
    #[must_use]
    pub const fn bounds(self) -> Option<(f64, f64)> {
        match self {
            Self::Unclipped => None,
            Self::Fee => Some((0.0, FEE_LIMIT)),
            Self::SignedFee => Some((-FEE_LIMIT, FEE_LIMIT)),
        }
    }

    #[must_use]
    pub fn apply(self, value: f64) -> f64 {
        self.bounds().map_or(value, |(lo, hi)| value.clamp(lo, hi))
    }
}

/// Measured fields and their clipping, in coercion order.
pub const FIELD_POLICIES: [(SeriesField, ClipPolicy); 9] = [
    (SeriesField::LocalBalance, ClipPolicy::Unclipped),
    (SeriesField::LocalFee, ClipPolicy::Fee),
    (SeriesField::LocalInfee, ClipPolicy::SignedFee),
    (SeriesField::RemoteBalance, ClipPolicy::Unclipped),
    (SeriesField::RemoteFee, ClipPolicy::Fee),
    (SeriesField::RemoteInfee, ClipPolicy::SignedFee),
    (SeriesField::NumUpdates, ClipPolicy::Unclipped),
    (SeriesField::AmbossFee, ClipPolicy::Fee),
    (SeriesField::Active, ClipPolicy::Unclipped),
];

/// Clip policy for `field`; derived columns are never clipped.
#[must_use]
pub fn policy_for(field: SeriesField) -> ClipPolicy {
    FIELD_POLICIES
        .iter()
        .find(|(f, _)| *f == field)
        .map_or(ClipPolicy::Unclipped, |(_, policy)| *policy)
}
