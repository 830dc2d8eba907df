//! Series normalizer: raw observations → uniform numeric table.
//!
//! Coercion and clipping follow [`FIELD_POLICIES`]. Missing or malformed
//! readings become `0.0`; they are never reported as errors.

#![allow(missing_docs)]

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::series::fields::{FIELD_POLICIES, SeriesField};
use crate::store::rows::ChannelObservation;

/// One cleaned observation. Every numeric column is finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRow {
    pub timestamp: NaiveDateTime,
    pub local_balance: f64,
    pub local_fee: f64,
    pub local_infee: f64,
    pub remote_balance: f64,
    pub remote_fee: f64,
    pub remote_infee: f64,
    pub num_updates: f64,
    pub amboss_fee: f64,
    pub active: f64,
    pub capacity: f64,
    pub local_balance_ratio: f64,
}

impl NormalizedRow {
    /// Numeric value of `field`; `None` for the timestamp column.
    #[must_use]
    pub fn value(&self, field: SeriesField) -> Option<f64> {
        Some(match field {
            SeriesField::Date => return None,
            SeriesField::LocalBalance => self.local_balance,
            SeriesField::LocalFee => self.local_fee,
            SeriesField::LocalInfee => self.local_infee,
            SeriesField::RemoteBalance => self.remote_balance,
            SeriesField::RemoteFee => self.remote_fee,
            SeriesField::RemoteInfee => self.remote_infee,
            SeriesField::NumUpdates => self.num_updates,
            SeriesField::AmbossFee => self.amboss_fee,
            SeriesField::Active => self.active,
            SeriesField::Capacity => self.capacity,
            SeriesField::LocalBalanceRatio => self.local_balance_ratio,
        })
    }

    fn slot_mut(&mut self, field: SeriesField) -> Option<&mut f64> {
        Some(match field {
            SeriesField::LocalBalance => &mut self.local_balance,
            SeriesField::LocalFee => &mut self.local_fee,
            SeriesField::LocalInfee => &mut self.local_infee,
            SeriesField::RemoteBalance => &mut self.remote_balance,
            SeriesField::RemoteFee => &mut self.remote_fee,
            SeriesField::RemoteInfee => &mut self.remote_infee,
            SeriesField::NumUpdates => &mut self.num_updates,
            SeriesField::AmbossFee => &mut self.amboss_fee,
            SeriesField::Active => &mut self.active,
            SeriesField::Date | SeriesField::Capacity | SeriesField::LocalBalanceRatio => {
                return None;
            }
        })
    }
}

/// Cleaned time series for one channel. Empty means "no data", not failure.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NormalizedSeries {
    pub capacity: i64,
    pub rows: Vec<NormalizedRow>,
}

impl NormalizedSeries {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Values of a numeric column, `None` for the timestamp column.
    #[must_use]
    pub fn column(&self, field: SeriesField) -> Option<Vec<f64>> {
        self.rows.iter().map(|row| row.value(field)).collect()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.rows.iter().map(|row| row.timestamp)
    }
}

/// Local balance as a percentage of capacity, rounded to 2 decimals.
///
/// Zero when the capacity is unknown or non-positive.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn balance_ratio(local_balance: f64, capacity: i64) -> f64 {
    if capacity <= 0 {
        return 0.0;
    }
    round2(local_balance / capacity as f64 * 100.0)
}

/// Round half-to-even at two decimals.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Clean `observations` and derive the balance ratio against `capacity`.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn normalize(observations: &[ChannelObservation], capacity: i64) -> NormalizedSeries {
    let rows = observations
        .iter()
        .map(|obs| {
            let mut row = NormalizedRow {
                timestamp: obs.timestamp,
                local_balance: 0.0,
                local_fee: 0.0,
                local_infee: 0.0,
                remote_balance: 0.0,
                remote_fee: 0.0,
                remote_infee: 0.0,
                num_updates: 0.0,
                amboss_fee: 0.0,
                active: 0.0,
                capacity: capacity as f64,
                local_balance_ratio: 0.0,
            };
            for (field, policy) in FIELD_POLICIES {
                let coerced = field.raw(obs).and_then(|raw| raw.as_f64()).unwrap_or(0.0);
                if let Some(slot) = row.slot_mut(field) {
                    *slot = policy.apply(coerced);
                }
            }
            row.local_balance_ratio = balance_ratio(row.local_balance, capacity);
            row
        })
        .collect();

    NormalizedSeries { capacity, rows }
}
