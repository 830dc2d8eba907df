//! Property-based tests for normalizer invariants.
//!
//! Arbitrary raw readings (numbers, numeric text, junk, nulls) must always
//! produce finite, clipped columns and a zero-guarded balance ratio.

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use super::fields::{FEE_LIMIT, SeriesField};
use super::normalize::normalize;
use crate::store::rows::{ChannelObservation, RawValue};

// ──────────────────── strategies ────────────────────

fn arb_raw() -> impl Strategy<Value = RawValue> {
    prop_oneof![
        Just(RawValue::Null),
        any::<i64>().prop_map(RawValue::Integer),
        (-1e12f64..1e12).prop_map(RawValue::Real),
        (-5_000_000i64..5_000_000).prop_map(|v| RawValue::Text(v.to_string())),
        "[a-z ]{0,8}".prop_map(RawValue::Text),
        Just(RawValue::Real(f64::INFINITY)),
    ]
}

fn arb_observation() -> impl Strategy<Value = ChannelObservation> {
    (
        0i64..100_000,
        [arb_raw(), arb_raw(), arb_raw(), arb_raw(), arb_raw()],
        [arb_raw(), arb_raw(), arb_raw(), arb_raw()],
    )
        .prop_map(|(minutes, a, b)| {
            let [local_balance, local_fee, local_infee, remote_balance, remote_fee] = a;
            let [remote_infee, num_updates, amboss_fee, active] = b;
            ChannelObservation {
                timestamp: base_time() + chrono::TimeDelta::minutes(minutes),
                local_balance,
                local_fee,
                local_infee,
                remote_balance,
                remote_fee,
                remote_infee,
                num_updates,
                amboss_fee,
                active,
            }
        })
}

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

// ──────────────────── properties ────────────────────

proptest! {
    #[test]
    fn fee_columns_stay_in_range(
        observations in prop::collection::vec(arb_observation(), 0..40),
        capacity in -10i64..10_000_000,
    ) {
        let series = normalize(&observations, capacity);
        prop_assert_eq!(series.len(), observations.len());
        for row in &series.rows {
            for fee in [row.local_fee, row.remote_fee, row.amboss_fee] {
                prop_assert!((0.0..=FEE_LIMIT).contains(&fee), "fee {}", fee);
            }
            for infee in [row.local_infee, row.remote_infee] {
                prop_assert!((-FEE_LIMIT..=FEE_LIMIT).contains(&infee), "infee {}", infee);
            }
        }
    }

    #[test]
    fn every_column_is_finite(
        observations in prop::collection::vec(arb_observation(), 1..20),
        capacity in 0i64..10_000_000,
    ) {
        let series = normalize(&observations, capacity);
        for field in SeriesField::ALL {
            if let Some(values) = series.column(field) {
                prop_assert!(values.iter().all(|v| v.is_finite()), "{} not finite", field);
            }
        }
    }

    #[test]
    fn non_positive_capacity_zeroes_ratio(
        observations in prop::collection::vec(arb_observation(), 1..20),
        capacity in i64::MIN..=0,
    ) {
        let series = normalize(&observations, capacity);
        prop_assert!(series.rows.iter().all(|r| r.local_balance_ratio == 0.0));
    }

    #[test]
    fn capacity_is_broadcast(
        observations in prop::collection::vec(arb_observation(), 1..20),
        capacity in 0i64..21_000_000,
    ) {
        let series = normalize(&observations, capacity);
        #[allow(clippy::cast_precision_loss)]
        let expected = capacity as f64;
        prop_assert!(series.rows.iter().all(|r| r.capacity == expected));
    }
}
