//! Chart descriptors built from a normalized series.
//!
//! A descriptor is everything a renderer needs for one metric: points with
//! hover text, the y-axis window, and whether a dotted trend line is drawn.
//! Building never fails; missing data yields a `no_data` descriptor.

#![allow(missing_docs)]

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::chart::color::ChartColor;
use crate::series::fields::SeriesField;
use crate::series::normalize::NormalizedSeries;

/// A trend overlay is drawn only above this many points.
pub const TREND_MIN_POINTS: usize = 30;

/// Title suffix for charts without data.
pub const NO_DATA_SUFFIX: &str = " (no data)";

pub const MARKER_SIZE: u32 = 6;
pub const MARKER_OPACITY: f64 = 0.7;
pub const TREND_OPACITY: f64 = 0.3;
pub const X_TICK_FORMAT: &str = "%m/%d %H:%M";

/// Horizontal coordinate of a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum XValue {
    Time(NaiveDateTime),
    Number(f64),
}

impl fmt::Display for XValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Time(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: XValue,
    pub y: f64,
    pub hover: String,
}

impl ChartPoint {
    fn new(x: XValue, y: f64) -> Self {
        Self {
            hover: hover_label(&x, y),
            x,
            y,
        }
    }
}

/// `zero_anchored` tells the renderer the axis should not dip below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeMode {
    Normal,
    ZeroAnchored,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YAxisRange {
    pub min: f64,
    pub max: f64,
    pub mode: RangeMode,
}

impl YAxisRange {
    /// Padded window around `[lo, hi]`.
    ///
    /// Flat series get at least one unit of padding. Non-negative series are
    /// floored at zero unless `allow_negative` is set.
    #[must_use]
    pub fn around(lo: f64, hi: f64, allow_negative: bool) -> Self {
        let margin = if hi > lo {
            (hi - lo) * 0.1
        } else {
            (lo.abs() * 0.1).max(1.0)
        };
        let lower = lo - margin;
        let upper = hi + margin;
        if allow_negative || lo < 0.0 {
            Self {
                min: lower,
                max: upper,
                mode: RangeMode::Normal,
            }
        } else {
            Self {
                min: lower.max(0.0),
                max: upper,
                mode: RangeMode::ZeroAnchored,
            }
        }
    }
}

/// Dotted line through the same points as the markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendOverlay {
    pub color_rgba: String,
    pub width: u32,
    pub dash: &'static str,
    pub hover: bool,
}

impl TrendOverlay {
    fn for_color(color: &ChartColor) -> Self {
        Self {
            color_rgba: color.rgba(TREND_OPACITY),
            width: 1,
            dash: "dot",
            hover: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDescriptor {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_tick_format: &'static str,
    pub color: ChartColor,
    pub marker_size: u32,
    pub marker_opacity: f64,
    pub points: Vec<ChartPoint>,
    pub trend: Option<TrendOverlay>,
    pub y_range: Option<YAxisRange>,
    pub no_data: bool,
}

impl ChartDescriptor {
    fn empty(title: &str, x_label: String, y_label: &str, color: &ChartColor) -> Self {
        Self {
            title: format!("{title}{NO_DATA_SUFFIX}"),
            x_label,
            y_label: y_label.to_string(),
            x_tick_format: X_TICK_FORMAT,
            color: color.clone(),
            marker_size: MARKER_SIZE,
            marker_opacity: MARKER_OPACITY,
            points: Vec::new(),
            trend: None,
            y_range: None,
            no_data: true,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn y_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.y)
    }
}

/// `"{x}<br>value: {y:.2}"`.
#[must_use]
pub fn hover_label(x: &XValue, y: f64) -> String {
    format!("{x}<br>value: {y:.2}")
}

fn axis_label(field: Option<SeriesField>, raw: &str) -> String {
    match field {
        Some(SeriesField::Date) => "Date".to_string(),
        _ => raw.to_string(),
    }
}

fn x_values(series: &NormalizedSeries, field: SeriesField) -> Vec<XValue> {
    match series.column(field) {
        Some(values) => values.into_iter().map(XValue::Number).collect(),
        None => series.timestamps().map(XValue::Time).collect(),
    }
}

/// Build the descriptor for `y_field` plotted against `x_field`.
///
/// Unknown field names and empty series produce a `no_data` descriptor.
#[must_use]
pub fn build_chart(
    series: &NormalizedSeries,
    x_field: &str,
    y_field: &str,
    title: &str,
    y_label: &str,
    color: &ChartColor,
    allow_negative: bool,
) -> ChartDescriptor {
    let x = SeriesField::from_name(x_field);
    let x_label = axis_label(x, x_field);
    let (Some(x), Some(y)) = (x, SeriesField::from_name(y_field)) else {
        tracing::debug!(x_field, y_field, "unknown chart field");
        return ChartDescriptor::empty(title, x_label, y_label, color);
    };
    let Some(ys) = series.column(y).filter(|ys| !ys.is_empty()) else {
        return ChartDescriptor::empty(title, x_label, y_label, color);
    };

    let points: Vec<ChartPoint> = x_values(series, x)
        .into_iter()
        .zip(ys)
        .map(|(x, y)| ChartPoint::new(x, y))
        .collect();

    let (lo, hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.y), hi.max(p.y))
        });
    let trend = (points.len() > TREND_MIN_POINTS).then(|| TrendOverlay::for_color(color));

    ChartDescriptor {
        title: title.to_string(),
        x_label,
        y_label: y_label.to_string(),
        x_tick_format: X_TICK_FORMAT,
        color: color.clone(),
        marker_size: MARKER_SIZE,
        marker_opacity: MARKER_OPACITY,
        points,
        trend,
        y_range: Some(YAxisRange::around(lo, hi, allow_negative)),
        no_data: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::normalize::normalize;
    use crate::store::rows::{ChannelObservation, RawValue};
    use chrono::{NaiveDate, TimeDelta};

    fn blue() -> ChartColor {
        ChartColor::parse("blue").unwrap()
    }

    fn fee_series(fees: &[i64]) -> NormalizedSeries {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let observations: Vec<_> = fees
            .iter()
            .enumerate()
            .map(|(i, fee)| ChannelObservation {
                local_fee: RawValue::Integer(*fee),
                local_infee: RawValue::Integer(-*fee),
                ..ChannelObservation::at(start + TimeDelta::hours(i64::try_from(i).unwrap()))
            })
            .collect();
        normalize(&observations, 1_000_000)
    }

    fn chart(series: &NormalizedSeries, y: &str, allow_negative: bool) -> ChartDescriptor {
        build_chart(series, "date", y, "Local fee rate", "Fee rate (ppm)", &blue(), allow_negative)
    }

    #[test]
    fn empty_series_is_no_data() {
        let desc = chart(&NormalizedSeries::default(), "local_fee", false);
        assert!(desc.no_data);
        assert!(desc.is_empty());
        assert_eq!(desc.title, "Local fee rate (no data)");
        assert!(desc.trend.is_none());
        assert!(desc.y_range.is_none());
    }

    #[test]
    fn unknown_field_is_no_data() {
        let series = fee_series(&[1, 2, 3]);
        let desc = chart(&series, "fee", false);
        assert!(desc.no_data);
        let desc = build_chart(&series, "when", "local_fee", "t", "y", &blue(), false);
        assert!(desc.no_data);
        assert_eq!(desc.x_label, "when");
    }

    #[test]
    fn trend_needs_more_than_thirty_points() {
        let thirty = chart(&fee_series(&[10; 30]), "local_fee", false);
        assert_eq!(thirty.len(), 30);
        assert!(thirty.trend.is_none());

        let thirty_one = chart(&fee_series(&[10; 31]), "local_fee", false);
        let trend = thirty_one.trend.unwrap();
        assert_eq!(trend.color_rgba, "rgba(0,0,255,0.3)");
        assert_eq!(trend.dash, "dot");
        assert_eq!(trend.width, 1);
        assert!(!trend.hover);
    }

    #[test]
    fn flat_series_pads_by_one() {
        let desc = chart(&fee_series(&[5, 5, 5]), "local_fee", false);
        let range = desc.y_range.unwrap();
        assert_eq!((range.min, range.max), (4.0, 6.0));
        assert_eq!(range.mode, RangeMode::ZeroAnchored);
    }

    #[test]
    fn flat_large_series_pads_by_ten_percent() {
        let desc = chart(&fee_series(&[200, 200]), "local_fee", false);
        let range = desc.y_range.unwrap();
        assert_eq!((range.min, range.max), (180.0, 220.0));
    }

    #[test]
    fn non_negative_range_is_floored_at_zero() {
        let desc = chart(&fee_series(&[0, 100]), "local_fee", false);
        let range = desc.y_range.unwrap();
        assert_eq!(range.min, 0.0);
        assert!((range.max - 110.0).abs() < 1e-9);
        assert_eq!(range.mode, RangeMode::ZeroAnchored);
    }

    #[test]
    fn negative_values_use_normal_mode() {
        let desc = chart(&fee_series(&[0, 100]), "local_infee", true);
        let range = desc.y_range.unwrap();
        assert!((range.min + 110.0).abs() < 1e-9);
        assert!((range.max - 10.0).abs() < 1e-9);
        assert_eq!(range.mode, RangeMode::Normal);

        // A negative minimum unlocks the lower bound even without the flag.
        let desc = chart(&fee_series(&[0, 100]), "local_infee", false);
        assert_eq!(desc.y_range.unwrap().mode, RangeMode::Normal);
    }

    #[test]
    fn allow_negative_keeps_unfloored_lower_bound() {
        let desc = chart(&fee_series(&[0, 0]), "local_fee", true);
        let range = desc.y_range.unwrap();
        assert_eq!((range.min, range.max), (-1.0, 1.0));
        assert_eq!(range.mode, RangeMode::Normal);
    }

    #[test]
    fn hover_text_and_point_order() {
        let desc = chart(&fee_series(&[100, 2500]), "local_fee", false);
        assert_eq!(desc.points[0].hover, "2024-06-01 00:00:00<br>value: 100.00");
        assert_eq!(desc.points[1].hover, "2024-06-01 01:00:00<br>value: 2500.00");
        assert_eq!(desc.y_values().collect::<Vec<_>>(), vec![100.0, 2500.0]);
        assert_eq!(desc.x_label, "Date");
    }

    #[test]
    fn numeric_x_axis() {
        let series = fee_series(&[1, 2]);
        let desc = build_chart(&series, "local_fee", "local_infee", "t", "y", &blue(), true);
        assert_eq!(desc.points[1].x, XValue::Number(2.0));
        assert_eq!(desc.points[1].hover, "2<br>value: -2.00");
    }

    #[test]
    fn serializes_for_the_shell() {
        let desc = chart(&fee_series(&[7]), "local_fee", false);
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json["color"], "blue");
        assert_eq!(json["points"][0]["x"], "2024-06-01T00:00:00");
        assert_eq!(json["y_range"]["mode"], "zero_anchored");
        assert_eq!(json["no_data"], false);
    }
}
