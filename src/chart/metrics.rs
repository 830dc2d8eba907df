//! The seven dashboard metrics and their presentation.

use serde::Serialize;

use crate::chart::builder::{ChartDescriptor, build_chart};
use crate::chart::color::ChartColor;
use crate::core::config::ChartColors;
use crate::core::errors::Result;
use crate::series::fields::SeriesField;
use crate::series::normalize::NormalizedSeries;

/// Static part of a metric: what is plotted and how it is labelled.
struct MetricTemplate {
    key: &'static str,
    field: SeriesField,
    title: &'static str,
    y_label: &'static str,
    allow_negative: bool,
}

const TEMPLATES: [MetricTemplate; 7] = [
    MetricTemplate {
        key: "balance_ratio",
        field: SeriesField::LocalBalanceRatio,
        title: "Local balance ratio",
        y_label: "Local balance ratio (%)",
        allow_negative: false,
    },
    MetricTemplate {
        key: "local_fee",
        field: SeriesField::LocalFee,
        title: "Local fee rate",
        y_label: "Fee rate (ppm)",
        allow_negative: false,
    },
    MetricTemplate {
        key: "local_infee",
        field: SeriesField::LocalInfee,
        title: "Local inbound fee",
        y_label: "Inbound fee (sat)",
        allow_negative: true,
    },
    MetricTemplate {
        key: "remote_fee",
        field: SeriesField::RemoteFee,
        title: "Remote fee rate",
        y_label: "Fee rate (ppm)",
        allow_negative: false,
    },
    MetricTemplate {
        key: "remote_infee",
        field: SeriesField::RemoteInfee,
        title: "Remote inbound fee",
        y_label: "Inbound fee (sat)",
        allow_negative: true,
    },
    MetricTemplate {
        key: "amboss_fee",
        field: SeriesField::AmbossFee,
        title: "Amboss fee",
        y_label: "Fee (sat)",
        allow_negative: false,
    },
    MetricTemplate {
        key: "active",
        field: SeriesField::Active,
        title: "Channel status",
        y_label: "Status (0=inactive, 1=active)",
        allow_negative: false,
    },
];

/// One chart on the dashboard, with its configured color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSpec {
    pub key: &'static str,
    pub field: SeriesField,
    pub title: &'static str,
    pub y_label: &'static str,
    pub color: ChartColor,
    pub allow_negative: bool,
}

impl MetricSpec {
    #[must_use]
    pub fn build(&self, series: &NormalizedSeries) -> ChartDescriptor {
        build_chart(
            series,
            SeriesField::Date.name(),
            self.field.name(),
            self.title,
            self.y_label,
            &self.color,
            self.allow_negative,
        )
    }
}

/// The seven metric specs in dashboard order, colored from `colors`.
pub fn standard_metrics(colors: &ChartColors) -> Result<Vec<MetricSpec>> {
    let configured = colors.entries();
    TEMPLATES
        .iter()
        .map(|t| {
            let raw = configured
                .iter()
                .find(|(key, _)| *key == t.key)
                .map_or("", |(_, raw)| *raw);
            Ok(MetricSpec {
                key: t.key,
                field: t.field,
                title: t.title,
                y_label: t.y_label,
                color: colors.resolve(t.key, raw)?,
                allow_negative: t.allow_negative,
            })
        })
        .collect()
}

/// One descriptor per metric, in the order of `metrics`.
#[must_use]
pub fn build_chart_set(series: &NormalizedSeries, metrics: &[MetricSpec]) -> Vec<ChartDescriptor> {
    metrics.iter().map(|m| m.build(series)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_follow_dashboard_order() {
        let metrics = standard_metrics(&ChartColors::default()).unwrap();
        let keys: Vec<_> = metrics.iter().map(|m| m.key).collect();
        assert_eq!(
            keys,
            vec![
                "balance_ratio",
                "local_fee",
                "local_infee",
                "remote_fee",
                "remote_infee",
                "amboss_fee",
                "active"
            ]
        );
        let colors: Vec<_> = metrics.iter().map(|m| m.color.name().to_string()).collect();
        assert_eq!(
            colors,
            vec!["blue", "red", "green", "purple", "orange", "teal", "darkblue"]
        );
    }

    #[test]
    fn only_inbound_fees_allow_negative() {
        let metrics = standard_metrics(&ChartColors::default()).unwrap();
        let negative: Vec<_> = metrics
            .iter()
            .filter(|m| m.allow_negative)
            .map(|m| m.field)
            .collect();
        assert_eq!(negative, vec![SeriesField::LocalInfee, SeriesField::RemoteInfee]);
    }

    #[test]
    fn bad_color_is_rejected() {
        let colors = ChartColors {
            amboss_fee: "not-a-color".to_string(),
            ..ChartColors::default()
        };
        let err = standard_metrics(&colors).unwrap_err();
        assert_eq!(err.code(), "LNV-1001");
        assert!(err.to_string().contains("chart.colors.amboss_fee"));
    }

    #[test]
    fn empty_series_gives_seven_no_data_charts() {
        let metrics = standard_metrics(&ChartColors::default()).unwrap();
        let charts = build_chart_set(&NormalizedSeries::default(), &metrics);
        assert_eq!(charts.len(), 7);
        assert!(charts.iter().all(|c| c.no_data && c.points.is_empty()));
        assert_eq!(charts[6].title, "Channel status (no data)");
    }
}
