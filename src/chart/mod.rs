//! Chart descriptors for the channel dashboard.

pub mod builder;
pub mod color;
pub mod metrics;

pub use builder::{ChartDescriptor, build_chart};
pub use metrics::{MetricSpec, build_chart_set, standard_metrics};
