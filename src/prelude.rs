//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use lightning_node_viewer::prelude::*;
//! ```

// Core
pub use crate::core::config::{ChartConfig, Config, DatabaseConfig};
pub use crate::core::errors::{LnvError, Result};

// Store
pub use crate::store::rows::{ChannelInfo, ChannelObservation, ChannelSummary, RawValue};
pub use crate::store::{ChannelStore, ReadSnapshot};

// Series
pub use crate::series::fields::SeriesField;
pub use crate::series::normalize::{NormalizedSeries, normalize};
pub use crate::series::period::{Period, resolve_start_date};

// Charts
pub use crate::chart::builder::{ChartDescriptor, RangeMode, build_chart};
pub use crate::chart::color::ChartColor;
pub use crate::chart::metrics::{MetricSpec, build_chart_set, standard_metrics};

// Dashboard
pub use crate::dashboard::{Dashboard, PipelineRun, RequestGate, SnapshotColumn, SnapshotTable};
