#![forbid(unsafe_code)]

//! Lightning Node Viewer (lnv): read-only telemetry dashboard core for a
//! Lightning node's channels.
//!
//! A separate collector records channel state into SQLite. This crate reads
//! it back and turns it into chart descriptors:
//! 1. **Store** reads channel lists and observation history read-only
//! 2. **Series** bounds the history window and normalizes raw readings
//! 3. **Chart** builds one descriptor per dashboard metric
//! 4. **Dashboard** wires the entry points and serializes refreshes
//!
//! # Library usage
//!
//! ```rust,no_run
//! use lightning_node_viewer::prelude::*;
//!
//! # fn main() -> lightning_node_viewer::core::errors::Result<()> {
//! let config = Config::load(None)?;
//! let dashboard = Dashboard::new(ChannelStore::open(&config.database)?, &config.chart)?;
//! let run = dashboard.refresh("ACINQ", Period::OneWeek)?;
//! for chart in &run.charts {
//!     println!("{}: {} points", chart.title, chart.points.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub mod chart;
pub mod core;
pub mod dashboard;
pub mod series;
pub mod store;
