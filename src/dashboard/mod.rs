//! Dashboard orchestration over the store, normalizer and chart builder.

pub mod gate;
pub mod pipeline;
pub mod snapshot;

pub use gate::RequestGate;
pub use pipeline::{Dashboard, PipelineRun};
pub use snapshot::{SnapshotCell, SnapshotColumn, SnapshotTable, format_capacity};
