//! Dashboard entry points: channel list, observation pipeline, snapshot table.

#![allow(missing_docs)]

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::chart::builder::ChartDescriptor;
use crate::chart::metrics::{MetricSpec, build_chart_set, standard_metrics};
use crate::core::config::ChartConfig;
use crate::core::errors::Result;
use crate::dashboard::gate::RequestGate;
use crate::dashboard::snapshot::{SnapshotColumn, SnapshotTable};
use crate::series::normalize::{NormalizedSeries, normalize};
use crate::series::period::Period;
use crate::store::ChannelStore;
use crate::store::rows::{ChannelInfo, ChannelSummary};

/// Everything one chart refresh produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineRun {
    pub generation: u64,
    pub channel: String,
    pub info: ChannelInfo,
    pub period: Period,
    pub now: NaiveDateTime,
    pub start_date: NaiveDate,
    pub series: NormalizedSeries,
    pub charts: Vec<ChartDescriptor>,
}

pub struct Dashboard {
    store: ChannelStore,
    metrics: Vec<MetricSpec>,
    gate: RequestGate,
}

impl Dashboard {
    /// Resolve chart colors once; a bad color fails here, not per run.
    pub fn new(store: ChannelStore, chart: &ChartConfig) -> Result<Self> {
        Ok(Self {
            store,
            metrics: standard_metrics(&chart.colors)?,
            gate: RequestGate::new(),
        })
    }

    #[must_use]
    pub fn store(&self) -> &ChannelStore {
        &self.store
    }

    #[must_use]
    pub fn metrics(&self) -> &[MetricSpec] {
        &self.metrics
    }

    #[must_use]
    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    /// Channels for the selector, in storage order.
    pub fn channel_summaries(&self) -> Result<Vec<ChannelSummary>> {
        self.store.channel_summaries()
    }

    /// Fetch, normalize and chart `channel_name` over `period` ending at `now`.
    ///
    /// Unknown channels and empty windows give seven `no_data` charts.
    pub fn observation_pipeline(
        &self,
        channel_name: &str,
        period: Period,
        now: NaiveDateTime,
    ) -> Result<PipelineRun> {
        self.gated_run(channel_name, period, || now)
    }

    /// [`Dashboard::observation_pipeline`] against the local wall clock.
    ///
    /// The clock is read after the gate is acquired so a queued refresh does
    /// not use a stale `now`.
    pub fn refresh(&self, channel_name: &str, period: Period) -> Result<PipelineRun> {
        self.gated_run(channel_name, period, || Local::now().naive_local())
    }

    /// Latest state of every channel, projected onto `columns`.
    pub fn snapshot(&self, columns: &[SnapshotColumn]) -> Result<SnapshotTable> {
        let rows = self.store.latest_snapshot()?;
        Ok(SnapshotTable::project(&rows, columns))
    }

    fn gated_run(
        &self,
        channel_name: &str,
        period: Period,
        clock: impl FnOnce() -> NaiveDateTime,
    ) -> Result<PipelineRun> {
        self.gate.run(|generation| -> Result<PipelineRun> {
            let now = clock();
            let start_date = period.start_date(now);
            let span = tracing::debug_span!(
                "pipeline",
                generation,
                channel = channel_name,
                period = period.as_str()
            );
            let _entered = span.enter();

            let (info, observations) = self.store.with_snapshot(|snap| {
                let info = snap.channel_info(channel_name)?;
                let observations = match info.id.as_deref() {
                    Some(id) => snap.observations(id, start_date)?,
                    None => Vec::new(),
                };
                Ok((info, observations))
            })?;

            let series = normalize(&observations, info.capacity);
            let charts = build_chart_set(&series, &self.metrics);
            tracing::debug!(
                rows = series.len(),
                %start_date,
                no_data = series.is_empty(),
                "pipeline finished"
            );

            Ok(PipelineRun {
                generation,
                channel: channel_name.to_string(),
                info,
                period,
                now,
                start_date,
                series,
                charts,
            })
        })
    }
}
