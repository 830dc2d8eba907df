//! Channel queries against the collector tables.
//!
//! Reads only `channel_lists` and `channel_datas`. Every query runs inside a
//! [`ReadSnapshot`] so the queries of one dashboard run see the same data even
//! while the collector keeps writing.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

use crate::core::config::DatabaseConfig;
use crate::core::errors::{LnvError, Result};
use crate::series::normalize::balance_ratio;
use crate::store::pool::{ReadPool, open_read_only_pool};
use crate::store::rows::{
    ChannelInfo, ChannelListing, ChannelObservation, ChannelSummary, RawValue, SnapshotRow,
};

// Ids are compared as text: an untyped `channel_id` column keeps integer ids
// as integers, which never equal a bound text parameter.
const OBSERVATION_SQL: &str = "SELECT date, local_balance, local_fee, local_infee, remote_balance,
        remote_fee, remote_infee, num_updates, amboss_fee, active
 FROM channel_datas
 WHERE CAST(channel_id AS TEXT) = ?1 AND date >= ?2
 ORDER BY date ASC";

const SNAPSHOT_SQL: &str = "SELECT cl.channel_name, cl.channel_id, cl.capacity, cd.date,
        cd.local_balance, cd.local_fee, cd.local_infee, cd.remote_balance,
        cd.remote_fee, cd.remote_infee, cd.num_updates, cd.amboss_fee
 FROM channel_lists cl
 LEFT JOIN channel_datas cd
   ON cd.channel_id = cl.channel_id
  AND cd.date = (SELECT MAX(date) FROM channel_datas WHERE channel_id = cl.channel_id)";

/// Pooled, read-only access to the collector database.
pub struct ChannelStore {
    pool: ReadPool,
    path: PathBuf,
}

impl ChannelStore {
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let pool = open_read_only_pool(config)?;
        tracing::debug!(path = %config.path.display(), pool_size = config.pool_size, "channel store opened");
        Ok(Self {
            pool,
            path: config.path.clone(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against one connection inside a deferred read transaction.
    ///
    /// The transaction is rolled back and the connection handed back to the
    /// pool on every exit path, including errors and panics in `f`.
    pub fn with_snapshot<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ReadSnapshot<'_>) -> Result<T>,
    {
        let mut conn = self.pool.get().map_err(|err| {
            LnvError::data_unavailable(&self.path, format!("connection checkout: {err}"))
        })?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let snapshot = ReadSnapshot { conn: &tx };
        f(&snapshot)
    }

    pub fn list_channels(&self) -> Result<Vec<ChannelListing>> {
        self.with_snapshot(|snap| snap.list_channels())
    }

    pub fn channel_summaries(&self) -> Result<Vec<ChannelSummary>> {
        self.with_snapshot(|snap| snap.channel_summaries())
    }

    pub fn channel_info(&self, name: &str) -> Result<ChannelInfo> {
        self.with_snapshot(|snap| snap.channel_info(name))
    }

    pub fn capacity(&self, id: &str) -> Result<i64> {
        self.with_snapshot(|snap| snap.capacity(id))
    }

    pub fn observations(&self, id: &str, since: NaiveDate) -> Result<Vec<ChannelObservation>> {
        self.with_snapshot(|snap| snap.observations(id, since))
    }

    pub fn latest_snapshot(&self) -> Result<Vec<SnapshotRow>> {
        self.with_snapshot(|snap| snap.latest_snapshot())
    }
}

/// One point-in-time view of the database.
pub struct ReadSnapshot<'conn> {
    conn: &'conn Connection,
}

impl ReadSnapshot<'_> {
    /// Every channel as `(name, id)`, in storage order.
    pub fn list_channels(&self) -> Result<Vec<ChannelListing>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT channel_name, channel_id FROM channel_lists")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ChannelListing {
                    name: text_at(row, 0)?,
                    id: text_at(row, 1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Every channel with its capacity, in storage order.
    pub fn channel_summaries(&self) -> Result<Vec<ChannelSummary>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT channel_id, channel_name, capacity FROM channel_lists")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ChannelSummary {
                    id: text_at(row, 0)?,
                    name: text_at(row, 1)?,
                    capacity: sats_at(row, 2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Resolve a display name. Unknown names give [`ChannelInfo::absent`].
    pub fn channel_info(&self, name: &str) -> Result<ChannelInfo> {
        let id = self
            .conn
            .prepare_cached("SELECT channel_id FROM channel_lists WHERE channel_name = ?1 LIMIT 1")?
            .query_row(params![name], |row| row.get::<_, RawValue>(0))
            .optional()?
            .and_then(RawValue::into_text);

        match id {
            Some(id) => {
                let capacity = self.capacity(&id)?;
                Ok(ChannelInfo {
                    id: Some(id),
                    capacity,
                })
            }
            None => {
                tracing::debug!(channel = name, "channel not found");
                Ok(ChannelInfo::absent())
            }
        }
    }

    /// Capacity in satoshis, 0 when the channel is unknown or has none.
    pub fn capacity(&self, id: &str) -> Result<i64> {
        let capacity = self
            .conn
            .prepare_cached(
                "SELECT capacity FROM channel_lists WHERE CAST(channel_id AS TEXT) = ?1 LIMIT 1",
            )?
            .query_row(params![id], |row| sats_at(row, 0))
            .optional()?;
        Ok(capacity.unwrap_or(0))
    }

    /// Observations dated on or after `since`, oldest first.
    pub fn observations(&self, id: &str, since: NaiveDate) -> Result<Vec<ChannelObservation>> {
        let bound = since.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare_cached(OBSERVATION_SQL)?;
        let raw = stmt
            .query_map(params![id, bound], |row| {
                Ok((
                    row.get::<_, RawValue>(0)?,
                    ChannelObservation {
                        local_balance: row.get(1)?,
                        local_fee: row.get(2)?,
                        local_infee: row.get(3)?,
                        remote_balance: row.get(4)?,
                        remote_fee: row.get(5)?,
                        remote_infee: row.get(6)?,
                        num_updates: row.get(7)?,
                        amboss_fee: row.get(8)?,
                        active: row.get(9)?,
                        ..ChannelObservation::default()
                    },
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut observations = Vec::with_capacity(raw.len());
        for (date, mut obs) in raw {
            let text = date.into_text();
            match text.as_deref().and_then(parse_timestamp) {
                Some(timestamp) => {
                    obs.timestamp = timestamp;
                    observations.push(obs);
                }
                None => {
                    tracing::warn!(channel_id = id, date = ?text, "skipping observation with unparseable date");
                }
            }
        }
        Ok(observations)
    }

    /// Latest observation per channel, LEFT JOINed onto the channel list.
    pub fn latest_snapshot(&self) -> Result<Vec<SnapshotRow>> {
        let mut stmt = self.conn.prepare_cached(SNAPSHOT_SQL)?;
        let rows = stmt
            .query_map([], |row| {
                let capacity = sats_at(row, 2)?;
                let local_balance = number_at(row, 4)?;
                Ok(SnapshotRow {
                    channel_name: text_at(row, 0)?,
                    channel_id: text_at(row, 1)?,
                    capacity,
                    last_updated: row.get::<_, RawValue>(3)?.into_text(),
                    local_balance,
                    local_balance_ratio: balance_ratio(local_balance, capacity),
                    local_fee: number_at(row, 5)?,
                    local_infee: number_at(row, 6)?,
                    remote_balance: number_at(row, 7)?,
                    remote_fee: number_at(row, 8)?,
                    remote_infee: number_at(row, 9)?,
                    num_updates: number_at(row, 10)?,
                    amboss_fee: number_at(row, 11)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn text_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, RawValue>(idx)?.into_text().unwrap_or_default())
}

fn number_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<f64> {
    Ok(row.get::<_, RawValue>(idx)?.as_f64().unwrap_or(0.0))
}

#[allow(clippy::cast_possible_truncation)]
fn sats_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    Ok(number_at(row, idx)? as i64)
}

/// Parse the collector's timestamp text.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS[.f]]`, the `T`-separated forms, RFC 3339 with
/// an offset (converted to UTC) and a bare date (midnight).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for format in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
