//! Throwaway collector databases for unit tests.

#![allow(clippy::missing_panics_doc)]

use std::path::PathBuf;

use rusqlite::{Connection, params};
use tempfile::TempDir;

use crate::core::config::DatabaseConfig;

pub const SCHEMA: &str = "
CREATE TABLE channel_lists (
    channel_name TEXT,
    channel_id TEXT,
    capacity INTEGER
);
CREATE TABLE channel_datas (
    channel_id TEXT,
    date TEXT,
    local_balance INTEGER,
    local_fee INTEGER,
    local_infee INTEGER,
    remote_balance INTEGER,
    remote_fee INTEGER,
    remote_infee INTEGER,
    num_updates INTEGER,
    amboss_fee INTEGER,
    active INTEGER
);
";

/// Collector database in a temp dir, written through a separate read-write
/// connection.
pub struct FixtureDb {
    conn: Connection,
    pub path: PathBuf,
    _dir: TempDir,
}

impl FixtureDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lightning_node.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        Self {
            conn,
            path,
            _dir: dir,
        }
    }

    pub fn config(&self) -> DatabaseConfig {
        DatabaseConfig {
            path: self.path.clone(),
            pool_size: 2,
            busy_timeout_ms: 1_000,
        }
    }

    pub fn channel(&self, name: &str, id: &str, capacity: Option<i64>) -> &Self {
        self.conn
            .execute(
                "INSERT INTO channel_lists (channel_name, channel_id, capacity) VALUES (?1, ?2, ?3)",
                params![name, id, capacity],
            )
            .unwrap();
        self
    }

    /// Insert a row with only balance, fees and the active flag set.
    pub fn observation(
        &self,
        id: &str,
        date: &str,
        local_balance: i64,
        local_fee: i64,
        remote_fee: i64,
    ) -> &Self {
        self.conn
            .execute(
                "INSERT INTO channel_datas
                    (channel_id, date, local_balance, local_fee, local_infee,
                     remote_balance, remote_fee, remote_infee, num_updates, amboss_fee, active)
                 VALUES (?1, ?2, ?3, ?4, 0, 0, ?5, 0, 1, 0, 1)",
                params![id, date, local_balance, local_fee, remote_fee],
            )
            .unwrap();
        self
    }

    /// Run arbitrary SQL against the fixture, for odd shapes of data.
    pub fn exec(&self, sql: &str) -> &Self {
        self.conn.execute_batch(sql).unwrap();
        self
    }

    /// `days` daily observations for `id` starting on 2024-05-01.
    pub fn daily_series(&self, id: &str, days: u32) -> &Self {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        for offset in 0..days {
            let date = start + chrono::TimeDelta::days(i64::from(offset));
            let stamp = format!("{} 09:00:00", date.format("%Y-%m-%d"));
            self.observation(id, &stamp, 100_000 + i64::from(offset) * 1_000, 250, 300);
        }
        self
    }
}
