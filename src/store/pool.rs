//! Read-only SQLite connection pool over the collector database.

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};

use crate::core::config::DatabaseConfig;
use crate::core::errors::{LnvError, Result};

pub type ReadPool = Pool<SqliteConnectionManager>;

/// How long a checkout waits for a free connection before giving up.
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a read-only pool for `config.path`.
///
/// The collector owns the file; a missing file is a hard failure here rather
/// than something to create.
pub fn open_read_only_pool(config: &DatabaseConfig) -> Result<ReadPool> {
    let path = &config.path;
    if !path.is_file() {
        tracing::warn!(path = %path.display(), "channel database not found");
        return Err(LnvError::data_unavailable(path, "database file not found"));
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
        | OpenFlags::SQLITE_OPEN_NO_MUTEX
        | OpenFlags::SQLITE_OPEN_URI;
    let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
    let manager = SqliteConnectionManager::file(path)
        .with_flags(flags)
        .with_init(move |conn: &mut Connection| {
            conn.busy_timeout(busy_timeout)?;
            conn.pragma_update(None, "query_only", true)
        });

    Pool::builder()
        .max_size(config.pool_size)
        .min_idle(Some(1))
        .connection_timeout(CHECKOUT_TIMEOUT)
        .build(manager)
        .map_err(|err| {
            tracing::error!(path = %path.display(), error = %err, "failed to open channel database");
            LnvError::data_unavailable(path, format!("open failed: {err}"))
        })
}
