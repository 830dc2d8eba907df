#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, params};
use tempfile::TempDir;

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_lnv") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) { "lnv.exe" } else { "lnv" };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve lnv binary path for integration test"),
    }
}

pub fn run_cli_case(case_name: &str, args: &[&str]) -> CmdResult {
    run_cli_case_with_env(case_name, args, &[])
}

/// Run `lnv` with a scrubbed environment plus `env`.
///
/// `HOME` points at an empty temp dir so the user's real config never leaks in.
pub fn run_cli_case_with_env(case_name: &str, args: &[&str], env: &[(&str, &str)]) -> CmdResult {
    let root = std::env::temp_dir().join("lnv-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");
    let home = tempfile::tempdir().expect("create temp home");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command
        .args(args)
        .env("HOME", home.path())
        .env("RUST_BACKTRACE", "1")
        .env_remove("RUST_LOG")
        .env_remove("LNV_OUTPUT_FORMAT");
    for (key, _) in std::env::vars() {
        if key.starts_with("LNV_") {
            command.env_remove(key);
        }
    }
    for (key, value) in env {
        command.env(key, value);
    }
    let output = command.output().expect("execute lnv command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("env={env:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

/// Parse the single JSON line a `--json` command prints.
pub fn json_line(result: &CmdResult) -> serde_json::Value {
    let line = result
        .stdout
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_else(|| panic!("no stdout; log: {}", result.log_path.display()));
    serde_json::from_str(line)
        .unwrap_or_else(|e| panic!("bad json ({e}); log: {}", result.log_path.display()))
}

// ──────────────────── fixture database ────────────────────

const SCHEMA: &str = "
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

/// Temp dir holding a collector database and a config file that points at it.
pub struct Fixture {
    pub dir: TempDir,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
}

impl Fixture {
    /// Two channels: "ACINQ" with 40 daily observations from 2024-05-01, and
    /// "Quiet" with none.
    pub fn standard() -> Self {
        let fixture = Self::empty();
        let conn = fixture.connect();
        conn.execute(
            "INSERT INTO channel_lists VALUES ('ACINQ', '800x1x0', 1000000)",
            [],
        )
        .expect("insert channel");
        conn.execute("INSERT INTO channel_lists VALUES ('Quiet', '801x0x0', 500000)", [])
            .expect("insert channel");

        let start = chrono::NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date");
        for offset in 0..40_i64 {
            let date = start + chrono::TimeDelta::days(offset);
            conn.execute(
                "INSERT INTO channel_datas VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, 0, ?7, 0, 1)",
                params![
                    "800x1x0",
                    format!("{} 09:00:00", date.format("%Y-%m-%d")),
                    100_000 + offset * 1_000,
                    250 + offset,
                    -offset,
                    300,
                    offset,
                ],
            )
            .expect("insert observation");
        }
        fixture
    }

    /// Schema only.
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().expect("create fixture dir");
        let db_path = dir.path().join("lightning_node.db");
        let config_path = dir.path().join("config.toml");
        Connection::open(&db_path)
            .and_then(|conn| conn.execute_batch(SCHEMA))
            .expect("create schema");
        // Relative path: resolved against the config file's directory.
        fs::write(&config_path, "[database]\npath = \"lightning_node.db\"\n")
            .expect("write config");
        Self {
            dir,
            db_path,
            config_path,
        }
    }

    pub fn connect(&self) -> Connection {
        Connection::open(&self.db_path).expect("open fixture db")
    }

    pub fn config_arg(&self) -> &str {
        self.config_path.to_str().expect("utf-8 temp path")
    }

    pub fn write_config(&self, body: &str) {
        fs::write(&self.config_path, body).expect("write config");
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

pub fn assert_exit(result: &CmdResult, code: i32) {
    assert_eq!(
        result.status.code(),
        Some(code),
        "unexpected exit status; log: {}",
        result.log_path.display()
    );
}
