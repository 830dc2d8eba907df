//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use lightning_node_viewer::chart::builder::ChartDescriptor;
use lightning_node_viewer::core::config::Config;
use lightning_node_viewer::core::errors::LnvError;
use lightning_node_viewer::dashboard::{
    Dashboard, PipelineRun, SnapshotColumn, SnapshotTable, format_capacity,
};
use lightning_node_viewer::series::period::{PERIOD_CHOICES, Period};
use lightning_node_viewer::store::ChannelStore;
use lightning_node_viewer::store::channels::parse_timestamp;
use lightning_node_viewer::store::rows::ChannelSummary;

/// Lightning Node Viewer: channel telemetry from the collector database.
#[derive(Debug, Parser)]
#[command(
    name = "lnv",
    author,
    version,
    about = "Lightning Node Viewer - channel telemetry dashboard",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// List channels with their capacity.
    Channels,
    /// Show the latest state of every channel.
    Snapshot(SnapshotArgs),
    /// Build the seven metric charts for one channel.
    Charts(ChartsArgs),
    /// View configuration state.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct SnapshotArgs {
    /// Comma-separated columns to show (default: the dashboard's selection).
    #[arg(long, value_delimiter = ',', value_name = "LIST", conflicts_with = "all_columns")]
    columns: Vec<String>,
    /// Show every column.
    #[arg(long)]
    all_columns: bool,
}

#[derive(Debug, Clone, Args)]
struct ChartsArgs {
    /// Channel display name, matched exactly.
    #[arg(value_name = "CHANNEL")]
    channel: String,
    /// History window: 1week, 1month or all. Anything else means all.
    #[arg(long, default_value = "1week", value_name = "PERIOD")]
    period: String,
    /// Evaluate the window as of this time instead of now.
    #[arg(long, value_name = "DATETIME")]
    now: Option<String>,
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    /// Config operation to run.
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print resolved config file path.
    Path,
    /// Print effective merged configuration.
    Show,
    /// Validate configuration and exit.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or configuration.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure, including an unreachable database.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
        }
    }
}

impl From<LnvError> for CliError {
    fn from(err: LnvError) -> Self {
        match err {
            LnvError::InvalidConfig { .. }
            | LnvError::MissingConfig { .. }
            | LnvError::ConfigParse { .. } => Self::User(err.to_string()),
            LnvError::Serialization { .. } => Self::Internal(err.to_string()),
            LnvError::DataUnavailable { .. }
            | LnvError::Sql { .. }
            | LnvError::Io { .. }
            | LnvError::Runtime { .. } => Self::Runtime(err.to_string()),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    let loaded = Config::load(cli.config.as_deref());
    init_tracing(
        cli,
        loaded.as_ref().map_or("info", |cfg| cfg.logging.level.as_str()),
    );
    if let Ok(cfg) = &loaded
        && let Ok(hash) = cfg.stable_hash()
    {
        tracing::debug!(config = %cfg.paths.config_file.display(), %hash, "configuration loaded");
    }

    match &cli.command {
        Command::Channels => run_channels(cli, loaded?),
        Command::Snapshot(args) => run_snapshot(cli, loaded?, args),
        Command::Charts(args) => run_charts(cli, loaded?, args),
        Command::Config(args) => run_config(cli, loaded, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

fn init_tracing(cli: &Cli, config_level: &str) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        config_level
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A second init (tests calling `run` repeatedly) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(!cli.no_color && io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

fn open_dashboard(config: &Config) -> Result<Dashboard, CliError> {
    let store = ChannelStore::open(&config.database)?;
    Ok(Dashboard::new(store, &config.chart)?)
}

// ──────────────────── channels ────────────────────

fn run_channels(cli: &Cli, config: Config) -> Result<(), CliError> {
    let dashboard = open_dashboard(&config)?;
    let channels = dashboard.channel_summaries()?;

    match output_mode(cli) {
        OutputMode::Human => print!("{}", render_channels(&channels)),
        OutputMode::Json => {
            let payload = json!({
                "command": "channels",
                "database": config.database.path.to_string_lossy(),
                "channels": channels,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn render_channels(channels: &[ChannelSummary]) -> String {
    if channels.is_empty() {
        return format!("{}\n", "No channels recorded.".yellow());
    }
    let rows: Vec<Vec<String>> = channels
        .iter()
        .map(|c| vec![c.name.clone(), c.id.clone(), format_capacity(c.capacity)])
        .collect();
    render_table(&["Channel", "Channel ID", "Capacity"], &rows)
}

// ──────────────────── snapshot ────────────────────

fn run_snapshot(cli: &Cli, config: Config, args: &SnapshotArgs) -> Result<(), CliError> {
    let columns = selected_columns(args)?;
    let dashboard = open_dashboard(&config)?;
    let table = dashboard.snapshot(&columns)?;

    match output_mode(cli) {
        OutputMode::Human => print!("{}", render_snapshot(&table)),
        OutputMode::Json => {
            let payload = json!({
                "command": "snapshot",
                "columns": table.columns,
                "rows": table.rows,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn selected_columns(args: &SnapshotArgs) -> Result<Vec<SnapshotColumn>, CliError> {
    if args.all_columns {
        return Ok(SnapshotColumn::ALL.to_vec());
    }
    if args.columns.is_empty() {
        return Ok(SnapshotColumn::DEFAULT.to_vec());
    }
    args.columns
        .iter()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            SnapshotColumn::from_name(raw).ok_or_else(|| {
                let known: Vec<_> = SnapshotColumn::ALL.iter().map(|c| c.name()).collect();
                CliError::User(format!(
                    "unknown column {raw:?}; expected one of: {}",
                    known.join(", ")
                ))
            })
        })
        .collect()
}

fn render_snapshot(table: &SnapshotTable) -> String {
    if table.rows.is_empty() {
        return format!("{}\n", "No channels recorded.".yellow());
    }
    let headers: Vec<&str> = table.columns.iter().map(|c| c.header()).collect();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();
    render_table(&headers, &rows)
}

// ──────────────────── charts ────────────────────

fn run_charts(cli: &Cli, config: Config, args: &ChartsArgs) -> Result<(), CliError> {
    let period = Period::from_selector(&args.period);
    if !PERIOD_CHOICES.contains(&args.period.as_str()) {
        tracing::warn!(period = %args.period, "unknown period, showing full history");
    }
    let now = args.now.as_deref().map(parse_now).transpose()?;

    let dashboard = open_dashboard(&config)?;
    let run = match now {
        Some(now) => dashboard.observation_pipeline(&args.channel, period, now)?,
        None => dashboard.refresh(&args.channel, period)?,
    };

    match output_mode(cli) {
        OutputMode::Human => print!("{}", render_run(&run)),
        OutputMode::Json => {
            let payload = json!({
                "command": "charts",
                "run": serde_json::to_value(&run)?,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn parse_now(raw: &str) -> Result<NaiveDateTime, CliError> {
    if raw.trim().eq_ignore_ascii_case("now") {
        return Ok(Local::now().naive_local());
    }
    parse_timestamp(raw).ok_or_else(|| {
        CliError::User(format!(
            "invalid --now {raw:?}; expected YYYY-MM-DD[ HH:MM:SS] or RFC 3339"
        ))
    })
}

fn render_run(run: &PipelineRun) -> String {
    let mut out = String::new();
    let heading = match run.info.id.as_deref() {
        Some(id) => format!(
            "{} ({id})  capacity {}",
            run.channel.bold(),
            format_capacity(run.info.capacity)
        ),
        None => format!("{} {}", run.channel.bold(), "(channel not found)".yellow()),
    };
    out.push_str(&heading);
    out.push('\n');
    out.push_str(&format!(
        "period {} since {}  {} observations\n\n",
        run.period,
        run.start_date,
        run.series.len()
    ));

    let width = run
        .charts
        .iter()
        .map(|c| c.title.chars().count())
        .max()
        .unwrap_or(0);
    for chart in &run.charts {
        out.push_str(&render_chart_line(chart, width));
        out.push('\n');
    }
    out
}

fn render_chart_line(chart: &ChartDescriptor, width: usize) -> String {
    let title = format!("{:<width$}", chart.title);
    if chart.no_data {
        return format!("{}  {}", title.dimmed(), "-".dimmed());
    }
    let values: Vec<f64> = chart.y_values().collect();
    let (lo, hi) = chart
        .y_range
        .map_or_else(|| min_max(&values), |range| (range.min, range.max));
    let scaled: Vec<f64> = bucket_means(&values, SPARK_WIDTH)
        .into_iter()
        .map(|v| if hi > lo { (v - lo) / (hi - lo) } else { 0.5 })
        .collect();
    let (min, max) = min_max(&values);
    let last = values.last().copied().unwrap_or(0.0);
    let [r, g, b] = chart.color.rgb();
    format!(
        "{title}  {}  last {last:.2}  min {min:.2}  max {max:.2}",
        render_sparkline(&scaled).truecolor(r, g, b)
    )
}

// ──────────────────── config ────────────────────

fn run_config(
    cli: &Cli,
    loaded: Result<Config, LnvError>,
    args: &ConfigArgs,
) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = loaded?;
            match output_mode(cli) {
                OutputMode::Human => {
                    let toml_str = toml::to_string_pretty(&config)
                        .map_err(|e| CliError::Internal(format!("serialize config: {e}")))?;
                    println!("{toml_str}");
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config show",
                        "config": serde_json::to_value(&config)?,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match loaded {
            Ok(config) => {
                let hash = config.stable_hash()?;
                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("{}", "Configuration is valid.".green());
                        println!("  Source: {}", config.paths.config_file.display());
                        println!("  Database: {}", config.database.path.display());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.paths.config_file.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        eprintln!("{} {e}", "Configuration is INVALID:".red());
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": false,
                            "code": e.code(),
                            "error": e.to_string(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Err(CliError::User(format!("invalid config: {e}")))
            }
        },
    }
}

// ──────────────────── output helpers ────────────────────

const SPARK_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SPARK_WIDTH: usize = 48;

/// Render a sparkline from values normalized to `0.0..=1.0`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn render_sparkline(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| {
            let idx = (v.clamp(0.0, 1.0) * 7.0).round() as usize;
            SPARK_CHARS[idx.min(7)]
        })
        .collect()
}

/// Downsample to at most `width` points by averaging equal-sized buckets.
#[allow(clippy::cast_precision_loss)]
fn bucket_means(values: &[f64], width: usize) -> Vec<f64> {
    if values.len() <= width || width == 0 {
        return values.to_vec();
    }
    (0..width)
        .map(|i| {
            let start = i * values.len() / width;
            let end = ((i + 1) * values.len() / width).max(start + 1);
            let bucket = &values[start..end];
            bucket.iter().sum::<f64>() / bucket.len() as f64
        })
        .collect()
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((*v, *v)),
            Some((lo, hi)) => Some((lo.min(*v), hi.max(*v))),
        })
        .unwrap_or((0.0, 0.0))
}

fn render_table<H: AsRef<str>>(headers: &[H], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.as_ref().chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:<w$}", h.as_ref()))
        .collect();
    out.push_str(&header_line.join("  ").bold().to_string());
    out.push('\n');
    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("LNV_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}
