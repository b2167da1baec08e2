//! CLI for the cryptobeta dashboard.
//!
//! This binary lists the tradable universe, runs single beta updates, and
//! provides an interactive `watch` mode where every change of interval or
//! selection starts a new update cycle.

use clap::{Parser, Subcommand, ValueEnum};
use cryptobeta::{
    BetaError, BinanceClient, Dashboard, DashboardConfig, Interval, PlotFrame, UpdateOutcome,
    UpdateRequest,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cryptobeta")]
#[command(about = "Beta of crypto assets against BTC", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Market data host, overrides the configuration
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Candles per fetch (1-1000), overrides the configuration
    #[arg(long, global = true)]
    limit: Option<u16>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List the base symbol, selectable alts and intervals
    Symbols,
    /// Compute betas once and print them
    Beta {
        /// Alts to plot (default: the first configured alt)
        symbols: Vec<String>,
        /// Candlestick interval (5m, 15m, 1h, 4h, 1d)
        #[arg(short, long)]
        interval: Option<Interval>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Read selection changes from stdin and recompute on every change
    Watch {
        /// Initially selected alts (default: the first configured alt)
        symbols: Vec<String>,
        /// Initial candlestick interval
        #[arg(short, long)]
        interval: Option<Interval>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Aligned text table
    Table,
    /// Plotly-compatible JSON frame
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> cryptobeta::Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Symbols => {
            list_symbols(&config);
            Ok(())
        }
        Commands::Beta {
            symbols,
            interval,
            format,
        } => compute_once(&config, symbols, interval, format).await,
        Commands::Watch {
            symbols,
            interval,
            format,
        } => watch(&config, symbols, interval, format).await,
    }
}

/// Load the configuration file (if any) and apply command-line overrides.
fn load_config(cli: &Cli) -> cryptobeta::Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_path(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url.clone_from(base_url);
    }
    if cli.limit.is_some() {
        config.limit = cli.limit;
    }
    config.validate()?;
    debug!(?config, "configuration loaded");
    Ok(config)
}

fn build_dashboard(config: &DashboardConfig) -> cryptobeta::Result<Dashboard<BinanceClient>> {
    Ok(Dashboard::new(
        BinanceClient::from_config(config)?,
        config.universe()?,
    ))
}

/// Selection to use when none is given: the first configured alt.
fn default_selection(config: &DashboardConfig, symbols: Vec<String>) -> Vec<String> {
    if symbols.is_empty() {
        config
            .symbols
            .iter()
            .take(1)
            .map(ToString::to_string)
            .collect()
    } else {
        symbols
    }
}

/// List the base symbol, selectable alts and intervals.
fn list_symbols(config: &DashboardConfig) {
    println!("Base: {}\n", config.base_symbol);
    println!("Alts:");
    for symbol in &config.symbols {
        println!("  {symbol}");
    }
    println!();
    let intervals: Vec<&str> = Interval::ALL.iter().map(Interval::as_str).collect();
    println!("Intervals: {} (default {})", intervals.join(", "), config.interval);
}

/// Run a single update cycle and print the frame.
async fn compute_once(
    config: &DashboardConfig,
    symbols: Vec<String>,
    interval: Option<Interval>,
    format: Format,
) -> cryptobeta::Result<()> {
    let dashboard = build_dashboard(config)?;
    let request = UpdateRequest::new(
        interval.unwrap_or(config.interval),
        default_selection(config, symbols),
    );

    if let UpdateOutcome::Applied(frame) = dashboard.update(&request).await? {
        print_frame(&frame, format)?;
    }
    Ok(())
}

/// Print a frame in the requested format.
fn print_frame(frame: &PlotFrame, format: Format) -> cryptobeta::Result<()> {
    match format {
        Format::Table => print!("{}", frame.render_table()),
        Format::Json => println!("{}", serde_json::to_string_pretty(frame)?),
    }
    Ok(())
}

/// A line typed in watch mode.
#[derive(Debug, PartialEq, Eq)]
enum WatchCommand {
    /// Change the interval
    Interval(Interval),
    /// Replace the selected alts
    Select(Vec<String>),
    /// Print the frame on display
    Show,
    /// Stop watching
    Quit,
}

/// Parse one watch-mode line. Blank lines yield `None`.
fn parse_command(line: &str) -> Option<Result<WatchCommand, BetaError>> {
    let mut words = line.split_whitespace();
    let command = words.next()?;
    let parsed = match command {
        "interval" | "i" => match words.next() {
            Some(value) => value.parse().map(WatchCommand::Interval),
            None => Err(BetaError::UnknownInterval(String::new())),
        },
        "select" | "s" => Ok(WatchCommand::Select(
            words.map(|w| w.to_ascii_uppercase()).collect(),
        )),
        "show" => Ok(WatchCommand::Show),
        "quit" | "exit" | "q" => Ok(WatchCommand::Quit),
        other => Err(BetaError::Config(format!(
            "unknown command {other:?}, expected interval, select, show or quit"
        ))),
    };
    Some(parsed)
}

/// Interactive mode: every change starts a new cycle in its own task.
///
/// Cycles may overlap; a cycle that finishes after a newer one started is
/// discarded by the dashboard, so only the latest selection is ever shown.
async fn watch(
    config: &DashboardConfig,
    symbols: Vec<String>,
    interval: Option<Interval>,
    format: Format,
) -> cryptobeta::Result<()> {
    let dashboard = Arc::new(build_dashboard(config)?);
    let mut request = UpdateRequest::new(
        interval.unwrap_or(config.interval),
        default_selection(config, symbols),
    );
    let mut pending = vec![spawn_cycle(&dashboard, request.clone(), format)];

    eprintln!("Commands: interval <5m|15m|1h|4h|1d>, select <SYMBOL...>, show, quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            None => continue,
            Some(Ok(command)) => command,
            Some(Err(err)) => {
                eprintln!("Error: {err}");
                continue;
            }
        };

        match command {
            WatchCommand::Interval(interval) => request.interval = interval,
            WatchCommand::Select(symbols) => {
                if let Err(err) = dashboard.universe().select(symbols.as_slice()) {
                    eprintln!("Error: {err}");
                    continue;
                }
                request.symbols = symbols;
            }
            WatchCommand::Show => {
                match dashboard.current() {
                    Some(frame) => print_frame(&frame, format)?,
                    None => eprintln!("Nothing on display yet"),
                }
                continue;
            }
            WatchCommand::Quit => break,
        }
        pending.retain(|handle| !handle.is_finished());
        pending.push(spawn_cycle(&dashboard, request.clone(), format));
    }

    for handle in pending {
        if let Err(err) = handle.await {
            error!(%err, "update task failed");
        }
    }
    Ok(())
}

/// Start a cycle for `request` in the background and print its frame if applied.
fn spawn_cycle(
    dashboard: &Arc<Dashboard<BinanceClient>>,
    request: UpdateRequest,
    format: Format,
) -> JoinHandle<()> {
    let dashboard = Arc::clone(dashboard);
    tokio::spawn(async move {
        // Failures are logged by the dashboard and the previous frame stays up.
        if let Ok(UpdateOutcome::Applied(frame)) = dashboard.update(&request).await
            && let Err(err) = print_frame(&frame, format)
        {
            error!(%err, "failed to print frame");
        }
    })
}
