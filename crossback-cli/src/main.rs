//! Crossback CLI: run moving-average crossover backtests.
//!
//! Commands:
//! - `run`: backtest one ticker with parameters from flags
//! - `request`: read an inbound JSON request, print the JSON result
//! - `config`: print the effective settings as TOML

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crossback_core::data::{PriceSeriesProvider, SyntheticProvider, YahooProvider};
use crossback_core::WarmupPolicy;
use crossback_runner::export::{export_json, export_signal_table_csv, render_summary};
use crossback_runner::{run_backtest, BacktestRequest, BacktestResult, RunOptions, Settings};

#[derive(Parser)]
#[command(
    name = "crossback",
    about = "Crossback CLI: moving-average crossover backtester"
)]
struct Cli {
    /// Settings TOML file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest one ticker.
    Run {
        /// Ticker symbol (e.g. AAPL).
        #[arg(long)]
        ticker: String,

        /// Short SMA window in bars.
        #[arg(long)]
        short_window: Option<usize>,

        /// Long SMA window in bars.
        #[arg(long)]
        long_window: Option<usize>,

        /// Starting cash.
        #[arg(long)]
        capital: Option<f64>,

        /// Shares bought on each entry.
        #[arg(long)]
        shares: Option<u64>,

        /// When the crossover may first go long.
        #[arg(long, value_enum)]
        warmup: Option<WarmupArg>,

        /// Use the offline synthetic provider instead of Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Print the full result as JSON instead of the summary.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Print the signal table as CSV instead of the summary.
        #[arg(long, default_value_t = false, conflicts_with = "json")]
        csv: bool,

        /// Trailing signal-table rows to print with the summary.
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Run an inbound JSON request (file or stdin) and print the JSON result.
    Request {
        /// Request file. Reads stdin when omitted.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Use the offline synthetic provider instead of Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
    /// Print the effective settings.
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum WarmupArg {
    ShortWindowIndex,
    BothAveragesDefined,
}

impl From<WarmupArg> for WarmupPolicy {
    fn from(arg: WarmupArg) -> Self {
        match arg {
            WarmupArg::ShortWindowIndex => WarmupPolicy::ShortWindowIndex,
            WarmupArg::BothAveragesDefined => WarmupPolicy::BothAveragesDefined,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match dispatch(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            ticker,
            short_window,
            long_window,
            capital,
            shares,
            warmup,
            synthetic,
            json,
            csv,
            rows,
        } => {
            let mut builder = settings.strategy_defaults()?.to_builder();
            if let Some(n) = short_window {
                builder = builder.short_window(n);
            }
            if let Some(n) = long_window {
                builder = builder.long_window(n);
            }
            if let Some(c) = capital {
                builder = builder.initial_capital(c);
            }
            if let Some(n) = shares {
                builder = builder.share_size(n);
            }
            if let Some(w) = warmup {
                builder = builder.warmup(w.into());
            }
            let request = BacktestRequest::new(&ticker, builder.build()?)?;

            let result = execute(&settings, &request, synthetic)?;
            if json {
                println!("{}", export_json(&result)?);
            } else if csv {
                print!("{}", export_signal_table_csv(&result.signal_table)?);
            } else {
                print_summary(&result, rows);
            }
            Ok(())
        }
        Commands::Request { file, synthetic } => {
            let body = read_request(file.as_deref())?;
            let request = BacktestRequest::from_json(&body, &settings.strategy_defaults()?)?;
            let result = execute(&settings, &request, synthetic)?;
            println!("{}", export_json(&result)?);
            Ok(())
        }
        Commands::Config => {
            print!(
                "{}",
                settings
                    .to_toml_string()
                    .context("failed to render settings")?
            );
            Ok(())
        }
    }
}

fn execute(settings: &Settings, request: &BacktestRequest, synthetic: bool) -> Result<BacktestResult> {
    let provider = build_provider(settings, synthetic)?;
    info!(
        ticker = %request.stock_ticker,
        provider = provider.name(),
        "running backtest"
    );
    let result = run_backtest(request, provider.as_ref(), &RunOptions::from(settings))
        .with_context(|| format!("backtest failed for {}", request.stock_ticker))?;
    Ok(result)
}

fn build_provider(settings: &Settings, synthetic: bool) -> Result<Box<dyn PriceSeriesProvider>> {
    if synthetic {
        return Ok(Box::new(SyntheticProvider::default()));
    }
    let breaker = Arc::new(settings.circuit_breaker());
    let provider = YahooProvider::new(breaker, settings.retry_policy())?
        .with_base_url(settings.provider.base_url.as_str());
    Ok(Box::new(provider))
}

fn read_request(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request file {}", path.display())),
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("failed to read request from stdin")?;
            Ok(body)
        }
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.2}")).unwrap_or_else(|| "-".to_string())
}

fn print_summary(result: &BacktestResult, rows: usize) {
    println!();
    println!("=== Backtest Result ===");
    print!("{}", render_summary(result));

    if rows == 0 {
        return;
    }
    let tail = &result.signal_table[result.signal_table.len().saturating_sub(rows)..];
    println!();
    println!(
        "{:<12}{:>10}{:>10}{:>10}{:>4}{:>4}{:>14}{:>14}",
        "date", "close", "sma_s", "sma_l", "sig", "e/x", "cash", "portfolio"
    );
    for r in tail {
        println!(
            "{:<12}{:>10.2}{:>10}{:>10}{:>4}{:>4}{:>14.2}{:>14.2}",
            r.signal.date.to_string(),
            r.signal.close,
            fmt_opt(r.signal.sma_short),
            fmt_opt(r.signal.sma_long),
            r.signal.signal.as_i8(),
            r.signal.entry_exit.as_i8(),
            r.position.cash_balance,
            r.position.portfolio_value,
        );
    }
}
