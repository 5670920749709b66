//! StepCalc - staged arithmetic over 0-10
//!
//! CLI entry point for the interactive calculator, one-shot evaluation and
//! the progress monitor process.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use progchan::{FileSlot, Monitor, MonitorOptions, Slot};
use stepcalc::calculator::Calculator;
use stepcalc::cli::{Cli, Command, get_log_path};
use stepcalc::config::Config;
use stepcalc::context::Stages;
use stepcalc::input::{self, parse_command};
use stepcalc::launcher::MonitorLauncher;
use stepcalc::pacing::Pacing;
use stepcalc::repl::ReplSession;
use stepcalc::value::ValueFactory;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    // Monitor and REPL processes share the directory; keep one file each
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!("StepCalc loaded config: channel={}", config.channel.path.display());

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Repl { no_monitor }) => cmd_repl(&config, no_monitor),
        Some(Command::Eval { expr, fast }) => cmd_eval(&config, &expr, fast),
        Some(Command::Monitor { channel, interval, hold }) => cmd_monitor(&config, channel, interval, hold),
        None => {
            debug!("main: no command specified, launching REPL");
            cmd_repl(&config, false)
        }
    }
}

/// Run the interactive calculator
fn cmd_repl(config: &Config, no_monitor: bool) -> Result<()> {
    debug!(no_monitor, "cmd_repl: called");
    let slot = Arc::new(FileSlot::new(&config.channel.path));

    // A sentinel left by a previous session would stop a fresh monitor
    if let Err(e) = slot.clear() {
        warn!("Failed to clear stale channel {}: {}", config.channel.path.display(), e);
    }

    let launcher = (config.monitor.autostart && !no_monitor).then(|| {
        MonitorLauncher::new(
            config.channel.path.clone(),
            config.monitor.terminal.clone(),
            Duration::from_millis(config.monitor.stop_timeout_ms),
        )
    });

    let calculator = Calculator::new(slot, Stages::new(ValueFactory::new(config.pacing())));
    ReplSession::new(calculator, launcher).run()
}

/// Evaluate a single expression and print the result
fn cmd_eval(config: &Config, expr: &str, fast: bool) -> Result<()> {
    debug!(%expr, fast, "cmd_eval: called");
    let input::Command::Calculate { a, op, b } = parse_command(expr)? else {
        return Err(eyre::eyre!("Expected an expression like '3 + 5', got '{}'", expr));
    };

    let pacing = if fast { Pacing::none() } else { config.pacing() };
    let slot = Arc::new(FileSlot::new(&config.channel.path));
    let mut calculator = Calculator::new(slot, Stages::new(ValueFactory::new(pacing)));

    let result = calculator.evaluate(a, &op, b)?;
    info!(a, %op, b, result, "cmd_eval: computed");
    println!("{} {} {} = {}", a, op, b, result.to_string().green());
    Ok(())
}

/// Render progress until the exit sentinel arrives
fn cmd_monitor(config: &Config, channel: Option<PathBuf>, interval: Option<u64>, hold: bool) -> Result<()> {
    let path = channel.unwrap_or_else(|| config.channel.path.clone());
    debug!(?path, ?interval, hold, "cmd_monitor: called");

    let options = MonitorOptions {
        poll_interval: Duration::from_millis(interval.unwrap_or(config.channel.poll_interval_ms)),
        hold_on_exit: hold,
        ..Default::default()
    };
    let report = Monitor::new(FileSlot::new(&path), io::stdout(), options)
        .run()
        .context("Monitor failed")?;
    info!(frames = report.frames, "cmd_monitor: exit signal received");
    Ok(())
}
