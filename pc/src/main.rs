use std::io;
use std::time::Duration;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use progchan::cli::{Cli, Command};
use progchan::config::Config;
use progchan::{ChannelMessage, FileSlot, Monitor, MonitorOptions, Slot};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let channel_path = cli.channel.unwrap_or(config.channel_path.clone());
    let slot = FileSlot::new(&channel_path);

    info!("progchan starting on {}", channel_path.display());

    match cli.command {
        Command::Watch { interval, hold } => {
            let options = MonitorOptions {
                poll_interval: interval.map(Duration::from_millis).unwrap_or(config.poll_interval()),
                hold_on_exit: hold,
                ..Default::default()
            };
            let report = Monitor::new(slot, io::stdout(), options).run()?;
            info!("watch finished, {} frames", report.frames);
        }
        Command::Show => match slot.load() {
            Ok(Some(msg)) => println!("{}", msg.to_json()?),
            Ok(None) => println!("{}", "Channel is empty".dimmed()),
            Err(e) if e.is_decode() => println!("{} {}", "Unreadable slot:".yellow(), e),
            Err(e) => return Err(e).context("Failed to read channel"),
        },
        Command::Exit => {
            slot.store(&ChannelMessage::exit()).context("Failed to publish exit")?;
            println!("{} Published exit to {}", "✓".green(), channel_path.display());
        }
        Command::Clear => {
            slot.clear().context("Failed to clear channel")?;
            println!("{} Cleared {}", "✓".green(), channel_path.display());
        }
    }

    Ok(())
}
