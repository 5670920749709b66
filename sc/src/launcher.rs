//! Monitor process management
//!
//! Spawns the current executable with the hidden `monitor` subcommand,
//! optionally inside a new terminal window, and reaps it on shutdown.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use eyre::{Context, Result};
use tracing::{debug, info, warn};

/// Launches and stops a monitor process
#[derive(Debug)]
pub struct MonitorLauncher {
    /// Executable to run (defaults to the current one)
    exe: Option<PathBuf>,
    /// Slot file passed to the monitor
    channel_path: PathBuf,
    /// Terminal command prefix
    terminal: Vec<String>,
    /// Grace period after the exit sentinel
    stop_timeout: Duration,
    /// Monitor waits for Enter after the sentinel instead of closing
    hold: bool,
    child: Option<Child>,
}

impl MonitorLauncher {
    pub fn new(channel_path: PathBuf, terminal: Vec<String>, stop_timeout: Duration) -> Self {
        debug!(?channel_path, ?terminal, "MonitorLauncher::new: called");
        Self {
            exe: None,
            channel_path,
            hold: !terminal.is_empty(),
            terminal,
            stop_timeout,
            child: None,
        }
    }

    /// Override whether the monitor keeps its window open after exit
    ///
    /// Defaults to holding only when a terminal prefix is configured.
    pub fn with_hold(mut self, hold: bool) -> Self {
        self.hold = hold;
        self
    }

    /// Use a specific executable instead of the current one
    pub fn with_exe(mut self, exe: PathBuf) -> Self {
        self.exe = Some(exe);
        self
    }

    /// Build the command line: `[terminal...] <exe> monitor --channel <path> [--hold]`
    pub fn command_line(&self) -> Result<Vec<String>> {
        let exe = match &self.exe {
            Some(exe) => exe.clone(),
            None => std::env::current_exe().context("Failed to get current executable")?,
        };

        let mut argv = self.terminal.clone();
        argv.push(exe.to_string_lossy().to_string());
        argv.push("monitor".to_string());
        argv.push("--channel".to_string());
        argv.push(self.channel_path.to_string_lossy().to_string());
        if self.hold {
            argv.push("--hold".to_string());
        }
        Ok(argv)
    }

    pub fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Start the monitor; returns its PID
    pub fn start(&mut self) -> Result<u32> {
        debug!("MonitorLauncher::start: called");
        if let Some(child) = self.child.as_mut()
            && matches!(child.try_wait(), Ok(None))
        {
            return Err(eyre::eyre!("Monitor already running with PID {}", child.id()));
        }

        let argv = self.command_line()?;
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| eyre::eyre!("Empty monitor command line"))?;
        debug!(%program, ?args, "MonitorLauncher::start: spawning monitor process");

        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null());
        if !self.terminal.is_empty() {
            // the terminal emulator owns the display; keep its chatter out of ours
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let child = command.spawn().context("Failed to spawn monitor process")?;
        let pid = child.id();
        self.child = Some(child);

        info!(pid, "Monitor started");
        Ok(pid)
    }

    /// Wait for the monitor to exit, killing it after the grace period
    ///
    /// The caller is expected to have published the exit sentinel first.
    /// A held monitor is left running for the user to close.
    pub fn stop(&mut self) -> Result<()> {
        debug!("MonitorLauncher::stop: called");
        let Some(mut child) = self.child.take() else {
            debug!("MonitorLauncher::stop: no monitor was launched");
            return Ok(());
        };

        let deadline = Instant::now() + self.stop_timeout;
        while Instant::now() < deadline {
            if let Some(status) = child.try_wait().context("Failed to poll monitor process")? {
                info!(?status, "Monitor exited");
                return Ok(());
            }
            thread::sleep(Duration::from_millis(100));
        }

        if self.hold {
            info!(pid = child.id(), "Monitor is waiting for its window to be closed, detaching");
            return Ok(());
        }

        warn!(pid = child.id(), "Monitor did not stop gracefully, killing it");
        child.kill().context("Failed to kill monitor process")?;
        child.wait().context("Failed to reap monitor process")?;
        Ok(())
    }
}
