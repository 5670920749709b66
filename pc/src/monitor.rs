//! Terminal progress monitor
//!
//! Polls a [`Slot`] and redraws a two-line progress display in place every
//! time the slot content changes. Stops when the exit sentinel is observed.

use std::io::{self, BufRead, BufReader, Write};
use std::thread;
use std::time::Duration;

use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use log::{debug, info, warn};

use crate::channel::{Poll, Poller, Slot};
use crate::{ChannelError, ChannelMessage, ProgressSnapshot};

const FILLED_CELL: char = '█';
const EMPTY_CELL: char = '─';

/// Render a fixed-width progress bar
pub fn render_bar(percentage: f64, width: usize) -> String {
    let ratio = (percentage / 100.0).clamp(0.0, 1.0);
    let filled = ((width as f64) * ratio).floor() as usize;
    let filled = filled.min(width);

    let mut bar = String::with_capacity(width * FILLED_CELL.len_utf8());
    bar.extend(std::iter::repeat_n(FILLED_CELL, filled));
    bar.extend(std::iter::repeat_n(EMPTY_CELL, width - filled));
    bar
}

/// Status line for a snapshot: `[bar] 42.0% | steps: 100 | description`
pub fn render_status(snapshot: &ProgressSnapshot, width: usize) -> String {
    format!(
        "[{}] {:.1}% | steps: {} | {}",
        render_bar(snapshot.percentage, width),
        snapshot.percentage,
        snapshot.total_steps,
        snapshot.step_description
    )
}

/// Monitor tuning
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// Delay between polls
    pub poll_interval: Duration,
    /// Delay after a failed poll
    pub error_backoff: Duration,
    /// Bar width in cells
    pub bar_width: usize,
    /// Wait for Enter after the sentinel so a dedicated window stays readable
    pub hold_on_exit: bool,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(crate::DEFAULT_POLL_INTERVAL_MS),
            error_backoff: Duration::from_secs(1),
            bar_width: crate::BAR_WIDTH,
            hold_on_exit: false,
        }
    }
}

/// Outcome of a single monitor step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing new in the slot
    Idle,
    /// A new frame was drawn
    Rendered,
    /// The exit sentinel was observed
    Exit,
}

/// Summary returned when the monitor stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorReport {
    /// Number of frames drawn
    pub frames: u64,
}

/// Poll loop plus renderer
pub struct Monitor<S: Slot, W: Write> {
    poller: Poller<S>,
    out: W,
    options: MonitorOptions,
    frames: u64,
    /// Source of the closing Enter press
    input: Box<dyn BufRead + Send>,
}

impl<S: Slot, W: Write> Monitor<S, W> {
    pub fn new(slot: S, out: W, options: MonitorOptions) -> Self {
        debug!("Monitor::new: interval={:?}", options.poll_interval);
        Self {
            poller: Poller::new(slot),
            out,
            options,
            frames: 0,
            input: Box::new(BufReader::new(io::stdin())),
        }
    }

    /// Read the closing Enter press from `input` instead of stdin
    pub fn with_input(mut self, input: impl BufRead + Send + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    /// Print the banner and reserve the two status lines
    pub fn start(&mut self) -> Result<(), ChannelError> {
        if self.poller.prime()? {
            info!("Ignored exit sentinel left by a previous run");
        }

        let rule = "=".repeat(60);
        writeln!(self.out, "{}", rule)?;
        writeln!(self.out, "{:^60}", "Calculation Progress Monitor")?;
        writeln!(self.out, "{}", rule)?;
        writeln!(self.out)?;
        writeln!(self.out, "Closing this window stops the progress display")?;
        writeln!(self.out)?;
        writeln!(self.out)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    /// Poll once and redraw if the slot changed
    pub fn step(&mut self) -> Result<Step, ChannelError> {
        match self.poller.poll()? {
            Poll::Unchanged => Ok(Step::Idle),
            Poll::Changed(ChannelMessage::Snapshot(snapshot)) => {
                self.draw(&snapshot)?;
                Ok(Step::Rendered)
            }
            Poll::Changed(ChannelMessage::Signal(_)) => {
                debug!("Monitor::step: exit sentinel observed");
                Ok(Step::Exit)
            }
        }
    }

    /// Run until the exit sentinel arrives
    pub fn run(mut self) -> Result<MonitorReport, ChannelError> {
        self.start()?;

        loop {
            match self.step() {
                Ok(Step::Exit) => break,
                Ok(_) => thread::sleep(self.options.poll_interval),
                Err(e) => {
                    warn!("Monitor poll failed: {}", e);
                    writeln!(self.out, "monitor error: {}", e)?;
                    self.out.flush()?;
                    thread::sleep(self.options.error_backoff);
                }
            }
        }

        writeln!(self.out)?;
        writeln!(self.out, "Progress monitor finished")?;
        if self.options.hold_on_exit {
            write!(self.out, "Press Enter to close this window...")?;
            self.out.flush()?;
            let mut line = String::new();
            self.input.read_line(&mut line)?;
            writeln!(self.out)?;
        }
        self.out.flush()?;
        info!("Monitor stopped after {} frames", self.frames);
        Ok(MonitorReport { frames: self.frames })
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, snapshot: &ProgressSnapshot) -> Result<(), ChannelError> {
        let status = render_status(snapshot, self.options.bar_width);
        let updated = format!("updated: {}", chrono::Local::now().format("%H:%M:%S"));

        queue!(
            self.out,
            MoveUp(2),
            MoveToColumn(0),
            Print(status),
            Clear(ClearType::UntilNewLine),
            Print("\n"),
            Print(updated),
            Clear(ClearType::UntilNewLine),
            Print("\n"),
        )?;
        self.out.flush()?;
        self.frames += 1;
        Ok(())
    }
}
