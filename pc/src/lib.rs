//! ProgChan - last-write-wins progress channel
//!
//! Carries progress snapshots from a computing process to an independent
//! monitor process. Only the latest snapshot is kept; a monitor observes
//! whatever is current at each poll and never a full history.
//!
//! # Wire format
//!
//! ```text
//! progress.json
//! ├── {"percentage": 42.0, "step_description": "...", "total_steps": 100, "timestamp": 1.7e9}
//! └── "exit"        # termination sentinel
//! ```
//!
//! # Example
//!
//! ```ignore
//! use progchan::{ChannelMessage, FileSlot, Poller, ProgressSnapshot, Slot};
//!
//! let slot = FileSlot::new("/tmp/progress.json");
//! slot.store(&ProgressSnapshot::from_progress(3.0, 10, "working").into())?;
//!
//! let mut poller = Poller::new(FileSlot::new("/tmp/progress.json"));
//! let change = poller.poll()?;
//! ```

pub mod channel;
pub mod cli;
pub mod config;
mod error;
pub mod monitor;
mod snapshot;

use std::path::PathBuf;

pub use channel::{FileSlot, MemorySlot, Poll, Poller, Slot};
pub use error::ChannelError;
pub use monitor::{Monitor, MonitorOptions, MonitorReport, Step, render_bar, render_status};
pub use snapshot::{ChannelMessage, ProgressSnapshot, Signal};

/// Maximum description length carried in a snapshot (characters)
pub const DESCRIPTION_LIMIT: usize = 40;

/// Default delay between monitor polls
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

/// Default progress bar width (cells)
pub const BAR_WIDTH: usize = 50;

/// Default location of the shared slot file
pub fn default_channel_path() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("stepcalc")
        .join("progress.json")
}
