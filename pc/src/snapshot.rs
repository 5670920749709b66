//! Progress snapshot wire type
//!
//! A slot holds either a JSON object (a snapshot) or the JSON string `"exit"`.

use serde::{Deserialize, Serialize};

use crate::ChannelError;

/// A point-in-time progress record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Completion percentage, rounded to one decimal
    #[serde(default)]
    pub percentage: f64,

    /// Active step description (at most 40 characters)
    #[serde(default = "default_description")]
    pub step_description: String,

    /// Declared total step count (always >= 1)
    #[serde(default = "default_total_steps")]
    pub total_steps: u32,

    /// Unix timestamp in fractional seconds
    #[serde(default)]
    pub timestamp: f64,
}

fn default_description() -> String {
    "Processing".to_string()
}

fn default_total_steps() -> u32 {
    100
}

impl ProgressSnapshot {
    /// Build a snapshot from raw step counters
    ///
    /// `total` is raised to 1 if zero; the description is cut to
    /// [`crate::DESCRIPTION_LIMIT`] characters.
    pub fn from_progress(current: f64, total: u32, description: &str) -> Self {
        let total = total.max(1);
        Self {
            percentage: round_tenth(current / f64::from(total) * 100.0),
            step_description: truncate_chars(description, crate::DESCRIPTION_LIMIT),
            total_steps: total,
            timestamp: now_seconds(),
        }
    }
}

/// Control values that share the slot with snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    /// Tells the monitor to stop polling
    #[serde(rename = "exit")]
    Exit,
}

/// Content of the shared slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelMessage {
    Snapshot(ProgressSnapshot),
    Signal(Signal),
}

impl ChannelMessage {
    /// The termination sentinel
    pub fn exit() -> Self {
        ChannelMessage::Signal(Signal::Exit)
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, ChannelMessage::Signal(Signal::Exit))
    }

    pub fn as_snapshot(&self) -> Option<&ProgressSnapshot> {
        match self {
            ChannelMessage::Snapshot(snapshot) => Some(snapshot),
            ChannelMessage::Signal(_) => None,
        }
    }

    pub fn to_json(&self) -> Result<String, ChannelError> {
        serde_json::to_string(self).map_err(ChannelError::Encode)
    }

    pub fn from_json(json: &str) -> Result<Self, ChannelError> {
        serde_json::from_str(json).map_err(ChannelError::Decode)
    }
}

impl From<ProgressSnapshot> for ChannelMessage {
    fn from(snapshot: ProgressSnapshot) -> Self {
        ChannelMessage::Snapshot(snapshot)
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

fn now_seconds() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
