//! Progress tracking for the computation pipeline
//!
//! Each stage declares a step budget and advances through it; every change
//! is published to a progress channel slot for an external monitor. The
//! channel is best-effort telemetry, so publishing never fails a stage.

mod manager;

pub use manager::{INITIAL_DESCRIPTION, ProgressManager};
