//! ProgressManager - step counters published to a channel slot

use std::sync::Arc;

use progchan::{ProgressSnapshot, Slot};
use tracing::{debug, trace};

/// Description used after a reset
pub const INITIAL_DESCRIPTION: &str = "Initializing";

/// Tracks progress against a declared total and publishes every change
///
/// `current` is fractional because subtraction spreads its budget evenly
/// over the decrements. It never exceeds `total`.
pub struct ProgressManager {
    current: f64,
    total: u32,
    description: String,
    slot: Arc<dyn Slot>,
    publishes: u64,
}

impl std::fmt::Debug for ProgressManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressManager")
            .field("current", &self.current)
            .field("total", &self.total)
            .field("description", &self.description)
            .field("publishes", &self.publishes)
            .finish_non_exhaustive()
    }
}

impl ProgressManager {
    /// Create a manager publishing to `slot`; nothing is published yet
    pub fn new(slot: Arc<dyn Slot>) -> Self {
        debug!("ProgressManager::new: called");
        Self {
            current: 0.0,
            total: 100,
            description: INITIAL_DESCRIPTION.to_string(),
            slot,
            publishes: 0,
        }
    }

    /// Declare the step budget for the current phase and restart at 0
    pub fn set_total_steps(&mut self, total: u32) {
        debug!(%total, "ProgressManager::set_total_steps: called");
        self.total = total.max(1);
        self.current = 0.0;
        self.publish();
    }

    /// Advance by `steps`, clamped to the total
    ///
    /// A non-empty `description` replaces the active one.
    pub fn update(&mut self, steps: f64, description: Option<&str>) {
        self.current = (self.current + steps).clamp(0.0, f64::from(self.total));
        if let Some(desc) = description.filter(|d| !d.is_empty()) {
            self.description = desc.to_string();
        }
        trace!(current = %self.current, total = %self.total, description = %self.description, "ProgressManager::update");
        self.publish();
    }

    /// Advance by `steps` and switch to `description`
    pub fn step(&mut self, steps: f64, description: &str) {
        self.update(steps, Some(description));
    }

    /// Back to 0 with the initialization label
    pub fn reset(&mut self) {
        debug!("ProgressManager::reset: called");
        self.current = 0.0;
        self.description = INITIAL_DESCRIPTION.to_string();
        self.publish();
    }

    pub fn current_step(&self) -> f64 {
        self.current
    }

    pub fn total_steps(&self) -> u32 {
        self.total
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Number of publish attempts so far
    pub fn publish_count(&self) -> u64 {
        self.publishes
    }

    /// Snapshot of the current state
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot::from_progress(self.current, self.total, &self.description)
    }

    fn publish(&mut self) {
        self.publishes += 1;
        if let Err(e) = self.slot.store(&self.snapshot().into()) {
            debug!(error = %e, "ProgressManager::publish: dropped snapshot");
        }
    }
}
