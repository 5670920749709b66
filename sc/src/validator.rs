//! Value consistency checks
//!
//! Four independent checks run in a fixed order inside a 15-step budget:
//! shape, range, digest and integrity. The verdict is their conjunction;
//! the caller decides whether a failure aborts the run.

use tracing::{debug, error, info};

use crate::progress::ProgressManager;
use crate::value::{MAX_VALUE, MIN_VALUE, Value, ValueFactory, ValueRecord, digest_of};

/// Step budget declared by the validator
pub const VALIDATION_STEPS: u32 = 15;

/// Per-check outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationReport {
    /// Raw form serializes as an integer
    pub shape: bool,
    /// Raw value lies in `0..=10`
    pub range: bool,
    /// Stored digest equals the recomputed one
    pub digest: bool,
    /// Value serializes to a well-formed record
    pub integrity: bool,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.shape && self.range && self.digest && self.integrity
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    factory: ValueFactory,
}

impl Validator {
    pub fn new(factory: ValueFactory) -> Self {
        Self { factory }
    }

    /// Run all checks and return the overall verdict
    pub fn validate(&self, value: &Value, progress: &mut ProgressManager) -> bool {
        let passed = self.inspect(value, progress).passed();
        if passed {
            info!("Value {} passed validation", value.raw());
        } else {
            error!("Value {} failed validation", value.raw());
        }
        passed
    }

    /// Run all checks and return the individual outcomes
    pub fn inspect(&self, value: &Value, progress: &mut ProgressManager) -> ValidationReport {
        debug!(raw = value.raw(), "Validator::inspect: called");
        let pacing = self.factory.pacing();

        progress.set_total_steps(VALIDATION_STEPS);
        progress.step(2.0, "Starting validation");

        progress.step(2.0, "Checking value type");
        let shape = serde_json::to_value(value.to_record())
            .map(|v| v["raw_value"].is_i64())
            .unwrap_or(false);
        pacing.pause(2);

        progress.step(2.0, "Checking value range");
        let range = (MIN_VALUE..=MAX_VALUE).contains(&value.raw());
        pacing.pause(2);

        progress.step(3.0, "Checking value digest");
        let digest = value.digest() == digest_of(value.raw());
        pacing.pause(3);

        progress.step(3.0, "Checking value integrity");
        let integrity = self
            .factory
            .serialize(value, progress)
            .ok()
            .and_then(|json| serde_json::from_str::<ValueRecord>(&json).ok())
            .is_some_and(|record| record.raw_value == value.raw());
        pacing.pause(3);

        progress.step(5.0, "Summarizing validation");
        pacing.pause(2);

        let report = ValidationReport {
            shape,
            range,
            digest,
            integrity,
        };
        debug!(?report, "Validator::inspect: done");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::Pacing;
    use progchan::MemorySlot;
    use std::sync::Arc;

    fn setup() -> (Validator, ProgressManager) {
        (
            Validator::new(ValueFactory::new(Pacing::none())),
            ProgressManager::new(Arc::new(MemorySlot::new())),
        )
    }

    #[test]
    fn test_every_in_range_value_passes() {
        let (validator, mut pm) = setup();
        for raw in 0..=10 {
            let value = Value::new(raw).unwrap();
            assert!(validator.validate(&value, &mut pm), "value {} should pass", raw);
        }
    }

    #[test]
    fn test_tampered_digest_fails_only_digest_check() {
        let (validator, mut pm) = setup();
        let value = Value::new(4).unwrap().with_digest("deadbeef");

        let report = validator.inspect(&value, &mut pm);
        assert!(report.shape);
        assert!(report.range);
        assert!(!report.digest);
        assert!(report.integrity);
        assert!(!validator.validate(&value, &mut pm));
    }

    #[test]
    fn test_validation_fills_its_budget() {
        let (validator, mut pm) = setup();
        validator.validate(&Value::new(1).unwrap(), &mut pm);

        assert_eq!(pm.total_steps(), VALIDATION_STEPS);
        assert_eq!(pm.current_step(), f64::from(VALIDATION_STEPS));
        assert_eq!(pm.description(), "Summarizing validation");
    }
}
