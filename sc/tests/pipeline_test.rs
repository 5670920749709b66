//! Property tests for the computation pipeline
//!
//! All runs use zero pacing so they finish instantly.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use progchan::{ChannelError, ChannelMessage, MemorySlot, Slot};
use stepcalc::{CalcError, Calculator, Pacing, ProgressManager, Stages, TransformPipeline, Validator, Value, ValueFactory, WordTable};

/// Slot that remembers every message it was given
#[derive(Default)]
struct RecordingSlot {
    messages: Mutex<Vec<ChannelMessage>>,
}

impl RecordingSlot {
    fn percentages(&self) -> Vec<f64> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| m.as_snapshot().map(|s| s.percentage))
            .collect()
    }
}

impl Slot for RecordingSlot {
    fn store(&self, msg: &ChannelMessage) -> Result<(), ChannelError> {
        self.messages.lock().unwrap().push(msg.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<ChannelMessage>, ChannelError> {
        Ok(self.messages.lock().unwrap().last().cloned())
    }

    fn clear(&self) -> Result<(), ChannelError> {
        self.messages.lock().unwrap().clear();
        Ok(())
    }
}

fn factory() -> ValueFactory {
    ValueFactory::new(Pacing::none())
}

fn progress() -> ProgressManager {
    ProgressManager::new(Arc::new(MemorySlot::new()))
}

fn calculator() -> Calculator {
    Calculator::new(Arc::new(MemorySlot::new()), Stages::new(factory()))
}

proptest! {
    #[test]
    fn test_every_in_range_value_validates(raw in 0i64..=10) {
        let mut pm = progress();
        let value = factory().build(raw, &mut pm).unwrap();
        prop_assert!(Validator::new(factory()).validate(&value, &mut pm));
    }

    #[test]
    fn test_out_of_range_values_are_rejected(raw in prop_oneof![-1000i64..0, 11i64..1000]) {
        let mut pm = progress();
        let err = factory().build(raw, &mut pm).unwrap_err();
        let rejected_with_value = matches!(err, CalcError::OutOfRange { value } if value == raw);
        prop_assert!(rejected_with_value);
        prop_assert!(Value::new(raw).is_err());
    }

    #[test]
    fn test_transform_preserves_value(raw in 0i64..=10) {
        let mut pm = progress();
        let value = Value::new(raw).unwrap();
        let out = TransformPipeline::new(WordTable::default(), factory())
            .transform(&value, &mut pm)
            .unwrap();
        prop_assert_eq!(out.value.raw(), raw);
        prop_assert_eq!(out.value.digest(), value.digest());
    }

    #[test]
    fn test_addition_within_range(a in 0i64..=10, b in 0i64..=10) {
        let mut calc = calculator();
        match calc.evaluate(a, "+", b) {
            Ok(sum) => prop_assert_eq!(sum, a + b),
            Err(e) => {
                prop_assert!(a + b > 10);
                prop_assert!(e.is_domain());
            }
        }
    }

    #[test]
    fn test_subtraction(a in 0i64..=10, b in 0i64..=10) {
        let mut calc = calculator();
        match calc.evaluate(a, "-", b) {
            Ok(diff) => prop_assert_eq!(diff, a - b),
            Err(e) => {
                prop_assert!(a < b);
                let is_underflow = matches!(e, CalcError::Underflow { .. });
                prop_assert!(is_underflow);
            }
        }
    }

    #[test]
    fn test_history_holds_only_last_success(ops in prop::collection::vec((0i64..=12, 0i64..=12), 1..6)) {
        let mut calc = calculator();
        let mut last = None;
        for (a, b) in ops {
            last = calc.evaluate(a, "+", b).ok();
        }
        let recorded: Vec<i64> = calc.history().iter().map(|r| r.result).collect();
        prop_assert_eq!(recorded, last.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_history_counts_successes_within_context(ops in prop::collection::vec((0i64..=12, 0i64..=12), 1..6)) {
        let mut calc = calculator();
        calc.set_operation("+").unwrap();
        let mut successes = 0;
        for (a, b) in ops {
            if calc.compute(a, b).is_ok() {
                successes += 1;
            }
        }
        prop_assert_eq!(calc.history().len(), successes);
    }

    #[test]
    fn test_progress_is_clamped_and_monotonic_per_phase(a in 0i64..=10, b in 0i64..=10, op in prop_oneof![Just("+"), Just("-")]) {
        let slot = Arc::new(RecordingSlot::default());
        let mut calc = Calculator::new(slot.clone(), Stages::new(factory()));
        let _ = calc.evaluate(a, op, b);

        let pcts = slot.percentages();
        prop_assert!(!pcts.is_empty());
        for pct in &pcts {
            prop_assert!((0.0..=100.0).contains(pct), "out of range: {}", pct);
        }
        // a new phase always starts from zero
        for pair in pcts.windows(2) {
            prop_assert!(pair[1] >= pair[0] || pair[1] == 0.0, "regressed: {:?}", pair);
        }
    }
}

#[test]
fn test_successful_run_ends_at_full_progress() {
    let mut calc = calculator();
    assert_eq!(calc.evaluate(3, "+", 5).unwrap(), 8);
    let snapshot = calc.progress().snapshot();
    assert_eq!(snapshot.percentage, 100.0);
    assert_eq!(snapshot.step_description, "Calculation complete");
}

#[test]
fn test_failed_run_records_nothing() {
    let mut calc = calculator();
    assert!(calc.evaluate(2, "-", 5).is_err());
    assert!(calc.evaluate(11, "+", 0).is_err());
    assert!(calc.history().is_empty());

    assert_eq!(calc.evaluate(7, "-", 7).unwrap(), 0);
    assert_eq!(calc.history().len(), 1);
    assert_eq!(calc.history()[0].to_string().split(" (").next(), Some("7 - 7 = 0"));
}

#[test]
fn test_exit_is_visible_after_progress() {
    let slot = Arc::new(RecordingSlot::default());
    let mut calc = Calculator::new(slot.clone(), Stages::new(factory()));
    calc.evaluate(1, "+", 1).unwrap();
    calc.signal_exit();
    assert!(slot.load().unwrap().unwrap().is_exit());
}
