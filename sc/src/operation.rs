//! Arithmetic strategies
//!
//! Both operations work on unit counts rather than native arithmetic and
//! then cross-check against it. A cross-check failure is a bug, not bad
//! input, and surfaces as [`CalcError::CrossCheck`].

use std::fmt;

use tracing::{debug, info};

use crate::error::CalcError;
use crate::progress::ProgressManager;
use crate::value::{Value, ValueFactory};

/// Step budget declared when an operation starts
pub const OPERATION_STEPS: u32 = 30;

/// Step budget for the subtraction loop phase
pub const SUBTRACTION_LOOP_STEPS: u32 = 25;

/// Share of the loop phase spread over the decrements
const DECREMENT_BUDGET: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
}

impl Operation {
    /// Parse an operator symbol
    pub fn from_symbol(symbol: &str) -> Result<Self, CalcError> {
        match symbol {
            "+" => Ok(Operation::Add),
            "-" => Ok(Operation::Subtract),
            other => Err(CalcError::UnsupportedOperator {
                symbol: other.to_string(),
            }),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Operation::Add => "addition",
            Operation::Subtract => "subtraction",
        }
    }

    /// Apply the operation, producing a freshly built value
    pub fn calculate(
        &self,
        a: &Value,
        b: &Value,
        factory: &ValueFactory,
        progress: &mut ProgressManager,
    ) -> Result<Value, CalcError> {
        debug!(op = self.symbol(), a = a.raw(), b = b.raw(), "Operation::calculate: called");
        let result = match self {
            Operation::Add => add_units(a.raw(), b.raw(), factory, progress)?,
            Operation::Subtract => subtract_units(a.raw(), b.raw(), factory, progress)?,
        };
        info!("{} result: {} {} {} = {}", self.name(), a.raw(), self.symbol(), b.raw(), result);
        factory.build(result, progress)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Compare a unit-count result against native arithmetic
pub fn cross_check(operation: &'static str, expected: i64, actual: i64) -> Result<(), CalcError> {
    if expected == actual {
        return Ok(());
    }
    Err(CalcError::CrossCheck {
        operation,
        expected,
        actual,
    })
}

fn units(raw: i64) -> Vec<u8> {
    vec![1; usize::try_from(raw).unwrap_or_default()]
}

fn add_units(a: i64, b: i64, factory: &ValueFactory, progress: &mut ProgressManager) -> Result<i64, CalcError> {
    let pacing = factory.pacing();

    progress.set_total_steps(OPERATION_STEPS);
    progress.step(5.0, "Starting addition");

    progress.step(8.0, "Splitting first operand into units");
    let mut combined = units(a);
    pacing.pause(5);

    progress.step(8.0, "Splitting second operand into units");
    let b_units = units(b);
    pacing.pause(5);

    progress.step(7.0, "Combining units");
    combined.extend(b_units);
    let result = combined.len() as i64;
    pacing.pause(5);

    progress.step(2.0, "Cross-checking addition result");
    cross_check("addition", a + b, result)?;

    progress.step(0.0, "Addition complete");
    Ok(result)
}

fn subtract_units(a: i64, b: i64, factory: &ValueFactory, progress: &mut ProgressManager) -> Result<i64, CalcError> {
    let pacing = factory.pacing();

    progress.set_total_steps(OPERATION_STEPS);
    progress.step(5.0, "Starting subtraction");

    if a < b {
        return Err(CalcError::Underflow { a, b });
    }

    progress.set_total_steps(SUBTRACTION_LOOP_STEPS);
    let mut result = a;
    // zero decrements publish nothing; the phase resumes at the cross-check
    let increment = if b == 0 { DECREMENT_BUDGET } else { DECREMENT_BUDGET / b as f64 };
    for i in 1..=b {
        result -= 1;
        progress.step(increment, &format!("Subtraction step {}/{}", i, b));
        pacing.pause(3);
    }

    progress.step(5.0, "Cross-checking subtraction result");
    cross_check("subtraction", a - b, result)?;

    progress.step(0.0, "Subtraction complete");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::Pacing;
    use progchan::{MemorySlot, Slot};
    use std::sync::Arc;

    fn setup() -> (ValueFactory, ProgressManager) {
        (
            ValueFactory::new(Pacing::none()),
            ProgressManager::new(Arc::new(MemorySlot::new())),
        )
    }

    fn calc(op: Operation, a: i64, b: i64) -> Result<i64, CalcError> {
        let (factory, mut pm) = setup();
        let a = Value::new(a).unwrap();
        let b = Value::new(b).unwrap();
        op.calculate(&a, &b, &factory, &mut pm).map(|v| v.raw())
    }

    #[test]
    fn test_symbols() {
        assert_eq!(Operation::from_symbol("+").unwrap(), Operation::Add);
        assert_eq!(Operation::from_symbol("-").unwrap(), Operation::Subtract);
        assert_eq!(Operation::Add.symbol(), "+");
        assert_eq!(Operation::Subtract.to_string(), "-");
    }

    #[test]
    fn test_unsupported_operator() {
        for symbol in ["*", "/", "", "++"] {
            let err = Operation::from_symbol(symbol).unwrap_err();
            assert!(matches!(err, CalcError::UnsupportedOperator { .. }));
            assert!(err.is_domain());
        }
    }

    #[test]
    fn test_add() {
        assert_eq!(calc(Operation::Add, 3, 5).unwrap(), 8);
        assert_eq!(calc(Operation::Add, 0, 0).unwrap(), 0);
        assert_eq!(calc(Operation::Add, 10, 0).unwrap(), 10);
    }

    #[test]
    fn test_add_above_ten_is_domain_error() {
        let err = calc(Operation::Add, 6, 5).unwrap_err();
        assert!(matches!(err, CalcError::OutOfRange { value: 11 }));
    }

    #[test]
    fn test_subtract() {
        assert_eq!(calc(Operation::Subtract, 7, 7).unwrap(), 0);
        assert_eq!(calc(Operation::Subtract, 10, 3).unwrap(), 7);
        assert_eq!(calc(Operation::Subtract, 4, 0).unwrap(), 4);
    }

    #[test]
    fn test_subtract_underflow() {
        let err = calc(Operation::Subtract, 2, 5).unwrap_err();
        assert!(matches!(err, CalcError::Underflow { a: 2, b: 5 }));
        assert!(err.is_domain());
    }

    #[derive(Default)]
    struct RecordingSlot {
        seen: std::sync::Mutex<Vec<progchan::ChannelMessage>>,
    }

    impl Slot for RecordingSlot {
        fn store(&self, msg: &progchan::ChannelMessage) -> Result<(), progchan::ChannelError> {
            self.seen.lock().unwrap().push(msg.clone());
            Ok(())
        }

        fn load(&self) -> Result<Option<progchan::ChannelMessage>, progchan::ChannelError> {
            Ok(self.seen.lock().unwrap().last().cloned())
        }

        fn clear(&self) -> Result<(), progchan::ChannelError> {
            self.seen.lock().unwrap().clear();
            Ok(())
        }
    }

    #[test]
    fn test_subtract_reports_each_decrement() {
        let slot = Arc::new(RecordingSlot::default());
        let mut pm = ProgressManager::new(slot.clone());
        let factory = ValueFactory::new(Pacing::none());

        subtract_units(9, 4, &factory, &mut pm).unwrap();

        let seen = slot.seen.lock().unwrap();
        let steps: Vec<_> = seen
            .iter()
            .filter_map(|m| m.as_snapshot())
            .filter(|s| s.step_description.starts_with("Subtraction step"))
            .map(|s| (s.step_description.clone(), s.percentage))
            .collect();
        assert_eq!(
            steps,
            vec![
                ("Subtraction step 1/4".to_string(), 20.0),
                ("Subtraction step 2/4".to_string(), 40.0),
                ("Subtraction step 3/4".to_string(), 60.0),
                ("Subtraction step 4/4".to_string(), 80.0),
            ]
        );
        assert_eq!(pm.current_step(), f64::from(SUBTRACTION_LOOP_STEPS));
    }

    #[test]
    fn test_subtract_zero_skips_decrement_updates() {
        let slot = Arc::new(RecordingSlot::default());
        let mut pm = ProgressManager::new(slot.clone());
        let factory = ValueFactory::new(Pacing::none());

        assert_eq!(subtract_units(6, 0, &factory, &mut pm).unwrap(), 6);
        assert_eq!(pm.current_step(), 5.0);
        assert_eq!(pm.description(), "Subtraction complete");

        let seen = slot.seen.lock().unwrap();
        let descriptions: Vec<_> = seen
            .iter()
            .filter_map(|m| m.as_snapshot())
            .map(|s| s.step_description.clone())
            .collect();
        assert!(descriptions.iter().all(|d| !d.starts_with("Subtraction step")));

        let cross_check = seen
            .iter()
            .filter_map(|m| m.as_snapshot())
            .find(|s| s.step_description == "Cross-checking subtraction result")
            .unwrap();
        assert_eq!(cross_check.percentage, 20.0);
    }

    #[test]
    fn test_cross_check() {
        assert!(cross_check("addition", 8, 8).is_ok());
        let err = cross_check("addition", 8, 9).unwrap_err();
        assert!(err.is_fatal());
    }
}
