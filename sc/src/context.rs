//! Operation context - runs one computation end to end
//!
//! ```text
//! Reset -> ConstructOperands -> Validate -> Transform -> Execute -> RecordHistory -> Done
//! ```
//!
//! Stages run strictly in order; any error aborts the run and nothing is
//! appended to the history.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::CalcError;
use crate::operation::Operation;
use crate::progress::ProgressManager;
use crate::transform::{TransformPipeline, WordTable};
use crate::validator::Validator;
use crate::value::ValueFactory;

/// Step budget declared at the start of a run
pub const RUN_STEPS: u32 = 100;

/// One successful computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationRecord {
    pub a: i64,
    pub b: i64,
    pub op: String,
    pub result: i64,
    /// Local wall-clock time, `HH:MM:SS`
    pub time: String,
}

impl std::fmt::Display for OperationRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} = {} ({})", self.a, self.op, self.b, self.result, self.time)
    }
}

/// Stages shared by every run
#[derive(Debug, Clone, Default)]
pub struct Stages {
    pub factory: ValueFactory,
    pub validator: Validator,
    pub transformer: TransformPipeline,
}

impl Stages {
    pub fn new(factory: ValueFactory) -> Self {
        Self {
            factory,
            validator: Validator::new(factory),
            transformer: TransformPipeline::new(WordTable::default(), factory),
        }
    }
}

/// Active operation plus the history of its successful runs
#[derive(Debug, Clone)]
pub struct OperationContext {
    operation: Operation,
    stages: Stages,
    history: Vec<OperationRecord>,
}

impl OperationContext {
    pub fn new(operation: Operation, stages: Stages) -> Self {
        debug!(op = %operation, "OperationContext::new: called");
        Self {
            operation,
            stages,
            history: Vec::new(),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn history(&self) -> &[OperationRecord] {
        &self.history
    }

    /// Run the full pipeline on two raw operands
    pub fn execute(&mut self, a: i64, b: i64, progress: &mut ProgressManager) -> Result<i64, CalcError> {
        debug!(a, b, op = %self.operation, "OperationContext::execute: called");
        let Stages {
            factory,
            validator,
            transformer,
        } = &self.stages;

        progress.reset();
        progress.set_total_steps(RUN_STEPS);

        progress.step(10.0, "Wrapping operands");
        let a_val = factory.build(a, progress)?;
        let b_val = factory.build(b, progress)?;

        progress.step(20.0, "Validating operands");
        if !(validator.validate(&a_val, progress) && validator.validate(&b_val, progress)) {
            return Err(CalcError::ValidationFailed { a, b });
        }

        progress.step(25.0, "Transforming operands");
        let a_trans = transformer.transform(&a_val, progress)?;
        let b_trans = transformer.transform(&b_val, progress)?;
        debug!(
            a_corrected = a_trans.corrected,
            b_corrected = b_trans.corrected,
            "OperationContext::execute: transform done"
        );

        progress.step(35.0, "Running operation");
        let result = self
            .operation
            .calculate(&a_trans.value, &b_trans.value, factory, progress)?;

        progress.step(10.0, "Recording result");
        let record = OperationRecord {
            a,
            b,
            op: self.operation.symbol().to_string(),
            result: result.raw(),
            time: chrono::Local::now().format("%H:%M:%S").to_string(),
        };
        info!("Recorded {}", record);
        self.history.push(record);

        progress.step(f64::from(RUN_STEPS), "Calculation complete");
        Ok(result.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::Pacing;
    use progchan::{MemorySlot, Slot};
    use std::sync::Arc;

    fn setup(op: Operation) -> (OperationContext, ProgressManager, MemorySlot) {
        let slot = MemorySlot::new();
        let stages = Stages::new(ValueFactory::new(Pacing::none()));
        (
            OperationContext::new(op, stages),
            ProgressManager::new(Arc::new(slot.clone())),
            slot,
        )
    }

    #[test]
    fn test_execute_add() {
        let (mut ctx, mut pm, _slot) = setup(Operation::Add);
        assert_eq!(ctx.execute(3, 5, &mut pm).unwrap(), 8);
    }

    #[test]
    fn test_execute_subtract_to_zero() {
        let (mut ctx, mut pm, _slot) = setup(Operation::Subtract);
        assert_eq!(ctx.execute(7, 7, &mut pm).unwrap(), 0);
    }

    #[test]
    fn test_final_snapshot_is_complete() {
        let (mut ctx, mut pm, slot) = setup(Operation::Add);
        ctx.execute(1, 2, &mut pm).unwrap();

        let last = slot.load().unwrap().unwrap();
        let snap = last.as_snapshot().unwrap();
        assert_eq!(snap.percentage, 100.0);
        assert_eq!(snap.step_description, "Calculation complete");
    }

    #[test]
    fn test_history_in_call_order() {
        let (mut ctx, mut pm, _slot) = setup(Operation::Add);
        ctx.execute(1, 1, &mut pm).unwrap();
        ctx.execute(2, 3, &mut pm).unwrap();
        ctx.execute(0, 10, &mut pm).unwrap();

        let results: Vec<_> = ctx.history().iter().map(|r| (r.a, r.b, r.result)).collect();
        assert_eq!(results, vec![(1, 1, 2), (2, 3, 5), (0, 10, 10)]);
        assert!(ctx.history().iter().all(|r| r.op == "+"));
    }

    #[test]
    fn test_failures_do_not_touch_history() {
        let (mut ctx, mut pm, _slot) = setup(Operation::Subtract);
        ctx.execute(5, 1, &mut pm).unwrap();

        assert!(matches!(ctx.execute(2, 5, &mut pm), Err(CalcError::Underflow { .. })));
        assert!(matches!(ctx.execute(11, 0, &mut pm), Err(CalcError::OutOfRange { value: 11 })));
        assert!(matches!(ctx.execute(3, -1, &mut pm), Err(CalcError::OutOfRange { value: -1 })));

        assert_eq!(ctx.history().len(), 1);
    }

    #[test]
    fn test_record_display() {
        let record = OperationRecord {
            a: 3,
            b: 5,
            op: "+".to_string(),
            result: 8,
            time: "14:02:11".to_string(),
        };
        assert_eq!(record.to_string(), "3 + 5 = 8 (14:02:11)");
    }
}
