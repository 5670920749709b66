//! Calculator - owns progress reporting and the active operation context

use std::sync::Arc;

use progchan::{ChannelMessage, Slot};
use tracing::{debug, info};

use crate::context::{OperationContext, OperationRecord, Stages};
use crate::error::CalcError;
use crate::operation::Operation;
use crate::progress::ProgressManager;

pub struct Calculator {
    slot: Arc<dyn Slot>,
    progress: ProgressManager,
    stages: Stages,
    context: Option<OperationContext>,
}

impl Calculator {
    pub fn new(slot: Arc<dyn Slot>, stages: Stages) -> Self {
        info!("Calculator initialized");
        Self {
            progress: ProgressManager::new(slot.clone()),
            slot,
            stages,
            context: None,
        }
    }

    /// Select the active operation
    ///
    /// Every selection starts a new context with an empty history, even for
    /// the operator already active. An unsupported operator keeps the
    /// current context.
    pub fn set_operation(&mut self, symbol: &str) -> Result<Operation, CalcError> {
        let operation = Operation::from_symbol(symbol)?;
        let previous = self.context.as_ref().map(OperationContext::operation);
        debug!(?previous, new = %operation, "Calculator::set_operation: new context");
        self.context = Some(OperationContext::new(operation, self.stages.clone()));
        self.progress
            .update(0.0, Some(&format!("Selected operation: {}", operation)));
        Ok(operation)
    }

    pub fn compute(&mut self, a: i64, b: i64) -> Result<i64, CalcError> {
        let context = self.context.as_mut().ok_or(CalcError::NoOperation)?;
        context.execute(a, b, &mut self.progress)
    }

    /// Select `symbol` and compute in one go
    pub fn evaluate(&mut self, a: i64, symbol: &str, b: i64) -> Result<i64, CalcError> {
        self.set_operation(symbol)?;
        self.compute(a, b)
    }

    pub fn history(&self) -> &[OperationRecord] {
        self.context.as_ref().map(OperationContext::history).unwrap_or_default()
    }

    pub fn progress(&self) -> &ProgressManager {
        &self.progress
    }

    /// Tell the monitor to stop; failures are ignored
    pub fn signal_exit(&self) {
        if let Err(e) = self.slot.store(&ChannelMessage::exit()) {
            debug!(error = %e, "Calculator::signal_exit: could not publish exit");
        }
    }
}
