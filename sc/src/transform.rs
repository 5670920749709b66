//! Symbolic round-trip transform
//!
//! A value is spelled as an English word, the word is reduced to the sum of
//! its character codes, and a candidate is recovered as `sum % 11`. When the
//! candidate differs from the input, the result is rebuilt from the input
//! and the outcome is flagged as corrected.

use tracing::{debug, warn};

use crate::error::CalcError;
use crate::progress::ProgressManager;
use crate::value::{Value, ValueFactory};

/// Step budget declared by the transform
pub const TRANSFORM_STEPS: u32 = 20;

/// Recovery modulus
const MODULUS: u32 = 11;

/// Spelling table for `0..=10`
#[derive(Debug, Clone)]
pub struct WordTable {
    words: [&'static str; 11],
}

impl Default for WordTable {
    fn default() -> Self {
        Self {
            words: [
                "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
            ],
        }
    }
}

impl WordTable {
    pub fn word(&self, raw: i64) -> Option<&'static str> {
        usize::try_from(raw).ok().and_then(|i| self.words.get(i)).copied()
    }
}

/// Sum of character codes modulo 11
pub fn recover(word: &str) -> i64 {
    let sum: u32 = word.chars().map(u32::from).sum();
    i64::from(sum % MODULUS)
}

/// Result of a transform
#[derive(Debug, Clone)]
pub struct Transformed {
    pub value: Value,
    /// Candidate disagreed with the input and was replaced
    pub corrected: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TransformPipeline {
    words: WordTable,
    factory: ValueFactory,
}

impl TransformPipeline {
    pub fn new(words: WordTable, factory: ValueFactory) -> Self {
        Self { words, factory }
    }

    pub fn transform(&self, value: &Value, progress: &mut ProgressManager) -> Result<Transformed, CalcError> {
        debug!(raw = value.raw(), "TransformPipeline::transform: called");
        let pacing = self.factory.pacing();

        progress.set_total_steps(TRANSFORM_STEPS);
        progress.step(2.0, "Starting transform");

        progress.step(3.0, "Spelling value as a word");
        let word = self
            .words
            .word(value.raw())
            .ok_or(CalcError::OutOfRange { value: value.raw() })?;
        pacing.pause(3);

        progress.step(3.0, "Encoding word as character codes");
        let codes: Vec<u32> = word.chars().map(u32::from).collect();
        pacing.pause(3);

        progress.step(4.0, "Recovering value from codes");
        let candidate = recover(word);
        pacing.pause(4);
        debug!(word, ?codes, candidate, "TransformPipeline::transform: recovered candidate");

        progress.step(3.0, "Creating transformed value");
        let mut result = self.factory.build(candidate, progress)?;
        let corrected = result.raw() != value.raw();
        if corrected {
            warn!(
                expected = value.raw(),
                candidate, "Transform mismatch, rebuilding from the original value"
            );
            result = self.factory.build(value.raw(), progress)?;
        }

        progress.step(5.0, "Transform complete");
        Ok(Transformed {
            value: result,
            corrected,
        })
    }
}
