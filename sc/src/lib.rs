//! StepCalc - staged arithmetic over 0-10
//!
//! Every computation runs through a fixed pipeline of construction,
//! validation, a self-checking transformation and the operation itself.
//! Each stage reports fractional progress through a [`progress::ProgressManager`]
//! that publishes to a `progchan` slot, where an independent monitor process
//! picks it up.
//!
//! # Modules
//!
//! - [`value`] - Bounded integer with digest and category
//! - [`validator`] - Structural and integrity checks on values
//! - [`transform`] - Word round trip that must preserve values
//! - [`operation`] - Addition and subtraction with cross-checks
//! - [`context`] - One end-to-end run plus history
//! - [`calculator`] - Operation selection and the public compute API
//! - [`repl`] - Interactive prompt
//! - [`launcher`] - Monitor process management
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod calculator;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod input;
pub mod launcher;
pub mod operation;
pub mod pacing;
pub mod progress;
pub mod repl;
pub mod transform;
pub mod validator;
pub mod value;

// Re-export commonly used types
pub use calculator::Calculator;
pub use config::Config;
pub use context::{OperationContext, OperationRecord, Stages};
pub use error::{CalcError, ErrorKind};
pub use operation::Operation;
pub use pacing::Pacing;
pub use progress::ProgressManager;
pub use transform::{TransformPipeline, Transformed, WordTable};
pub use validator::{ValidationReport, Validator};
pub use value::{Category, Value, ValueFactory, ValueRecord};
