//! Interpreter collaborator seam
//!
//! The worker never talks to a concrete engine directly. Everything it needs is
//! the [`Interpreter`] trait: parse text as an expression, parse it as a full
//! script, and evaluate a parsed form against the interpreter's own mutable
//! state. [`execute`] drives those three calls in the fixed order every
//! invocation uses.

use serde_json::Value as JsonValue;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// A parse or evaluation failure reported by the interpreter.
///
/// Faults are data, not errors of the worker: they travel back to the caller
/// inside a normal response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault(String);

impl Fault {
    pub fn new(description: impl Into<String>) -> Self {
        Fault(description.into())
    }

    pub fn description(&self) -> &str {
        &self.0
    }

    pub fn into_description(self) -> String {
        self.0
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An engine that owns a mutable execution context.
///
/// Implementations are driven from a single thread and need not be `Send`.
pub trait Interpreter {
    /// A parsed form ready to be evaluated
    type Executable;

    /// Parses `code` as one standalone expression.
    fn parse_expression(&mut self, code: &str) -> Result<Self::Executable, Fault>;

    /// Parses `code` as a full script.
    fn parse_script(&mut self, code: &str) -> Result<Self::Executable, Fault>;

    /// Evaluates a parsed form against the interpreter's context, possibly
    /// mutating it.
    fn evaluate(&mut self, executable: Self::Executable) -> Result<JsonValue, Fault>;
}

/// What one invocation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Value(JsonValue),
    Fault(Fault),
}

impl Outcome {
    pub fn is_fault(&self) -> bool {
        matches!(self, Outcome::Fault(_))
    }
}

/// Parses and evaluates `code`.
///
/// Expression parsing is always tried first; only when it fails is the text
/// parsed as a script, and a script parse failure is the fault reported.
/// A panic inside the interpreter is caught and reported as a fault as well.
pub fn execute<I: Interpreter>(interpreter: &mut I, code: &str) -> Outcome {
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| -> Result<JsonValue, Fault> {
        let executable = match interpreter.parse_expression(code) {
            Ok(executable) => executable,
            Err(fault) => {
                tracing::trace!("not an expression ({}), parsing as script", fault);
                interpreter.parse_script(code)?
            }
        };
        interpreter.evaluate(executable)
    }));

    match attempt {
        Ok(Ok(value)) => Outcome::Value(value),
        Ok(Err(fault)) => Outcome::Fault(fault),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!("Interpreter panicked: {}", message);
            Outcome::Fault(Fault::new(format!("interpreter panicked: {}", message)))
        }
    }
}
