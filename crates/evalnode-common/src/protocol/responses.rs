//! evalnode Response Types
//!
//! This module defines the JSON bodies written back to callers.

use serde::{Deserialize, Serialize};

/// Result of one invocation.
///
/// Interpreter faults are not HTTP errors: a snippet that throws still produces
/// a `200 OK` with the fault text in `result`. The `faulted` flag lets callers
/// tell "computed a string" apart from "failed to run" without parsing it.
///
/// # Example
///
/// ```
/// use evalnode_common::InvocationResponse;
/// use serde_json::json;
///
/// let ok = InvocationResponse::value(json!({"sum": 8}));
/// assert!(!ok.faulted);
///
/// let failed = InvocationResponse::fault("ReferenceError: y is not defined");
/// assert!(failed.faulted);
/// assert_eq!(failed.result, json!("ReferenceError: y is not defined"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationResponse {
    /// Computed value, or a human-readable fault description
    pub result: serde_json::Value,
    /// Whether `result` describes a parse or evaluation fault
    #[serde(default)]
    pub faulted: bool,
}

impl InvocationResponse {
    /// Creates a response carrying a computed value.
    pub fn value(result: serde_json::Value) -> Self {
        InvocationResponse {
            result,
            faulted: false,
        }
    }

    /// Creates a response carrying a caught interpreter fault.
    pub fn fault(description: impl Into<String>) -> Self {
        InvocationResponse {
            result: serde_json::Value::String(description.into()),
            faulted: true,
        }
    }
}

/// Structured body for dispatcher-level failures (`500`, `503`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorBody { error: error.into() }
    }
}
