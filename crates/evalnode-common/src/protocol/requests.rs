use serde::{Deserialize, Serialize};

/// Body of a `POST /invoke` call.
///
/// Unknown fields are ignored so callers can attach their own metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationRequest {
    /// Source text handed to the interpreter
    pub code: String,
}

impl InvocationRequest {
    pub fn new(code: impl Into<String>) -> Self {
        InvocationRequest { code: code.into() }
    }

    /// Decodes a request from a raw HTTP body.
    pub fn from_slice(body: &[u8]) -> super::Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}
