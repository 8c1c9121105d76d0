//! evalnode Common Types
//!
//! This crate provides the wire protocol and the shared error type for the
//! evalnode worker.
//!
//! # Overview
//!
//! An evalnode worker is a short-lived HTTP process that evaluates source
//! snippets against one long-lived interpreter context. Everything that crosses
//! the HTTP boundary lives here so that callers and the server agree on it:
//!
//! - **Requests**: [`InvocationRequest`], the `{"code": ...}` body of `POST /invoke`
//! - **Responses**: [`InvocationResponse`] for evaluated code and [`ErrorBody`]
//!   for dispatcher-level failures
//! - **Errors**: [`EvalnodeError`] and the crate-wide [`Result`] alias
//!
//! # Example
//!
//! ```
//! use evalnode_common::{InvocationRequest, InvocationResponse};
//! use serde_json::json;
//!
//! let request = InvocationRequest::new("2 + 2");
//! assert_eq!(request.code, "2 + 2");
//!
//! let response = InvocationResponse::value(json!(4));
//! assert!(!response.faulted);
//! ```

pub mod protocol;

pub use protocol::*;
