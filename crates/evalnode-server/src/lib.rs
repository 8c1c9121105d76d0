//! evalnode Server
//!
//! This crate provides the evalnode worker: an HTTP front-end that evaluates
//! JavaScript snippets with the Boa engine against one shared, long-lived
//! context.
//!
//! The worker is crash-only. An invocation that runs past its deadline, or a
//! process that outlives its lifetime budget, ends the process; an external
//! process manager restarts it.
//!
//! # Components
//!
//! - [`runtime`] - interpreter seam, Boa binding and the shared context thread
//! - [`executor`] - admission gate and the per-invocation watchdog race
//! - [`supervisor`] - the lifetime watcher
//! - [`http_router`] / [`http_server`] - route table and accept loop
//! - [`Worker`] - wires the pieces together

pub mod executor;
pub mod http_router;
pub mod http_server;
pub mod resource_limits;
pub mod runtime;
pub mod supervisor;
pub mod terminator;
pub mod worker;

pub use executor::Executor;
pub use http_server::HttpServer;
pub use resource_limits::ResourceLimits;
pub use runtime::{BoaInterpreter, Fault, Interpreter, Outcome, SharedContext};
pub use terminator::{ProcessExit, TerminationReason, Terminator};
pub use worker::Worker;
