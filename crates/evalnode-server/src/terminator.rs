//! Process termination
//!
//! A worker never cancels untrusted code cooperatively. When an invocation
//! outlives its deadline, or the process outlives its lifetime budget, the
//! whole process ends and an external supervisor is expected to start a fresh
//! one. Both paths go through [`Terminator`] so the decision to terminate can
//! be observed in tests without ending the test process.

use std::fmt;
use std::time::Duration;

/// Why the worker is terminating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// An invocation did not finish within the per-invocation timeout
    InvocationDeadline(Duration),
    /// The process reached its total lifetime
    LifetimeExpired(Duration),
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::InvocationDeadline(timeout) => {
                write!(f, "invocation exceeded its {}ms deadline", timeout.as_millis())
            }
            TerminationReason::LifetimeExpired(lifetime) => {
                write!(f, "lifetime of {}s elapsed", lifetime.as_secs())
            }
        }
    }
}

/// Ends the worker.
pub trait Terminator: Send + Sync + 'static {
    /// Terminates the worker. The production implementation does not return.
    fn terminate(&self, reason: TerminationReason);
}

/// Exits the process with a success status.
///
/// Open connections are dropped and in-flight invocations are abandoned.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExit;

impl Terminator for ProcessExit {
    fn terminate(&self, reason: TerminationReason) {
        tracing::info!("Terminating worker: {}", reason);
        std::process::exit(0);
    }
}
