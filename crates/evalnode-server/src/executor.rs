//! Bounded invocation executor
//!
//! Each invocation is raced against a watchdog. The execution unit runs on the
//! shared context thread; the watchdog runs in a tokio task spawned per
//! invocation and polls the completion flag until either the flag is set or
//! the per-invocation timeout elapses. That task outlives the caller, so an
//! invocation whose caller went away is still bounded. A watchdog that sees the timeout first
//! terminates the worker: the interpreter offers no way to interrupt an
//! evaluation from outside, so ending the process is the only bound on a
//! runaway call.
//!
//! # Admission
//!
//! At most `max_in_flight` invocations may be queued or running, counting those
//! whose caller has gone away. Further
//! invocations are rejected with `EvalnodeError::Saturated` rather than queued
//! without bound.
//!
//! # Deadline start
//!
//! The timer starts when the context thread picks the invocation up, so time
//! spent queued behind other invocations is not charged against it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use evalnode_common::{EvalnodeError, Result};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

use crate::resource_limits::ResourceLimits;
use crate::runtime::{Invocation, Outcome, SharedContext};
use crate::terminator::{TerminationReason, Terminator};

/// How a watchdog finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The invocation finished in time
    Completed,
    /// The deadline elapsed first and termination was requested
    Breached,
}

/// Runs invocations against the shared context under a deadline.
pub struct Executor {
    context: SharedContext,
    gate: Arc<Semaphore>,
    limits: ResourceLimits,
    terminator: Arc<dyn Terminator>,
}

impl Executor {
    pub fn new(
        context: SharedContext,
        limits: ResourceLimits,
        terminator: Arc<dyn Terminator>,
    ) -> Self {
        let gate = Arc::new(Semaphore::new(limits.max_in_flight));
        Self {
            context,
            gate,
            limits,
            terminator,
        }
    }

    /// Evaluates `code` and returns its value or caught fault.
    ///
    /// # Errors
    ///
    /// - `EvalnodeError::Saturated` if `max_in_flight` invocations are already
    ///   queued or running
    /// - `EvalnodeError::ContextUnavailable` if the context thread is gone
    /// - `EvalnodeError::DeadlineExceeded` if the deadline elapsed; in
    ///   production the terminator has already ended the process by then
    pub async fn invoke(&self, code: impl Into<String>) -> Result<Outcome> {
        let permit = self
            .gate
            .clone()
            .try_acquire_owned()
            .map_err(|_| EvalnodeError::Saturated(self.limits.max_in_flight))?;

        let invocation = self.context.submit(code)?;

        // The job runs whether or not the caller is still waiting, so its
        // deadline and admission slot belong to a task the caller cannot drop.
        let supervised = tokio::spawn(supervise(
            invocation,
            self.limits.invocation_timeout,
            self.limits.watchdog_poll_interval,
            self.terminator.clone(),
            permit,
        ));

        supervised.await.map_err(|e| {
            tracing::error!("Invocation task failed: {}", e);
            EvalnodeError::ContextUnavailable
        })?
    }

    /// Number of invocations that may still be admitted.
    pub fn available_permits(&self) -> usize {
        self.gate.available_permits()
    }
}

/// Waits for `invocation` to start, then races its outcome against a watchdog.
///
/// Holds `_permit` until the outcome is delivered or the deadline is breached.
async fn supervise(
    invocation: Invocation,
    timeout: Duration,
    poll_interval: Duration,
    terminator: Arc<dyn Terminator>,
    _permit: OwnedSemaphorePermit,
) -> Result<Outcome> {
    let Invocation {
        started,
        mut outcome,
        done,
    } = invocation;

    started.await.map_err(|_| EvalnodeError::ContextUnavailable)?;

    let guard = watchdog(done, timeout, poll_interval, terminator);
    tokio::pin!(guard);

    let verdict = tokio::select! {
        biased;

        result = &mut outcome => {
            return result.map_err(|_| EvalnodeError::ContextUnavailable);
        }
        verdict = &mut guard => verdict,
    };

    match verdict {
        // Flag seen before the result was delivered.
        Verdict::Completed => outcome.await.map_err(|_| EvalnodeError::ContextUnavailable),
        Verdict::Breached => Err(EvalnodeError::DeadlineExceeded(
            u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        )),
    }
}

/// Polls `done` every `poll_interval` until it is set or `timeout` elapses.
///
/// On timeout, asks `terminator` to end the worker and returns
/// [`Verdict::Breached`].
pub async fn watchdog(
    done: Arc<AtomicBool>,
    timeout: Duration,
    poll_interval: Duration,
    terminator: Arc<dyn Terminator>,
) -> Verdict {
    let deadline = Instant::now() + timeout;

    loop {
        if done.load(Ordering::Acquire) {
            return Verdict::Completed;
        }

        let now = Instant::now();
        if now >= deadline {
            tracing::warn!("Invocation still running after {}ms", timeout.as_millis());
            terminator.terminate(TerminationReason::InvocationDeadline(timeout));
            return Verdict::Breached;
        }

        tokio::time::sleep(poll_interval.min(deadline - now)).await;
    }
}
