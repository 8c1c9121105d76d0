//! Shared execution context
//!
//! Every invocation in a worker evaluates against the same interpreter state.
//! Boa's `Context` is `!Send` and not safe under concurrent mutation, so the
//! interpreter is owned by a single dedicated thread and invocations are queued
//! to it. Evaluations therefore never overlap; the order in which concurrent
//! invocations reach the queue is the order in which their mutations apply.
//!
//! # Lifecycle
//!
//! The thread is started by [`SharedContext::spawn`] and runs until every
//! handle to the context has been dropped. A runaway evaluation blocks the
//! thread for good; bounding that is the executor's job, not this module's.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use evalnode_common::{EvalnodeError, Result};
use tokio::sync::{mpsc, oneshot};

use crate::runtime::{execute, Interpreter, Outcome};

/// Deeply nested source recurses in the parser; give it room.
const CONTEXT_STACK_SIZE: usize = 16 * 1024 * 1024;

/// A unit of work queued to the context thread.
struct Job {
    code: String,
    started_tx: oneshot::Sender<()>,
    outcome_tx: oneshot::Sender<Outcome>,
    done: Arc<AtomicBool>,
}

/// Handle to an invocation submitted to the [`SharedContext`].
#[derive(Debug)]
pub struct Invocation {
    /// Resolves when the context thread begins evaluating this invocation
    pub started: oneshot::Receiver<()>,
    /// Resolves with the result once evaluation finishes
    pub outcome: oneshot::Receiver<Outcome>,
    /// Set by the context thread as soon as evaluation finishes, either way
    pub done: Arc<AtomicBool>,
}

/// Cloneable handle to the process-wide interpreter state.
#[derive(Clone, Debug)]
pub struct SharedContext {
    jobs: mpsc::UnboundedSender<Job>,
}

impl SharedContext {
    /// Starts the context thread.
    ///
    /// `factory` runs on the new thread, so the interpreter it builds never has
    /// to cross threads.
    pub fn spawn<I, F>(factory: F) -> Result<Self>
    where
        I: Interpreter + 'static,
        F: FnOnce() -> I + Send + 'static,
    {
        let (jobs, queue) = mpsc::unbounded_channel();

        thread::Builder::new()
            .name("shared-context".into())
            .stack_size(CONTEXT_STACK_SIZE)
            .spawn(move || {
                let interpreter = factory();
                run(interpreter, queue);
            })?;

        Ok(Self { jobs })
    }

    /// Queues `code` for evaluation.
    ///
    /// # Errors
    ///
    /// Returns `EvalnodeError::ContextUnavailable` if the context thread has
    /// exited.
    pub fn submit(&self, code: impl Into<String>) -> Result<Invocation> {
        let (started_tx, started) = oneshot::channel();
        let (outcome_tx, outcome) = oneshot::channel();
        let done = Arc::new(AtomicBool::new(false));

        self.jobs
            .send(Job {
                code: code.into(),
                started_tx,
                outcome_tx,
                done: done.clone(),
            })
            .map_err(|_| EvalnodeError::ContextUnavailable)?;

        Ok(Invocation {
            started,
            outcome,
            done,
        })
    }
}

fn run<I: Interpreter>(mut interpreter: I, mut queue: mpsc::UnboundedReceiver<Job>) {
    tracing::debug!("Shared context ready");

    while let Some(job) = queue.blocking_recv() {
        // The caller may have given up already; evaluate anyway so the
        // context sees the same mutations it would have otherwise.
        let _ = job.started_tx.send(());

        let outcome = execute(&mut interpreter, &job.code);
        job.done.store(true, Ordering::Release);

        if job.outcome_tx.send(outcome).is_err() {
            tracing::debug!("Invocation result dropped, caller went away");
        }
    }

    tracing::debug!("Shared context closed");
}
