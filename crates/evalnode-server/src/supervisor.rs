//! Lifetime supervisor
//!
//! Workers are recycled on a schedule: once a worker has been up for its
//! lifetime budget it terminates, whatever it is doing, and the process manager
//! starts a replacement. The supervisor checks the clock at a coarse interval;
//! sub-second precision is not needed.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::terminator::{TerminationReason, Terminator};

/// Starts the lifetime supervisor.
///
/// The returned handle completes only if the terminator returns, which the
/// production terminator never does.
pub fn spawn(
    lifetime: Duration,
    poll_interval: Duration,
    terminator: Arc<dyn Terminator>,
) -> JoinHandle<()> {
    let started = Instant::now();
    tracing::info!("Worker lifetime: {}s", lifetime.as_secs());

    tokio::spawn(async move {
        while started.elapsed() < lifetime {
            tokio::time::sleep(poll_interval).await;
        }
        terminator.terminate(TerminationReason::LifetimeExpired(lifetime));
    })
}
