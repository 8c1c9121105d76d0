//! Resource limits for a worker process.
//!
//! A worker is bounded in three ways: each invocation has a wall-clock deadline,
//! the process as a whole has a lifetime budget, and only a fixed number of
//! invocations may be queued or running at once. The interpreter can optionally
//! be given cooperative limits (loop iterations, recursion depth) that turn some
//! runaway code into ordinary faults before the deadline has to fire.

use evalnode_common::{EvalnodeError, Result};
use std::time::Duration;

/// Resource limits for a worker process.
///
/// # Fields
///
/// - `invocation_timeout` - Wall-clock deadline for one invocation (default: 5 seconds)
/// - `lifetime` - Total lifetime of the process (default: 1 hour)
/// - `max_in_flight` - Invocations allowed to be queued or running (default: 64)
/// - `watchdog_poll_interval` - How often the watchdog checks for completion (default: 50ms)
/// - `lifetime_poll_interval` - How often the supervisor checks the clock (default: 5 seconds)
/// - `loop_iteration_limit` - Optional interpreter loop iteration cap
/// - `recursion_limit` - Optional interpreter recursion cap
///
/// # Example
///
/// ```
/// use evalnode_server::ResourceLimits;
/// use std::time::Duration;
///
/// let limits = ResourceLimits::new()
///     .with_invocation_timeout(Duration::from_secs(5))
///     .with_lifetime(Duration::from_secs(3600));
/// assert!(limits.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceLimits {
    pub invocation_timeout: Duration,
    pub lifetime: Duration,
    pub max_in_flight: usize,
    pub watchdog_poll_interval: Duration,
    pub lifetime_poll_interval: Duration,
    pub loop_iteration_limit: Option<u64>,
    pub recursion_limit: Option<usize>,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            invocation_timeout: Duration::from_secs(5),
            lifetime: Duration::from_secs(3600),
            max_in_flight: 64,
            watchdog_poll_interval: Duration::from_millis(50),
            lifetime_poll_interval: Duration::from_secs(5),
            loop_iteration_limit: None,
            recursion_limit: None,
        }
    }
}

impl ResourceLimits {
    /// Creates a new ResourceLimits with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-invocation deadline.
    pub fn with_invocation_timeout(mut self, timeout: Duration) -> Self {
        self.invocation_timeout = timeout;
        self
    }

    /// Sets the total process lifetime.
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Sets how many invocations may be queued or running at once.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn with_watchdog_poll_interval(mut self, interval: Duration) -> Self {
        self.watchdog_poll_interval = interval;
        self
    }

    pub fn with_lifetime_poll_interval(mut self, interval: Duration) -> Self {
        self.lifetime_poll_interval = interval;
        self
    }

    /// Caps the number of loop iterations a single evaluation may run.
    ///
    /// Exceeding the cap raises a fault inside the interpreter instead of
    /// waiting for the invocation deadline to end the process.
    pub fn with_loop_iteration_limit(mut self, limit: u64) -> Self {
        self.loop_iteration_limit = Some(limit);
        self
    }

    /// Caps the interpreter call depth.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = Some(limit);
        self
    }

    /// Validates the resource limits configuration.
    ///
    /// # Errors
    ///
    /// Returns `EvalnodeError::InvalidConfig` if:
    /// - The invocation timeout or lifetime is zero
    /// - The invocation timeout is longer than one hour
    /// - `max_in_flight` is zero
    /// - Either poll interval is zero
    pub fn validate(&self) -> Result<()> {
        if self.invocation_timeout.is_zero() {
            return Err(invalid("invocation timeout must be greater than zero"));
        }

        if self.invocation_timeout.as_secs() > 3600 {
            return Err(invalid(format!(
                "invocation timeout must be <= 1 hour (got {} seconds)",
                self.invocation_timeout.as_secs()
            )));
        }

        if self.lifetime.is_zero() {
            return Err(invalid("lifetime must be greater than zero"));
        }

        if self.max_in_flight == 0 {
            return Err(invalid("max in-flight invocations must be greater than zero"));
        }

        if self.watchdog_poll_interval.is_zero() || self.lifetime_poll_interval.is_zero() {
            return Err(invalid("poll intervals must be greater than zero"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> EvalnodeError {
    EvalnodeError::InvalidConfig(message.into())
}
