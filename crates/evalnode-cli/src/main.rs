//! # evalnode Entry Point
//!
//! Starts one disposable evaluation worker.
//!
//! ## Usage
//!
//! ```bash
//! # Listen on 127.0.0.1:8080, 5 second invocation timeout, 1 hour lifetime
//! evalnode 8080 5 3600
//!
//! # Listen on every interface, bound concurrency, cooperative loop limit
//! evalnode 0.0.0.0:8080 5 3600 --max-in-flight 16 --loop-iteration-limit 10000000
//!
//! # Evaluate something
//! curl -s localhost:8080/invoke -d '{"code": "2 + 2"}'
//! ```
//!
//! The worker exits with status 0 when an invocation runs past the timeout or
//! when the lifetime elapses. Run it under a process manager that restarts it.

use anyhow::Result;
use argh::FromArgs;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use evalnode_server::{ResourceLimits, Worker};

/// The supervisor never polls the clock less often than this.
const LIFETIME_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(FromArgs)]
/// serve a disposable JavaScript evaluation worker
struct Cli {
    /// port to listen on (bound on 127.0.0.1), or a full host:port address
    #[argh(positional)]
    listen: String,

    /// per-invocation timeout in seconds
    ///
    /// An invocation still running after this long terminates the process.
    #[argh(positional)]
    timeout_secs: u64,

    /// total process lifetime in seconds
    #[argh(positional)]
    ttl_secs: u64,

    /// maximum number of invocations queued or running at once
    ///
    /// Requests beyond this are answered with 503. Defaults to 64.
    #[argh(option, long = "max-in-flight", default = "64")]
    max_in_flight: usize,

    /// optional cap on loop iterations in a single evaluation
    ///
    /// Loops that hit it fail with a fault instead of running into the
    /// invocation timeout.
    #[argh(option, long = "loop-iteration-limit")]
    loop_iteration_limit: Option<u64>,

    /// optional cap on interpreter recursion depth
    #[argh(option, long = "recursion-limit")]
    recursion_limit: Option<usize>,
}

impl Cli {
    fn resource_limits(&self) -> ResourceLimits {
        let lifetime = Duration::from_secs(self.ttl_secs);

        let mut limits = ResourceLimits::new()
            .with_invocation_timeout(Duration::from_secs(self.timeout_secs))
            .with_lifetime(lifetime)
            .with_max_in_flight(self.max_in_flight);

        // Short lifetimes would otherwise overshoot by up to a full poll.
        if !lifetime.is_zero() {
            limits = limits.with_lifetime_poll_interval(LIFETIME_POLL_INTERVAL.min(lifetime));
        }
        if let Some(limit) = self.loop_iteration_limit {
            limits = limits.with_loop_iteration_limit(limit);
        }
        if let Some(limit) = self.recursion_limit {
            limits = limits.with_recursion_limit(limit);
        }

        limits
    }
}

/// Accepts a bare port (bound on 127.0.0.1) or a full socket address.
fn parse_listen_addr(listen: &str) -> Result<SocketAddr> {
    if let Ok(port) = listen.parse::<u16>() {
        return Ok(SocketAddr::from((Ipv4Addr::LOCALHOST, port)));
    }
    listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address {}: {}", listen, e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // Set default log level to INFO, but allow RUST_LOG env var to override
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let addr = parse_listen_addr(&cli.listen)?;
    let limits = cli.resource_limits();

    tracing::info!("Starting evalnode worker on {}", addr);
    tracing::info!("Invocation timeout: {}s", cli.timeout_secs);
    tracing::info!("Maximum in-flight invocations: {}", limits.max_in_flight);

    let worker = Worker::new(limits)?;
    worker.run(addr).await?;

    Ok(())
}
