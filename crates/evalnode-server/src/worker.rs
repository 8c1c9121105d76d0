use std::net::SocketAddr;
use std::sync::Arc;

use evalnode_common::Result;
use tokio::net::TcpListener;

use crate::executor::Executor;
use crate::http_router::RouteTable;
use crate::http_server::HttpServer;
use crate::resource_limits::ResourceLimits;
use crate::runtime::{BoaInterpreter, Interpreter, SharedContext};
use crate::supervisor;
use crate::terminator::{ProcessExit, Terminator};

/// An evalnode worker: one shared interpreter context served over HTTP.
///
/// The worker is disposable. It ends its own process when an invocation
/// overruns the per-invocation timeout or when its lifetime elapses, and
/// relies on a process manager to start the next one.
pub struct Worker {
    executor: Arc<Executor>,
    limits: ResourceLimits,
    terminator: Arc<dyn Terminator>,
}

impl Worker {
    /// Creates a worker backed by Boa that exits the process on termination.
    pub fn new(limits: ResourceLimits) -> Result<Self> {
        Self::with_terminator(limits, Arc::new(ProcessExit))
    }

    /// Creates a worker backed by Boa with a custom terminator.
    pub fn with_terminator(limits: ResourceLimits, terminator: Arc<dyn Terminator>) -> Result<Self> {
        let interpreter_limits = limits.clone();
        Self::with_interpreter(limits, terminator, move || {
            BoaInterpreter::with_limits(&interpreter_limits)
        })
    }

    /// Creates a worker around any interpreter.
    ///
    /// `factory` runs once, on the shared context thread.
    pub fn with_interpreter<I, F>(
        limits: ResourceLimits,
        terminator: Arc<dyn Terminator>,
        factory: F,
    ) -> Result<Self>
    where
        I: Interpreter + 'static,
        F: FnOnce() -> I + Send + 'static,
    {
        limits.validate()?;

        let context = SharedContext::spawn(factory)?;
        let executor = Arc::new(Executor::new(context, limits.clone(), terminator.clone()));

        Ok(Self {
            executor,
            limits,
            terminator,
        })
    }

    pub fn executor(&self) -> Arc<Executor> {
        self.executor.clone()
    }

    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Starts the lifetime supervisor and serves on `addr`.
    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        self.start_supervisor();
        HttpServer::new(RouteTable::for_executor(self.executor))
            .run(addr)
            .await
    }

    /// Starts the lifetime supervisor and serves on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        self.start_supervisor();
        HttpServer::new(RouteTable::for_executor(self.executor))
            .serve(listener)
            .await
    }

    fn start_supervisor(&self) {
        supervisor::spawn(
            self.limits.lifetime,
            self.limits.lifetime_poll_interval,
            self.terminator.clone(),
        );
    }
}
