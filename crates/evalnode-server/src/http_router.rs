//! HTTP Router for the evalnode worker
//!
//! Routes are keyed by method and path, both case-insensitive. The table is
//! assembled once with [`RouteTableBuilder`] and is immutable afterwards.
//!
//! # Status mapping
//!
//! - Route miss: `404` with an empty body
//! - Handler success: whatever the handler built
//! - Handler error: `500` (`503` when admission was refused) with
//!   `{"error": "<message>"}`
//!
//! Interpreter faults are not handler errors; `POST /invoke` reports them in a
//! `200` body.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use evalnode_common::{ErrorBody, EvalnodeError, InvocationRequest, InvocationResponse, Result};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Request, Response, StatusCode};
use serde::Serialize;

use crate::executor::Executor;
use crate::runtime::Outcome;

/// Response type produced by every handler
pub type HyperResponse = Response<Full<Bytes>>;

/// Boxed future returned by a handler
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<HyperResponse>> + Send>>;

type Handler = Arc<dyn Fn(Request<Bytes>) -> HandlerFuture + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RouteKey {
    method: String,
    path: String,
}

impl RouteKey {
    fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_ascii_lowercase(),
        }
    }
}

/// Collects routes before the table is frozen.
#[derive(Default)]
pub struct RouteTableBuilder {
    routes: HashMap<RouteKey, Handler>,
}

impl RouteTableBuilder {
    /// Registers `handler` for `method` and `path`, replacing any earlier
    /// registration of the same pair.
    pub fn route<F, Fut>(mut self, method: &str, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Bytes>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HyperResponse>> + Send + 'static,
    {
        let handler: Handler =
            Arc::new(move |req: Request<Bytes>| -> HandlerFuture { Box::pin(handler(req)) });
        self.routes.insert(RouteKey::new(method, path), handler);
        self
    }

    pub fn build(self) -> RouteTable {
        RouteTable {
            routes: self.routes,
        }
    }
}

/// Immutable method+path to handler table.
pub struct RouteTable {
    routes: HashMap<RouteKey, Handler>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// The worker's routes: `POST /invoke` backed by `executor`.
    pub fn for_executor(executor: Arc<Executor>) -> Self {
        Self::builder()
            .route("POST", "/invoke", move |req| {
                let executor = executor.clone();
                async move { handle_invoke(executor, req).await }
            })
            .build()
    }

    pub fn contains(&self, method: &str, path: &str) -> bool {
        self.routes.contains_key(&RouteKey::new(method, path))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes a request whose body has already been read.
    pub async fn dispatch(&self, req: Request<Bytes>) -> HyperResponse {
        let key = RouteKey::new(req.method().as_str(), req.uri().path());

        let Some(handler) = self.routes.get(&key).cloned() else {
            tracing::debug!("No route for {} {}", key.method, key.path);
            return empty_response(StatusCode::NOT_FOUND);
        };

        match handler(req).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Error handling {} {}: {}", key.method, key.path, e);
                error_response(&e)
            }
        }
    }
}

async fn handle_invoke(executor: Arc<Executor>, req: Request<Bytes>) -> Result<HyperResponse> {
    let request = InvocationRequest::from_slice(req.body())?;
    tracing::debug!("Invoking {} bytes of code", request.code.len());

    let response = match executor.invoke(request.code).await? {
        Outcome::Value(value) => InvocationResponse::value(value),
        Outcome::Fault(fault) => {
            tracing::debug!("Invocation faulted: {}", fault);
            InvocationResponse::fault(fault.into_description())
        }
    };

    Ok(json_response(StatusCode::OK, &response))
}

/// Builds the structured body for a dispatcher-level error.
pub fn error_response(error: &EvalnodeError) -> HyperResponse {
    let status = match error {
        EvalnodeError::Saturated(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    json_response(status, &ErrorBody::new(error.to_string()))
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HyperResponse {
    let body = serde_json::to_vec(body).unwrap_or_default();

    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

pub fn empty_response(status: StatusCode) -> HyperResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
