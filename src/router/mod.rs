//! Route registry and dispatch
//!
//! Routes are keyed by endpoint (the first path segment of the target) and
//! then by method. The table is filled once at startup and only read
//! afterwards, so it is shared between connections without locking.

pub mod routes;

use std::collections::HashMap;

use crate::http::request::{Method, Request};
use crate::http::response::{ResponseBuilder, StatusCode};
use crate::server::ServerState;

pub use routes::Route;

/// Maps (endpoint, method) pairs to route handlers.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: HashMap<String, HashMap<Method, Route>>,
}

impl Router {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router with the server's built-in endpoints.
    pub fn with_default_routes() -> Self {
        let mut router = Self::new();
        router.register("/", Method::GET, Route::Root);
        router.register("/echo", Method::GET, Route::Echo);
        router.register("/user-agent", Method::GET, Route::UserAgent);
        router.register("/files", Method::GET, Route::ReadFile);
        router.register("/files", Method::POST, Route::WriteFile);
        router
    }

    /// Binds `route` to an endpoint and method. A later registration for the
    /// same pair replaces the earlier one.
    pub fn register(&mut self, endpoint: impl Into<String>, method: Method, route: Route) {
        self.routes
            .entry(endpoint.into())
            .or_default()
            .insert(method, route);
    }

    /// Finds the route for a request target and method.
    pub fn lookup(&self, target: &str, method: &Method) -> Lookup {
        match self.routes.get(endpoint_key(target)) {
            None => Lookup::NotFound,
            Some(methods) => match methods.get(method) {
                Some(route) => Lookup::Found(*route),
                None => Lookup::MethodNotSupported,
            },
        }
    }

    /// Runs the matching handler, or answers 404 / 501.
    pub async fn dispatch(&self, request: &Request, state: &ServerState) -> ResponseBuilder {
        match self.lookup(request.target(), request.method()) {
            Lookup::Found(route) => route.handle(request, state).await,
            Lookup::NotFound => {
                tracing::debug!(path = %request.target(), "No endpoint registered");
                ResponseBuilder::new(StatusCode::NotFound)
            }
            Lookup::MethodNotSupported => {
                tracing::debug!(
                    method = %request.method(),
                    path = %request.target(),
                    "Method not registered for endpoint"
                );
                ResponseBuilder::new(StatusCode::NotImplemented)
            }
        }
    }
}

/// Outcome of a registry lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found(Route),
    NotFound,
    MethodNotSupported,
}

/// Returns the part of `target` before its second `/`.
///
/// # Example
///
/// ```
/// # use tern::router::endpoint_key;
/// assert_eq!(endpoint_key("/echo/abc"), "/echo");
/// assert_eq!(endpoint_key("/user-agent"), "/user-agent");
/// assert_eq!(endpoint_key("/"), "/");
/// ```
pub fn endpoint_key(target: &str) -> &str {
    match target.get(1..).and_then(|rest| rest.find('/')) {
        Some(i) => &target[..i + 1],
        None => target,
    }
}
