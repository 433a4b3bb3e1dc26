//! Tern - minimal HTTP/1.1 server
//!
//! Core library: request parsing, content-encoding negotiation, route
//! dispatch and response serialization.

pub mod config;
pub mod http;
pub mod router;
pub mod server;
pub mod storage;
