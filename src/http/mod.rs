//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 side of the server: reading requests
//! off a byte stream, negotiating a content coding, and writing responses.
//!
//! # Architecture
//!
//! - **`line`**: CRLF line reader with a per-line size cap
//! - **`parser`**: Parses the request line, headers and body from a buffered stream
//! - **`request`**: HTTP request representation and case-insensitive headers
//! - **`encoding`**: `Accept-Encoding` negotiation and gzip compression
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`connection`**: The per-connection request-response state machine
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for incoming request data
//!        └──────┬──────┘
//!               │ Request received (malformed → 400, then Closed)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Negotiate encoding, dispatch to a route
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Connection: close → Closed
//! ```

pub mod connection;
pub mod encoding;
pub mod line;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
