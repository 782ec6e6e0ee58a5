//! # Middleware Stack
//!
//! Tower middleware for the API layer, outermost first:
//! - [`request_id`]: correlation id per request (`X-Request-ID`).
//! - [`exception`]: panic capture and 500 response shaping.
//! - [`security_headers`]: CSP, HSTS, nosniff and referrer policy.
//! - [`tracing_layer`]: request/response tracing with `TraceLayer`.

pub mod exception;
pub mod request_id;
pub mod security_headers;
pub mod tracing_layer;
