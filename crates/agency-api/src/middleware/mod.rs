//! # Middleware Stack
//!
//! - [`metrics`]: request and error counters exposed at `/metrics`.
//!
//! Request tracing is `tower_http::trace::TraceLayer`, applied in [`crate::app`].

pub mod metrics;
