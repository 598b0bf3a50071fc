//! # HTTP Middleware
//!
//! Layers applied around the catalog routes: request tracing, Prometheus
//! metrics, security response headers and the login rate limiter.

pub mod metrics;
pub mod rate_limit;
pub mod security;
pub mod tracing_layer;
