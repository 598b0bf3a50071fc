//! # Login Rate Limiting
//!
//! Fixed-window limiter keyed by client address, mounted on `/api/login`.
//! Every attempt counts, successful or not. In-memory only: limits reset
//! on restart and are not shared between replicas.
//!
//! The client address is the peer address unless the service runs behind
//! trusted proxies. With `trusted_proxy_hops = n`, the key is the address
//! the outermost trusted proxy saw: the `n`-th `X-Forwarded-For` entry
//! counted from the right. Entries left of that are client-written and
//! never used.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use parking_lot::RwLock;

use crate::error::ErrorBody;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u64,
    pub window: Duration,
    /// Reverse proxies in front of the service whose `X-Forwarded-For`
    /// entries are trusted. `0` keys on the peer address.
    pub trusted_proxy_hops: usize,
}

impl RateLimitConfig {
    /// 20 attempts per client every 15 minutes.
    pub fn login() -> Self {
        Self {
            max_requests: 20,
            window: Duration::from_secs(15 * 60),
            trusted_proxy_hops: 0,
        }
    }

    pub fn with_trusted_proxy_hops(mut self, hops: usize) -> Self {
        self.trusted_proxy_hops = hops;
        self
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::login()
    }
}

/// Per-key rate limit state.
#[derive(Debug, Clone)]
struct BucketState {
    count: u64,
    window_start: Instant,
}

/// Shared rate limiter state.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<RwLock<HashMap<String, BucketState>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Key identifying the client behind `request`.
    pub fn client_key(&self, request: &Request) -> String {
        client_key(request, self.config.trusted_proxy_hops)
    }

    /// Record an attempt from `key`; `false` once the window's budget is spent.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut buckets = self.buckets.write();

        // Windows that ended are forgotten so the map stays bounded.
        let window = self.config.window;
        buckets.retain(|_, bucket| now.duration_since(bucket.window_start) < window);

        let bucket = buckets.entry(key.to_string()).or_insert(BucketState {
            count: 0,
            window_start: now,
        });

        if bucket.count >= self.config.max_requests {
            false
        } else {
            bucket.count += 1;
            true
        }
    }
}

/// Client address as seen by the outermost trusted proxy.
///
/// Hops are walked right to left starting from the peer; when the header
/// has fewer entries than trusted hops, the leftmost entry is used.
fn client_key(request: &Request, trusted_proxy_hops: usize) -> String {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "anonymous".to_string());
    if trusted_proxy_hops == 0 {
        return peer;
    }

    let forwarded: Vec<&str> = request
        .headers()
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();

    forwarded
        .iter()
        .rev()
        .take(trusted_proxy_hops)
        .last()
        .map_or(peer, |hop| (*hop).to_string())
}

/// Middleware that enforces the login rate limit.
///
/// The limiter is read from request extensions; without one every request
/// passes.
pub async fn rate_limit_middleware(request: Request, next: Next) -> Response {
    let limiter = request.extensions().get::<RateLimiter>().cloned();

    if let Some(limiter) = limiter {
        let key = limiter.client_key(&request);
        if !limiter.check(&key) {
            tracing::warn!(client = %key, "login rate limit exceeded");
            let body = ErrorBody::new("RATE_LIMITED", "Too many login attempts. Try again later.");
            return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
        }
    }

    next.run(request).await
}
