//! Per-route request admission control.
//!
//! Fixed-window counters keyed by client address and route path. This is a
//! thin gate in front of the handlers, not a fairness scheduler; the
//! upstream API has its own limits which the Steam client respects
//! separately.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;

use crate::api::error::ApiError;

/// Requests allowed per window.
#[derive(Debug, Clone, Copy)]
pub struct Quota {
    pub max_requests: u32,
    pub window: Duration,
}

impl Quota {
    pub const fn per_minute(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }

    pub const fn per_hour(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Shared fixed-window counters.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: Mutex<HashMap<(IpAddr, String), Window>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one request; `false` means the quota is exhausted.
    pub fn try_acquire(&self, client: IpAddr, key: &str, quota: Quota) -> bool {
        let mut windows = self.windows.lock();
        if windows.len() > 10_000 {
            windows.retain(|_, w| w.started.elapsed() < quota.window);
        }

        let now = Instant::now();
        let window = windows
            .entry((client, key.to_string()))
            .or_insert(Window { started: now, count: 0 });
        if now.duration_since(window.started) >= quota.window {
            window.started = now;
            window.count = 0;
        }
        if window.count < quota.max_requests {
            window.count += 1;
            true
        } else {
            false
        }
    }
}

/// State for one admission layer: the shared limiter plus this layer's
/// quota. The `scope` keeps layered quotas from sharing counters.
#[derive(Clone)]
pub struct AdmissionControl {
    limiter: Arc<RateLimiter>,
    scope: &'static str,
    quota: Quota,
}

impl AdmissionControl {
    pub fn new(limiter: Arc<RateLimiter>, scope: &'static str, quota: Quota) -> Self {
        Self {
            limiter,
            scope,
            quota,
        }
    }
}

fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Admission middleware; apply with `middleware::from_fn_with_state`.
pub async fn admission_middleware(
    State(control): State<AdmissionControl>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_ip(&request);
    let key = format!("{}:{}", control.scope, request.uri().path());
    if control.limiter.try_acquire(client, &key, control.quota) {
        next.run(request).await
    } else {
        tracing::warn!(%client, key, "Request rejected by admission limit");
        ApiError::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded. Please try again later.",
        )
        .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn quota_exhausts_within_window() {
        let limiter = RateLimiter::new();
        let quota = Quota::per_minute(3);
        for _ in 0..3 {
            assert!(limiter.try_acquire(CLIENT, "route:/get_library", quota));
        }
        assert!(!limiter.try_acquire(CLIENT, "route:/get_library", quota));
    }

    #[test]
    fn routes_are_counted_independently() {
        let limiter = RateLimiter::new();
        let quota = Quota::per_minute(1);
        assert!(limiter.try_acquire(CLIENT, "route:/a", quota));
        assert!(limiter.try_acquire(CLIENT, "route:/b", quota));
        assert!(!limiter.try_acquire(CLIENT, "route:/a", quota));
    }

    #[test]
    fn clients_are_counted_independently() {
        let limiter = RateLimiter::new();
        let quota = Quota::per_minute(1);
        let other = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7));
        assert!(limiter.try_acquire(CLIENT, "route:/a", quota));
        assert!(limiter.try_acquire(other, "route:/a", quota));
    }

    #[test]
    fn scopes_do_not_share_counters() {
        let limiter = RateLimiter::new();
        let quota = Quota::per_minute(1);
        assert!(limiter.try_acquire(CLIENT, "default:/a", quota));
        assert!(limiter.try_acquire(CLIENT, "route:/a", quota));
    }
}
