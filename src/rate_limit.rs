//! Process-wide sliding window rate limiter and its axum middleware.
//!
//! One [`RateLimiter`] is built at start-up and shared by every route; it is
//! not partitioned per client. The client address is only used for logging.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

const TOO_MANY_REQUESTS: &str = "Too many requests, please try again later.";

/// Sliding window limiter admitting at most `max_requests` per `window`
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    /// Admission times inside the current window, oldest first
    admitted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests as usize,
            window,
            admitted: Mutex::new(VecDeque::with_capacity(max_requests as usize)),
        }
    }

    /// Admit a request now, or return how long until a slot frees up
    pub fn try_acquire(&self) -> Result<(), Duration> {
        self.try_acquire_at(Instant::now())
    }

    fn try_acquire_at(&self, now: Instant) -> Result<(), Duration> {
        let mut admitted = self
            .admitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        while let Some(&oldest) = admitted.front() {
            if now.duration_since(oldest) >= self.window {
                admitted.pop_front();
            } else {
                break;
            }
        }

        if admitted.len() < self.max_requests {
            admitted.push_back(now);
            return Ok(());
        }

        let wait = admitted
            .front()
            .map(|&oldest| self.window.saturating_sub(now.duration_since(oldest)))
            .unwrap_or(self.window);
        Err(wait)
    }
}

/// Middleware rejecting requests over the global limit with 429
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    match limiter.try_acquire() {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            warn!(
                client = %client_address(&request),
                path = %request.uri().path(),
                "Rate limit exceeded"
            );
            let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, seconds.max(1).to_string())],
                Json(json!({ "message": TOO_MANY_REQUESTS })),
            )
                .into_response()
        }
    }
}

/// Client address as reported by the reverse proxy, falling back to the socket peer
fn client_address(request: &Request) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|first| first.trim().to_string())
        .filter(|first| !first.is_empty())
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http;

    #[test]
    fn test_rate_limiter() {
        let limiter = RateLimiter::new(2, Duration::from_secs(1));

        // Should allow first 2 requests
        assert!(limiter.try_acquire().is_ok());
        assert!(limiter.try_acquire().is_ok());

        // Should deny 3rd request
        let wait = limiter.try_acquire().unwrap_err();
        assert!(wait > Duration::ZERO);
        assert!(wait <= Duration::from_secs(1));
    }

    #[test]
    fn test_twenty_first_request_in_a_second_is_rejected() {
        let limiter = RateLimiter::new(20, Duration::from_secs(1));
        let start = Instant::now();

        let outcomes: Vec<bool> = (0..21)
            .map(|i| {
                limiter
                    .try_acquire_at(start + Duration::from_millis(i * 10))
                    .is_ok()
            })
            .collect();

        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 20);
        assert!(!outcomes[20]);
    }

    #[test]
    fn test_window_slides() {
        let limiter = RateLimiter::new(2, Duration::from_secs(1));
        let start = Instant::now();

        assert!(limiter.try_acquire_at(start).is_ok());
        assert!(limiter.try_acquire_at(start + Duration::from_millis(600)).is_ok());
        assert!(limiter.try_acquire_at(start + Duration::from_millis(900)).is_err());

        // first admission has left the window, the second has not
        assert!(limiter.try_acquire_at(start + Duration::from_millis(1000)).is_ok());
        assert_eq!(
            limiter
                .try_acquire_at(start + Duration::from_millis(1100))
                .unwrap_err(),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn test_client_address_prefers_forwarded_for() {
        let request = http::Request::builder()
            .uri("/weather")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_address(&request), "203.0.113.7");

        let mut request = http::Request::builder().uri("/weather").body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
        assert_eq!(client_address(&request), "127.0.0.1");

        let request = http::Request::builder().uri("/weather").body(Body::empty()).unwrap();
        assert_eq!(client_address(&request), "unknown");
    }
}
