use std::{num::NonZeroU32, sync::Arc, time::Duration};

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chorus_config::RateLimitConfig;
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DashMapStateStore};
use http::StatusCode;

type KeyedLimiter = RateLimiter<String, DashMapStateStore<String>, DefaultClock>;

/// In-memory per-IP request limiter backed by governor
#[derive(Clone)]
pub struct RequestLimiter {
    limiter: Arc<KeyedLimiter>,
}

impl RequestLimiter {
    /// Create a limiter allowing `requests` per `window_secs` per client
    pub fn new(config: &RateLimitConfig) -> anyhow::Result<Self> {
        let window = Duration::from_secs(config.window_secs);
        if window.is_zero() {
            anyhow::bail!("rate limit window must be > 0");
        }

        let per_second = f64::from(config.requests.max(1)) / window.as_secs_f64();
        let replenish_interval = Duration::from_secs_f64(1.0 / per_second);
        let burst = NonZeroU32::new(config.requests.max(1)).ok_or_else(|| anyhow::anyhow!("requests must be > 0"))?;

        let quota = Quota::with_period(replenish_interval)
            .ok_or_else(|| anyhow::anyhow!("invalid rate limit period"))?
            .allow_burst(burst);

        Ok(Self {
            limiter: Arc::new(RateLimiter::dashmap(quota)),
        })
    }

    /// Check whether a request from `key` is allowed
    fn check(&self, key: &str) -> Result<(), u64> {
        match self.limiter.check_key(&key.to_string()) {
            Ok(()) => Ok(()),
            Err(not_until) => {
                let retry_after =
                    not_until.wait_time_from(governor::clock::Clock::now(&governor::clock::DefaultClock::default()));
                Err(retry_after.as_secs().max(1))
            }
        }
    }
}

/// Per-IP rate limiting middleware for the public API surface
pub async fn rate_limit_middleware(limiter: Arc<RequestLimiter>, request: Request, next: Next) -> Response {
    let key = extract_client_ip(&request).unwrap_or_else(|| "unknown".to_string());

    if let Err(retry_after) = limiter.check(&key) {
        let body = serde_json::json!({
            "error": {
                "message": "Too many requests from this IP, please try again later.",
                "type": "rate_limit_error",
                "status": 429,
            }
        });

        let mut response = (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();
        if let Ok(value) = retry_after.to_string().parse() {
            response.headers_mut().insert("retry-after", value);
        }
        return response;
    }

    next.run(request).await
}

fn extract_client_ip(request: &Request) -> Option<String> {
    // Try X-Forwarded-For first
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(first) = value.split(',').next()
    {
        return Some(first.trim().to_string());
    }

    // Try X-Real-IP
    if let Some(real_ip) = request.headers().get("x-real-ip")
        && let Ok(value) = real_ip.to_str()
    {
        return Some(value.trim().to_string());
    }

    None
}
