//! Rate limiting middleware
//!
//! Token bucket rate limiting keyed by client IP, applied to the
//! authentication endpoints.
//!
//! ```ignore
//! use gitadora_api::ratelimit::RateLimitLayer;
//!
//! let app = Router::new()
//!     .route("/api/v1/auth/login", post(login))
//!     .layer(RateLimitLayer::auth()); // 10 requests per minute
//! ```

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json,
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, HeaderValue, Request, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;
use tokio::sync::Mutex;
use tower::{Layer, Service};
use tracing::warn;

/// Rate limit configuration
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub requests_per_window: u32,
    pub window: Duration,

    /// Key buckets by `X-Forwarded-For`/`X-Real-IP` instead of the peer
    /// address. Only safe behind a proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::auth()
    }
}

impl RateLimitConfig {
    pub fn new(requests_per_window: u32, window: Duration) -> Self {
        Self {
            requests_per_window: requests_per_window.max(1),
            window,
            trust_proxy_headers: false,
        }
    }

    pub fn with_trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    /// Config for auth endpoints (10 req/min)
    pub fn auth() -> Self {
        Self::new(10, Duration::from_secs(60))
    }
}

/// Token bucket entry for a single IP
#[derive(Clone, Debug)]
struct TokenBucket {
    tokens: u32,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(max_tokens: u32) -> Self {
        Self {
            tokens: max_tokens,
            last_refill: Instant::now(),
        }
    }

    /// Try to consume a token, returns true if allowed
    fn try_consume(&mut self, max_tokens: u32, window: Duration) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);

        if elapsed >= window {
            self.tokens = max_tokens;
            self.last_refill = now;
        } else {
            let refill_rate = max_tokens as f64 / window.as_secs_f64();
            let refill_amount = (elapsed.as_secs_f64() * refill_rate) as u32;

            if refill_amount > 0 {
                self.tokens = (self.tokens + refill_amount).min(max_tokens);
                self.last_refill = now;
            }
        }

        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }
}

/// Shared rate limiter state
#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<Mutex<HashMap<IpAddr, TokenBucket>>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    /// Check if request is allowed for the given IP
    pub async fn check(&self, ip: IpAddr) -> bool {
        let mut buckets = self.buckets.lock().await;
        let max_tokens = self.config.requests_per_window;

        // Idle buckets are full again; drop them so the map stays bounded
        if buckets.len() > 10_000 {
            let window = self.config.window;
            buckets.retain(|_, bucket| bucket.last_refill.elapsed() < window);
        }

        buckets
            .entry(ip)
            .or_insert_with(|| TokenBucket::new(max_tokens))
            .try_consume(max_tokens, self.config.window)
    }
}

/// Rate limiting layer for Tower middleware
#[derive(Clone)]
pub struct RateLimitLayer {
    limiter: RateLimiter,
}

impl RateLimitLayer {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiter: RateLimiter::new(config),
        }
    }

    /// Create a rate limit layer for auth endpoints
    pub fn auth() -> Self {
        Self::new(RateLimitConfig::auth())
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            limiter: self.limiter.clone(),
        }
    }
}

/// Rate limiting service
#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    limiter: RateLimiter,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let limiter = self.limiter.clone();
        let inner = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, inner);

        Box::pin(async move {
            let ip = bucket_key(&req, limiter.config.trust_proxy_headers);

            if !limiter.check(ip).await {
                warn!(ip = %ip, "Rate limit exceeded");
                return Ok(rate_limit_response(limiter.config.window));
            }

            inner.call(req).await
        })
    }
}

/// Address a request is counted against
///
/// Without a peer address (in-process tests) everything shares the loopback
/// bucket.
fn bucket_key(req: &Request<Body>, trust_proxy_headers: bool) -> IpAddr {
    trust_proxy_headers
        .then(|| client_ip(req.headers()))
        .flatten()
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0.ip())
        })
        .unwrap_or(IpAddr::from([127, 0, 0, 1]))
}

/// Client IP from proxy headers (X-Forwarded-For, then X-Real-IP)
pub fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    if let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(first_ip) = value.split(',').next()
        && let Ok(ip) = first_ip.trim().parse()
    {
        return Some(ip);
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Create a 429 Too Many Requests response
fn rate_limit_response(window: Duration) -> Response {
    let body = serde_json::json!({
        "error": "RATE_LIMITED",
        "message": "Too many requests. Please try again later.",
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(RETRY_AFTER, HeaderValue::from(window.as_secs().max(1)));
    response
}
