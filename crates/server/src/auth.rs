//! Bearer-key authentication and per-key rate limiting.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use loadbridge_core::config::AuthConfig;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::envelope::plain_error;

/// Request timestamps for one key inside the sliding window.
#[derive(Debug, Default)]
struct RateLimitEntry {
    requests: Vec<Instant>,
}

impl RateLimitEntry {
    /// Drop expired requests, then admit the new one if there is room.
    fn try_admit(&mut self, window: Duration, limit: usize) -> Option<usize> {
        let now = Instant::now();
        self.requests.retain(|&at| now.duration_since(at) < window);

        if self.requests.len() >= limit {
            return None;
        }
        self.requests.push(now);
        Some(limit - self.requests.len())
    }
}

#[derive(Debug, Clone)]
pub struct AuthManager {
    api_key: Option<Arc<SecretString>>,
    requests_per_minute: u32,
    rate_limit_window: Duration,
    rate_limits: Arc<RwLock<HashMap<String, RateLimitEntry>>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenialReason {
    NotConfigured,
    MissingKey,
    InvalidKey,
    RateLimited,
}

impl DenialReason {
    pub fn status(self) -> StatusCode {
        match self {
            Self::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingKey | Self::InvalidKey => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::NotConfigured => "Server configuration error",
            Self::MissingKey => "Not authenticated",
            Self::InvalidKey => "Invalid API Key",
            Self::RateLimited => "Rate limit exceeded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    Allowed { remaining_requests: u32 },
    Denied { reason: DenialReason, retry_after: Option<u64> },
}

impl AuthResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AuthResult::Allowed { .. })
    }

    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self {
            AuthResult::Denied { reason, .. } => Some(*reason),
            AuthResult::Allowed { .. } => None,
        }
    }
}

impl AuthManager {
    pub fn new(api_key: Option<SecretString>, requests_per_minute: u32, window: Duration) -> Self {
        Self {
            api_key: api_key
                .filter(|key| !key.expose_secret().trim().is_empty())
                .map(Arc::new),
            requests_per_minute,
            rate_limit_window: window,
            rate_limits: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.api_key.clone(),
            config.requests_per_minute,
            Duration::from_secs(config.window_secs),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn validate_request(&self, presented: Option<&str>) -> AuthResult {
        let Some(expected) = &self.api_key else {
            return AuthResult::Denied { reason: DenialReason::NotConfigured, retry_after: None };
        };

        let Some(key) = presented else {
            return AuthResult::Denied { reason: DenialReason::MissingKey, retry_after: None };
        };

        if key != expected.expose_secret() {
            return AuthResult::Denied { reason: DenialReason::InvalidKey, retry_after: None };
        }

        let limit = self.requests_per_minute as usize;
        let mut limits = self.rate_limits.write().await;
        let entry = limits.entry(key.to_string()).or_default();

        match entry.try_admit(self.rate_limit_window, limit) {
            Some(remaining) => {
                debug!(remaining, "request admitted");
                AuthResult::Allowed { remaining_requests: remaining as u32 }
            }
            None => AuthResult::Denied {
                reason: DenialReason::RateLimited,
                retry_after: Some(self.rate_limit_window.as_secs().max(1)),
            },
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

pub async fn require_api_key(
    State(auth): State<AuthManager>,
    request: Request,
    next: Next,
) -> Response {
    let result = auth.validate_request(bearer_token(request.headers())).await;

    let (reason, retry_after) = match result {
        AuthResult::Allowed { .. } => return next.run(request).await,
        AuthResult::Denied { reason, retry_after } => (reason, retry_after),
    };

    let path = request.uri().path().to_string();
    match reason {
        DenialReason::NotConfigured => error!(
            event_name = "auth.api_key.not_configured",
            path = %path,
            "api key is not configured; refusing request"
        ),
        DenialReason::RateLimited => warn!(
            event_name = "auth.rate_limit.exceeded",
            path = %path,
            "rate limit exceeded"
        ),
        DenialReason::MissingKey | DenialReason::InvalidKey => warn!(
            event_name = "auth.api_key.rejected",
            path = %path,
            reason = reason.message(),
            "request rejected"
        ),
    }

    let mut response = plain_error(reason.status(), reason.message());
    if let Some(seconds) = retry_after {
        if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
    }
    response
}
