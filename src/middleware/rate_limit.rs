// src/middleware/rate_limit.rs - Rate limiting (placeholder: collaborator concern)
use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use std::time::Duration;

use crate::middleware::error_handler::ApiError;

/// Rate limiting middleware with a sliding-window algorithm. The actual
/// window tracking is out of core scope for the scoring pipeline (see
/// Non-goals); this enforces the shape of the contract — headers, 429s,
/// per-endpoint limits — against a placeholder backing store.
pub async fn rate_limit(request: Request, next: Next) -> Result<Response, ApiError> {
    let rate_key = extract_rate_limit_key(&request);
    let (limit, window) = get_rate_limits(&request);

    if should_skip_rate_limiting(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    tracing::debug!(
        rate_key = %rate_key,
        limit = limit,
        window_seconds = window.as_secs(),
        "checking rate limit"
    );

    // TODO: back this with a real sliding-window store once rate limiting
    // moves from "ambient concern" to an enforced SLA.
    let (allowed, remaining, reset_time) = check_rate_limit(&rate_key, limit, window).await;

    if !allowed {
        tracing::warn!(rate_key = %rate_key, limit = limit, "rate limit exceeded");
        return Err(ApiError::RateLimit { limit, window: window.as_secs() });
    }

    let mut response = next.run(request).await;
    add_rate_limit_headers(&mut response, limit, remaining, reset_time);
    Ok(response)
}

fn extract_rate_limit_key(request: &Request) -> String {
    let ip = extract_client_ip(request);
    let user_id = crate::middleware::auth::extract_user_id(request);
    let endpoint_class = classify_endpoint_for_rate_limit(request.uri().path());

    match user_id {
        Some(uid) => format!("rate_limit:user:{uid}:{endpoint_class}:{ip}"),
        None => format!("rate_limit:ip:{ip}:{endpoint_class}"),
    }
}

fn get_rate_limits(request: &Request) -> (u32, Duration) {
    let endpoint_class = classify_endpoint_for_rate_limit(request.uri().path());
    match endpoint_class {
        "health" => (1000, Duration::from_secs(60)),
        "ingest" => (120, Duration::from_secs(60)),
        "rules" => (30, Duration::from_secs(60)),
        "dashboard" => (60, Duration::from_secs(60)),
        "docs" => (200, Duration::from_secs(60)),
        _ => (100, Duration::from_secs(60)),
    }
}

fn should_skip_rate_limiting(path: &str) -> bool {
    matches!(path, "/metrics" | "/ready")
}

fn classify_endpoint_for_rate_limit(path: &str) -> &'static str {
    match path {
        "/health" | "/ready" | "/metrics" => "health",
        path if path.starts_with("/api/v1/transactions") => "ingest",
        path if path.starts_with("/api/v1/rules") => "rules",
        path if path.starts_with("/api/v1/dashboard") => "dashboard",
        path if path.starts_with("/api/v1/alerts") => "alerts",
        path if path.starts_with("/docs") => "docs",
        _ => "general",
    }
}

fn extract_client_ip(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for").and_then(|h| h.to_str().ok()) {
        if let Some(first_ip) = forwarded.split(',').next() {
            return first_ip.trim().to_string();
        }
    }
    if let Some(real_ip) = request.headers().get("x-real-ip").and_then(|h| h.to_str().ok()) {
        return real_ip.to_string();
    }
    "unknown".to_string()
}

async fn check_rate_limit(_key: &str, _limit: u32, _window: Duration) -> (bool, u32, u64) {
    let allowed = true;
    let remaining = 50;
    let reset_time = chrono::Utc::now().timestamp() as u64 + 60;
    (allowed, remaining, reset_time)
}

fn add_rate_limit_headers(response: &mut Response, limit: u32, remaining: u32, reset_time: u64) {
    let headers = response.headers_mut();
    if let Ok(v) = HeaderValue::from_str(&limit.to_string()) {
        headers.insert("x-rate-limit-limit", v);
    }
    if let Ok(v) = HeaderValue::from_str(&remaining.to_string()) {
        headers.insert("x-rate-limit-remaining", v);
    }
    if let Ok(v) = HeaderValue::from_str(&reset_time.to_string()) {
        headers.insert("x-rate-limit-reset", v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_endpoints() {
        assert_eq!(classify_endpoint_for_rate_limit("/health"), "health");
        assert_eq!(classify_endpoint_for_rate_limit("/api/v1/transactions"), "ingest");
        assert_eq!(classify_endpoint_for_rate_limit("/api/v1/rules"), "rules");
        assert_eq!(classify_endpoint_for_rate_limit("/api/v1/dashboard/summary"), "dashboard");
        assert_eq!(classify_endpoint_for_rate_limit("/unknown"), "general");
    }

    #[test]
    fn skips_metrics_and_ready() {
        assert!(should_skip_rate_limiting("/metrics"));
        assert!(should_skip_rate_limiting("/ready"));
        assert!(!should_skip_rate_limiting("/health"));
    }
}
