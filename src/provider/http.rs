//! Shared HTTP client and status mapping.

use std::sync::OnceLock;
use std::time::Duration;

use crate::error::ResearchError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

const USER_AGENT: &str = concat!("research-assistant/", env!("CARGO_PKG_VERSION"));

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default()
    })
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> ResearchError {
    match status {
        401 | 403 => ResearchError::Authentication(body.to_string()),
        429 => ResearchError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => ResearchError::api(status, body),
    }
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}

/// Trim a trailing slash so paths can be appended with `format!`.
pub fn normalize_base_url(base_url: impl Into<String>) -> String {
    let mut base = base_url.into();
    while base.ends_with('/') {
        base.pop();
    }
    base
}
