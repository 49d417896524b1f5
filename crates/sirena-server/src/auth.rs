//! Operator API key authentication (Bearer token)

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::OnceLock;

static API_KEY: OnceLock<String> = OnceLock::new();

/// Set the API key once at startup; later calls are ignored
pub fn init_api_key(key: String) {
    let _ = API_KEY.set(key);
}

fn api_key() -> Option<&'static str> {
    API_KEY
        .get()
        .map(String::as_str)
        .filter(|key| !key.is_empty())
}

/// Token from an `Authorization: Bearer <token>` header value
fn bearer_token(value: &str) -> Option<&str> {
    value.strip_prefix("Bearer ").map(str::trim)
}

/// Reject requests whose bearer token does not match the API key
///
/// Without a configured key every request passes (local development).
pub async fn auth_middleware(request: Request, next: Next) -> Result<Response, StatusCode> {
    let Some(expected) = api_key() else {
        return Ok(next.run(request).await);
    };

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token);

    match token {
        Some(token) if token == expected => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!("Invalid API key attempted");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("Missing or malformed Authorization header");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(bearer_token("Basic abc123"), None);
        assert_eq!(bearer_token("abc123"), None);
    }
}
