//! Identity and authentication.
//!
//! Facilitator routes are guarded by a pre-shared key compared in constant
//! time. Players are identified by the name their session provider forwards.

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;

use crate::errors::{codes, ErrorDetails, ErrorResponse};

/// Header name for the facilitator key.
pub const CONTROL_KEY_HEADER: &str = "x-control-key";

/// Header carrying the player's name from the session provider.
pub const PLAYER_HEADER: &str = "x-player-name";

/// The player name attached to a request, if any.
pub fn player_name(headers: &HeaderMap) -> Option<String> {
    headers
        .get(PLAYER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// The facilitator key presented in `x-control-key` or as a bearer token.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CONTROL_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
}

/// Middleware guarding the facilitator routes with the configured key.
pub async fn control_auth_layer(
    expected_key: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    // No key configured: control is open (dev mode)
    let Some(expected) = expected_key else {
        return next.run(request).await;
    };

    let matched = presented_key(request.headers()).map(|key| constant_time_compare(key, &expected));
    match matched {
        Some(true) => next.run(request).await,
        Some(false) => unauthorized_response("Invalid control key"),
        None => unauthorized_response("Missing control key"),
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    // Constant-time comparison
    a_bytes.ct_eq(b_bytes).into()
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: codes::UNAUTHORIZED.to_string(),
            message: message.to_string(),
        },
        revision_id: 0,
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("quiz-key", "quiz-key"));
        assert!(!constant_time_compare("quiz-key", "quiz-kez"));
        assert!(!constant_time_compare("quiz", "quiz-key"));
    }

    #[test]
    fn test_player_name_from_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(player_name(&headers), None);

        headers.insert(PLAYER_HEADER, "  alice ".parse().unwrap());
        assert_eq!(player_name(&headers), Some("alice".to_string()));

        headers.insert(PLAYER_HEADER, "   ".parse().unwrap());
        assert_eq!(player_name(&headers), None);
    }

    #[test]
    fn test_presented_key_prefers_control_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(presented_key(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer from-bearer".parse().unwrap());
        assert_eq!(presented_key(&headers), Some("from-bearer"));

        headers.insert(CONTROL_KEY_HEADER, "from-header".parse().unwrap());
        assert_eq!(presented_key(&headers), Some("from-header"));
    }

    #[test]
    fn test_presented_key_ignores_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(presented_key(&headers), None);
    }
}
