//! Shared-password access control for axum.
//!
//! When an access password is configured, every request must carry HTTP Basic
//! credentials whose password matches it. The username is not checked.
//!
//! ```text
//! Authorization: Basic base64(<any user>:<password>)
//! ```
//!
//! # Example
//!
//! ```ignore
//! let password: AccessPassword = Arc::new(Secret::new("hunter2".to_string()));
//!
//! let app = Router::new()
//!     .nest("/api/interviews", interview_routes(handlers))
//!     .layer(middleware::from_fn_with_state(password, basic_auth_middleware));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use secrecy::{ExposeSecret, Secret};
use subtle::ConstantTimeEq;

use crate::adapters::http::interview::ErrorResponse;
use crate::domain::foundation::ErrorCode;

/// Middleware state - the configured password.
pub type AccessPassword = Arc<Secret<String>>;

const CHALLENGE: &str = "Basic realm=\"survey-debrief\"";

/// Rejects requests whose Basic credentials do not carry the access password.
pub async fn basic_auth_middleware(
    State(password): State<AccessPassword>,
    request: Request,
    next: Next,
) -> Response {
    let supplied = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(basic_password);

    match supplied {
        Some(supplied) if passwords_match(&supplied, password.expose_secret()) => {
            next.run(request).await
        }
        Some(_) => {
            tracing::warn!(path = %request.uri().path(), "Rejected access password");
            unauthorized()
        }
        None => unauthorized(),
    }
}

/// Extracts the password from a `Basic` authorization header value.
fn basic_password(header_value: &str) -> Option<String> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (_user, password) = credentials.split_once(':')?;
    Some(password.to_string())
}

fn passwords_match(supplied: &str, expected: &str) -> bool {
    supplied.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn unauthorized() -> Response {
    let mut response = (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(
            ErrorCode::Unauthorized,
            "Access password required",
        )),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE));
    response
}
