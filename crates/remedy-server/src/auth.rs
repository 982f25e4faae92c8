use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use remedy_core::signature::{self, SIGNATURE_HEADER, TIMESTAMP_HEADER};

use crate::error::AppError;
use crate::state::AppState;

/// Largest body the signature check will buffer.
const MAX_SIGNED_BODY: usize = 1024 * 1024;

/// Axum middleware that verifies Slack's request signature.
///
/// Auth flow (evaluated in order):
/// 1. No signing secret configured → passthrough
/// 2. Missing signature or timestamp header → 401
/// 3. Body buffered and verified against `v0:<timestamp>:<body>` → 401 on mismatch
/// 4. Request rebuilt with the buffered body and passed on
pub async fn slack_signature_middleware(
    State(app): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(secret) = app.signing_secret.clone() else {
        return next.run(req).await;
    };

    let (parts, body) = req.into_parts();

    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let (Some(sig), Some(timestamp)) = (header(SIGNATURE_HEADER), header(TIMESTAMP_HEADER)) else {
        return AppError::unauthorized("missing Slack signature headers").into_response();
    };

    let bytes = match axum::body::to_bytes(body, MAX_SIGNED_BODY).await {
        Ok(b) => b,
        Err(_) => return AppError::bad_request("request body too large").into_response(),
    };

    let now = chrono::Utc::now().timestamp();
    if let Err(e) = signature::verify(&secret, &timestamp, &sig, &bytes, now) {
        return AppError::from(e).into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
