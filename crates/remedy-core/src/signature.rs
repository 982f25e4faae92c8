//! Slack request signing (`v0` scheme).
//!
//! Slack signs `v0:<timestamp>:<raw body>` with HMAC-SHA256 keyed by the app's
//! signing secret and sends the hex digest as `v0=<hex>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{RemedyError, Result};

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Requests older (or newer) than this are rejected to limit replay.
pub const MAX_CLOCK_SKEW_SECS: i64 = 300;

const VERSION: &str = "v0";

/// Compute the `v0=<hex>` signature for a request body.
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> String {
    let digest = mac(secret, timestamp, body).finalize().into_bytes();
    format!("{VERSION}={}", hex::encode(digest))
}

/// Verify a signed request. `now` is the current unix time in seconds.
pub fn verify(
    secret: &str,
    timestamp: &str,
    signature: &str,
    body: &[u8],
    now: i64,
) -> Result<()> {
    let sent_at: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| unauthorized("request timestamp is not a unix time"))?;
    if now.abs_diff(sent_at) > MAX_CLOCK_SKEW_SECS.unsigned_abs() {
        return Err(unauthorized("request timestamp is outside the allowed window"));
    }

    let digest_hex = signature
        .trim()
        .strip_prefix("v0=")
        .ok_or_else(|| unauthorized("signature must use v0=<hex> format"))?;
    if digest_hex.is_empty() {
        return Err(unauthorized("signature digest is empty"));
    }
    let expected =
        hex::decode(digest_hex).map_err(|_| unauthorized("signature digest is not valid hex"))?;

    mac(secret, timestamp.trim(), body)
        .verify_slice(&expected)
        .map_err(|_| unauthorized("signature verification failed"))
}

fn mac(secret: &str, timestamp: &str, body: &[u8]) -> Hmac<Sha256> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(secret.as_bytes())
        .expect("infallible: hmac accepts keys of any length");
    mac.update(VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    mac
}

fn unauthorized(msg: &str) -> RemedyError {
    RemedyError::Unauthorized(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const NOW: i64 = 1_531_420_618;

    #[test]
    fn signed_request_verifies() {
        let body = b"payload=%7B%7D";
        let sig = sign(SECRET, "1531420618", body);
        assert!(sig.starts_with("v0="));
        assert_eq!(sig.len(), 3 + 64);
        verify(SECRET, "1531420618", &sig, body, NOW).unwrap();
    }

    #[test]
    fn tampered_body_is_rejected() {
        let sig = sign(SECRET, "1531420618", b"payload=a");
        let err = verify(SECRET, "1531420618", &sig, b"payload=b", NOW).unwrap_err();
        assert!(matches!(err, RemedyError::Unauthorized(_)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let sig = sign("other", "1531420618", b"x");
        assert!(verify(SECRET, "1531420618", &sig, b"x", NOW).is_err());
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let ts = (NOW - MAX_CLOCK_SKEW_SECS - 1).to_string();
        let sig = sign(SECRET, &ts, b"x");
        assert!(verify(SECRET, &ts, &sig, b"x", NOW).is_err());
    }

    #[test]
    fn timestamp_at_window_edge_is_accepted() {
        let ts = (NOW - MAX_CLOCK_SKEW_SECS).to_string();
        let sig = sign(SECRET, &ts, b"x");
        verify(SECRET, &ts, &sig, b"x", NOW).unwrap();
    }

    #[test]
    fn malformed_signature_header_is_rejected() {
        for sig in ["", "v1=abcd", "v0=", "v0=abc", "v0=zz"] {
            assert!(
                verify(SECRET, "1531420618", sig, b"x", NOW).is_err(),
                "expected '{sig}' to be rejected"
            );
        }
        assert!(verify(SECRET, "yesterday", "v0=00", b"x", NOW).is_err());
    }

    #[test]
    fn extreme_timestamps_are_rejected_without_overflow() {
        for ts in [i64::MIN, i64::MAX] {
            let ts = ts.to_string();
            let err = verify(SECRET, &ts, "v0=00", b"x", NOW).unwrap_err();
            match err {
                RemedyError::Unauthorized(msg) => assert!(msg.contains("window"), "got {msg}"),
                other => panic!("expected Unauthorized, got {other:?}"),
            }
        }
        let err = verify(SECRET, "-9223372036854775808", "v0=00", b"x", i64::MAX).unwrap_err();
        assert!(matches!(err, RemedyError::Unauthorized(_)));
    }
}
