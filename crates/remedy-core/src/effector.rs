use std::future::Future;

use serde::Serialize;
use thiserror::Error;

/// Failure of a single remote call. Carries enough detail for the human who
/// triggered the action to see what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemoteError {
    #[error("remote returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("remote call timed out")]
    Timeout,

    #[error("remote call failed: {message}")]
    Transport { message: String },
}

impl RemoteError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The two remote operations the dispatch engine may invoke.
///
/// Implementations never retry internally; a failed call is reported once
/// and retry policy is left to whoever triggered the action.
pub trait RemoteEffector {
    /// Ensure `label` is present on `target`. Re-applying a present label is
    /// a no-op on the remote side.
    fn attach_label(
        &self,
        target: &str,
        label: &str,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Ask the automation system to re-run the retry workflow for `target`.
    /// Not idempotent remotely: each call may start a run.
    fn request_retry(&self, target: &str) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
