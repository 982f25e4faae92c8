use std::sync::Arc;

use remedy_core::github::GithubEffector;

/// Shared application state passed to all route handlers.
///
/// Read-only after startup; every request gets its own decode/dispatch run.
#[derive(Clone)]
pub struct AppState {
    pub effector: Arc<GithubEffector>,
    /// Slack signing secret. `None` disables request signature checks.
    pub signing_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(effector: GithubEffector) -> Self {
        Self {
            effector: Arc::new(effector),
            signing_secret: None,
        }
    }

    /// Builder: require Slack request signatures made with `secret`.
    pub fn with_signing_secret(mut self, secret: impl Into<String>) -> Self {
        self.signing_secret = Some(Arc::from(secret.into()));
        self
    }
}
