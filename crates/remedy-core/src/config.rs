use std::fmt;
use std::time::Duration;

use crate::error::{RemedyError, Result};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_WORKFLOW: &str = "retry-from-issue.yml";
pub const DEFAULT_REF: &str = "main";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ---------------------------------------------------------------------------
// RepoRef
// ---------------------------------------------------------------------------

/// A repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        match trimmed.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(RemedyError::InvalidConfig(format!(
                "repository '{raw}' must have the form 'owner/name'"
            ))),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// ---------------------------------------------------------------------------
// RemoteConfig
// ---------------------------------------------------------------------------

/// Everything the GitHub effector needs. Built once at startup and handed to
/// [`crate::github::GithubEffector::new`].
#[derive(Clone)]
pub struct RemoteConfig {
    pub api_base: String,
    pub token: String,
    pub repo: RepoRef,
    /// Workflow file name whose `workflow_dispatch` trigger performs retries.
    pub workflow: String,
    /// Git ref the retry workflow runs on.
    pub git_ref: String,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(token: impl Into<String>, repo: RepoRef) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: token.into(),
            repo,
            workflow: DEFAULT_WORKFLOW.to_string(),
            git_ref: DEFAULT_REF.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_workflow(mut self, workflow: impl Into<String>) -> Self {
        self.workflow = workflow.into();
        self
    }

    pub fn with_git_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = git_ref.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reject values that would only fail later, on the first remote call.
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(RemedyError::InvalidConfig("GitHub token is empty".into()));
        }
        if self.workflow.trim().is_empty() {
            return Err(RemedyError::InvalidConfig("workflow name is empty".into()));
        }
        if self.git_ref.trim().is_empty() {
            return Err(RemedyError::InvalidConfig("git ref is empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(RemedyError::InvalidConfig(
                "timeout must be greater than zero".into(),
            ));
        }
        url::Url::parse(&self.api_base).map_err(|e| {
            RemedyError::InvalidConfig(format!("invalid API base '{}': {e}", self.api_base))
        })?;
        Ok(())
    }
}

// The token never appears in logs or panics.
impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .field("repo", &self.repo)
            .field("workflow", &self.workflow)
            .field("git_ref", &self.git_ref)
            .field("timeout", &self.timeout)
            .finish()
    }
}
