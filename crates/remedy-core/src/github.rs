//! GitHub REST implementation of [`RemoteEffector`].

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde_json::json;
use url::Url;

use crate::config::{RemoteConfig, RepoRef};
use crate::effector::{RemoteEffector, RemoteError};
use crate::error::{RemedyError, Result};

const ERROR_BODY_LIMIT: usize = 512;

#[derive(Debug, Clone)]
pub struct GithubEffector {
    http: reqwest::Client,
    api_base: Url,
    repo: RepoRef,
    workflow: String,
    git_ref: String,
}

impl GithubEffector {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        config.validate()?;

        let api_base = Url::parse(config.api_base.trim()).map_err(|e| {
            RemedyError::InvalidConfig(format!("invalid API base '{}': {e}", config.api_base))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(RemedyError::InvalidConfig(format!(
                "API base '{}' cannot carry a path",
                config.api_base
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("remedy"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token.trim()))
            .map_err(|_| RemedyError::InvalidConfig("token is not a valid header value".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemedyError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base,
            repo: config.repo.clone(),
            workflow: config.workflow.clone(),
            git_ref: config.git_ref.clone(),
        })
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    fn endpoint(&self, tail: &[&str]) -> std::result::Result<Url, RemoteError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::Transport {
                message: format!("API base '{}' cannot carry a path", self.api_base),
            })?
            .pop_if_empty()
            .extend(["repos", self.repo.owner.as_str(), self.repo.name.as_str()])
            .extend(tail);
        Ok(url)
    }

    fn labels_url(&self, target: &str) -> std::result::Result<Url, RemoteError> {
        self.endpoint(&["issues", target, "labels"])
    }

    fn dispatch_url(&self) -> std::result::Result<Url, RemoteError> {
        self.endpoint(&["actions", "workflows", self.workflow.as_str(), "dispatches"])
    }

    async fn post_json(
        &self,
        url: Url,
        body: &serde_json::Value,
    ) -> std::result::Result<(), RemoteError> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(RemoteError::Status {
            status: status.as_u16(),
            body: truncate_for_error(&text, ERROR_BODY_LIMIT),
        })
    }
}

impl RemoteEffector for GithubEffector {
    async fn attach_label(
        &self,
        target: &str,
        label: &str,
    ) -> std::result::Result<(), RemoteError> {
        let url = self.labels_url(target)?;
        tracing::debug!(repo = %self.repo, pr = %target, label, "attaching label");
        self.post_json(url, &json!({ "labels": [label] })).await
    }

    async fn request_retry(&self, target: &str) -> std::result::Result<(), RemoteError> {
        let url = self.dispatch_url()?;
        tracing::debug!(
            repo = %self.repo,
            pr = %target,
            workflow = %self.workflow,
            "dispatching retry workflow"
        );
        let body = json!({
            "ref": self.git_ref,
            "inputs": {
                "pr_number": target,
                "retry": "true",
            },
        });
        self.post_json(url, &body).await
    }
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::Transport {
            message: err.to_string(),
        }
    }
}

fn truncate_for_error(text: &str, limit: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= limit {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(limit).collect();
    out.push('…');
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
