use anyhow::{Context, Result};
use clap::Args;
use remedy_core::config::{self, RemoteConfig, RepoRef};
use remedy_core::github::GithubEffector;
use remedy_server::AppState;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// Process configuration, resolved once at startup from flags or environment.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on (0 = OS-assigned)
    #[arg(long, env = "REMEDY_PORT", default_value = "8000")]
    port: u16,

    /// Address to bind
    #[arg(long, env = "REMEDY_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// GitHub token used for label and workflow-dispatch calls
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: String,

    /// Target repository as owner/name
    #[arg(long, env = "REMEDY_REPO")]
    repo: String,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = config::DEFAULT_API_BASE)]
    api_url: String,

    /// Workflow file dispatched for retries
    #[arg(long, env = "REMEDY_WORKFLOW", default_value = config::DEFAULT_WORKFLOW)]
    workflow: String,

    /// Git ref the retry workflow runs on
    #[arg(long = "ref", env = "REMEDY_REF", default_value = config::DEFAULT_REF)]
    git_ref: String,

    /// Timeout for each GitHub call, in seconds
    #[arg(long, env = "REMEDY_TIMEOUT_SECS", default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Slack signing secret; when set, unsigned requests are rejected
    #[arg(long, env = "SLACK_SIGNING_SECRET", hide_env_values = true)]
    signing_secret: Option<String>,
}

impl ServeArgs {
    fn remote_config(&self) -> Result<RemoteConfig> {
        let repo = RepoRef::parse(&self.repo)?;
        let config = RemoteConfig::new(self.github_token.clone(), repo)
            .with_api_base(self.api_url.clone())
            .with_workflow(self.workflow.clone())
            .with_git_ref(self.git_ref.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs));
        config.validate()?;
        Ok(config)
    }

    fn app_state(&self) -> Result<AppState> {
        let config = self.remote_config()?;
        let effector = GithubEffector::new(&config).context("failed to build GitHub client")?;
        let mut state = AppState::new(effector);
        match self.signing_secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() => {
                state = state.with_signing_secret(secret);
            }
            _ => {
                tracing::warn!(
                    "SLACK_SIGNING_SECRET not set; inbound requests are not authenticated"
                );
            }
        }
        Ok(state)
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(args: ServeArgs) -> Result<()> {
    let state = args.app_state()?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let addr = format!("{}:{}", args.bind, args.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        };
        remedy_server::serve_on(state, listener, shutdown).await
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ServeArgs,
    }

    fn parse(extra: &[&str]) -> ServeArgs {
        let mut argv = vec![
            "remedy",
            "--github-token",
            "tok",
            "--repo",
            "acme/widgets",
        ];
        argv.extend_from_slice(extra);
        Harness::try_parse_from(argv).unwrap().args
    }

    #[test]
    fn remote_config_uses_defaults() {
        let config = parse(&[]).remote_config().unwrap();
        assert_eq!(config.repo.to_string(), "acme/widgets");
        assert_eq!(config.workflow, "retry-from-issue.yml");
        assert_eq!(config.git_ref, "main");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn remote_config_applies_overrides() {
        let config = parse(&[
            "--workflow",
            "ci.yml",
            "--ref",
            "release",
            "--timeout-secs",
            "3",
            "--api-url",
            "https://ghe.example.com/api/v3",
        ])
        .remote_config()
        .unwrap();
        assert_eq!(config.workflow, "ci.yml");
        assert_eq!(config.git_ref, "release");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.api_base, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn bad_repo_is_rejected() {
        let args = Harness::try_parse_from(["remedy", "--github-token", "tok", "--repo", "widgets"])
            .unwrap()
            .args;
        assert!(args.remote_config().is_err());
    }

    #[test]
    fn blank_signing_secret_disables_check() {
        let state = parse(&["--signing-secret", "  "]).app_state().unwrap();
        assert!(state.signing_secret.is_none());
        let state = parse(&["--signing-secret", "shh"]).app_state().unwrap();
        assert_eq!(state.signing_secret.as_deref(), Some("shh"));
    }
}
