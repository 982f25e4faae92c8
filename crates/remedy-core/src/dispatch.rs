//! The action → effects table and its executor.

use serde::Serialize;

use crate::action::{ActionKind, ActionRecord};
use crate::effector::{RemoteEffector, RemoteError};

pub const LABEL_RETRY_CI: &str = "retry-ci";
pub const LABEL_HUMAN_REVIEW: &str = "human-review";
pub const LABEL_HUMAN_APPROVED: &str = "human-approved";

// ---------------------------------------------------------------------------
// Effect
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Effect {
    AttachLabel { target: String, label: String },
    RequestRetry { target: String },
}

impl Effect {
    pub fn attach_label(target: &str, label: &str) -> Self {
        Effect::AttachLabel {
            target: target.to_string(),
            label: label.to_string(),
        }
    }

    pub fn request_retry(target: &str) -> Self {
        Effect::RequestRetry {
            target: target.to_string(),
        }
    }

    /// Short human-readable description used in acknowledgments.
    pub fn describe(&self) -> String {
        match self {
            Effect::AttachLabel { label, .. } => format!("attach label '{label}'"),
            Effect::RequestRetry { .. } => "request retry".to_string(),
        }
    }

    async fn apply<E: RemoteEffector>(&self, effector: &E) -> Result<(), RemoteError> {
        match self {
            Effect::AttachLabel { target, label } => effector.attach_label(target, label).await,
            Effect::RequestRetry { target } => effector.request_retry(target).await,
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// The fixed dispatch table. Unknown kinds map to no effects.
pub fn plan(kind: &ActionKind, target: &str) -> Vec<Effect> {
    match kind {
        ActionKind::RetryCi => vec![
            Effect::attach_label(target, LABEL_RETRY_CI),
            Effect::request_retry(target),
        ],
        ActionKind::AssignHuman => vec![Effect::attach_label(target, LABEL_HUMAN_REVIEW)],
        ActionKind::HumanApproved => vec![
            Effect::attach_label(target, LABEL_HUMAN_APPROVED),
            Effect::request_retry(target),
        ],
        ActionKind::Unknown(_) => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectFailure {
    pub effect: Effect,
    pub error: RemoteError,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchOutcome {
    pub kind: ActionKind,
    pub target: String,
    /// Effects that completed, in execution order.
    pub effects_invoked: Vec<Effect>,
    /// Effects that were attempted and failed, in execution order.
    pub failures: Vec<EffectFailure>,
}

impl DispatchOutcome {
    pub fn first_error(&self) -> Option<&EffectFailure> {
        self.failures.first()
    }
}

// ---------------------------------------------------------------------------
// dispatch
// ---------------------------------------------------------------------------

/// Run every effect planned for `record`, in order.
///
/// A failing effect is recorded and the remaining effects still run. Each
/// effect is attempted exactly once.
pub async fn dispatch<E: RemoteEffector + Sync>(
    effector: &E,
    record: &ActionRecord,
) -> DispatchOutcome {
    let kind = record.kind();
    let target = record.target();

    if !kind.is_known() {
        tracing::warn!(
            action = %kind,
            pr = %target,
            "unrecognised action; acknowledging without effects"
        );
    }

    let mut outcome = DispatchOutcome {
        kind: kind.clone(),
        target: target.to_string(),
        effects_invoked: Vec::new(),
        failures: Vec::new(),
    };

    for effect in plan(kind, target) {
        match effect.apply(effector).await {
            Ok(()) => {
                tracing::info!(
                    action = %kind,
                    pr = %target,
                    effect = %effect.describe(),
                    "effect applied"
                );
                outcome.effects_invoked.push(effect);
            }
            Err(error) => {
                tracing::warn!(
                    action = %kind,
                    pr = %target,
                    effect = %effect.describe(),
                    %error,
                    "effect failed"
                );
                outcome.failures.push(EffectFailure { effect, error });
            }
        }
    }

    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::decode;
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::Mutex;

    /// In-memory effector that keeps a label set per target and a call log.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<Effect>>,
        labels: Mutex<BTreeMap<String, BTreeSet<String>>>,
        retries: Mutex<Vec<String>>,
        fail_labels: bool,
        fail_retries: bool,
    }

    impl Recorder {
        fn calls(&self) -> Vec<Effect> {
            self.calls.lock().unwrap().clone()
        }

        fn labels_for(&self, target: &str) -> BTreeSet<String> {
            self.labels
                .lock()
                .unwrap()
                .get(target)
                .cloned()
                .unwrap_or_default()
        }
    }

    impl RemoteEffector for Recorder {
        async fn attach_label(&self, target: &str, label: &str) -> Result<(), RemoteError> {
            self.calls
                .lock()
                .unwrap()
                .push(Effect::attach_label(target, label));
            if self.fail_labels {
                return Err(RemoteError::Status {
                    status: 500,
                    body: "boom".into(),
                });
            }
            self.labels
                .lock()
                .unwrap()
                .entry(target.to_string())
                .or_default()
                .insert(label.to_string());
            Ok(())
        }

        async fn request_retry(&self, target: &str) -> Result<(), RemoteError> {
            self.calls.lock().unwrap().push(Effect::request_retry(target));
            if self.fail_retries {
                return Err(RemoteError::Timeout);
            }
            self.retries.lock().unwrap().push(target.to_string());
            Ok(())
        }
    }

    fn record(value: &str) -> ActionRecord {
        let payload = serde_json::json!({ "actions": [{ "value": value }] }).to_string();
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("payload", &payload)
            .finish();
        decode(body.as_bytes()).unwrap()
    }

    #[test]
    fn plan_matches_table() {
        assert_eq!(
            plan(&ActionKind::RetryCi, "42"),
            vec![
                Effect::attach_label("42", "retry-ci"),
                Effect::request_retry("42")
            ]
        );
        assert_eq!(
            plan(&ActionKind::AssignHuman, "17"),
            vec![Effect::attach_label("17", "human-review")]
        );
        assert_eq!(
            plan(&ActionKind::HumanApproved, "99"),
            vec![
                Effect::attach_label("99", "human-approved"),
                Effect::request_retry("99")
            ]
        );
        assert!(plan(&ActionKind::Unknown("noop".into()), "5").is_empty());
    }

    #[tokio::test]
    async fn retry_ci_labels_then_retries() {
        let recorder = Recorder::default();
        let outcome = dispatch(&recorder, &record("retry-ci|42")).await;

        let expected = vec![
            Effect::attach_label("42", "retry-ci"),
            Effect::request_retry("42"),
        ];
        assert_eq!(recorder.calls(), expected);
        assert_eq!(outcome.effects_invoked, expected);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.kind, ActionKind::RetryCi);
        assert_eq!(outcome.target, "42");
    }

    #[tokio::test]
    async fn assign_human_only_labels() {
        let recorder = Recorder::default();
        let outcome = dispatch(&recorder, &record("assign-human|17")).await;

        assert_eq!(
            outcome.effects_invoked,
            vec![Effect::attach_label("17", "human-review")]
        );
        assert!(recorder.retries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn human_approved_labels_then_retries() {
        let recorder = Recorder::default();
        let outcome = dispatch(&recorder, &record("human-approved|99")).await;

        assert_eq!(
            outcome.effects_invoked,
            vec![
                Effect::attach_label("99", "human-approved"),
                Effect::request_retry("99")
            ]
        );
        assert_eq!(*recorder.retries.lock().unwrap(), vec!["99".to_string()]);
    }

    #[tokio::test]
    async fn unknown_action_invokes_nothing() {
        let recorder = Recorder::default();
        let outcome = dispatch(&recorder, &record("noop-action|5")).await;

        assert!(recorder.calls().is_empty());
        assert!(outcome.effects_invoked.is_empty());
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.kind, ActionKind::Unknown("noop-action".into()));
    }

    #[tokio::test]
    async fn label_failure_does_not_stop_retry() {
        let recorder = Recorder {
            fail_labels: true,
            ..Default::default()
        };
        let outcome = dispatch(&recorder, &record("retry-ci|42")).await;

        assert_eq!(recorder.calls().len(), 2);
        assert_eq!(outcome.effects_invoked, vec![Effect::request_retry("42")]);
        let first = outcome.first_error().unwrap();
        assert_eq!(first.effect, Effect::attach_label("42", "retry-ci"));
        assert_eq!(first.error.status(), Some(500));
    }

    #[tokio::test]
    async fn retry_failure_is_recorded_after_label() {
        let recorder = Recorder {
            fail_retries: true,
            ..Default::default()
        };
        let outcome = dispatch(&recorder, &record("human-approved|99")).await;

        assert_eq!(
            outcome.effects_invoked,
            vec![Effect::attach_label("99", "human-approved")]
        );
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].error, RemoteError::Timeout);
    }

    #[tokio::test]
    async fn retry_is_requested_at_most_once_per_action() {
        let recorder = Recorder::default();
        dispatch(&recorder, &record("retry-ci|42")).await;
        assert_eq!(recorder.retries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn repeated_label_leaves_label_set_unchanged() {
        let recorder = Recorder::default();
        dispatch(&recorder, &record("assign-human|17")).await;
        let after_first = recorder.labels_for("17");
        dispatch(&recorder, &record("assign-human|17")).await;

        assert_eq!(recorder.labels_for("17"), after_first);
        assert_eq!(after_first.len(), 1);
    }

    #[test]
    fn outcome_serializes_effects_with_op_tag() {
        let outcome = DispatchOutcome {
            kind: ActionKind::AssignHuman,
            target: "17".into(),
            effects_invoked: vec![Effect::attach_label("17", "human-review")],
            failures: vec![],
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "assign-human");
        assert_eq!(json["effects_invoked"][0]["op"], "attach_label");
        assert_eq!(json["effects_invoked"][0]["label"], "human-review");
    }
}
