use axum::{body::Bytes, extract::State, Json};
use remedy_core::{decode, dispatch, DispatchOutcome};
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

/// POST /slack/actions — decode a Slack interactive action and apply it.
///
/// Decode failures abort with 400 before any remote call. Remote failures do
/// not: the action is acknowledged with 200 and the failures are listed in
/// the body.
pub async fn slack_actions(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let record = decode(&body)?;

    let user = record
        .raw_payload()
        .pointer("/user/id")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    tracing::info!(
        action = %record.kind(),
        pr = %record.target(),
        user,
        "slack action received"
    );

    let outcome = dispatch(app.effector.as_ref(), &record).await;
    Ok(Json(acknowledgment(&outcome)))
}

fn acknowledgment(outcome: &DispatchOutcome) -> Value {
    let text = match outcome.first_error() {
        None => format!(
            "✅ Action `{}` executed for PR #{}",
            outcome.kind, outcome.target
        ),
        Some(failure) => format!(
            "⚠️ Action `{}` for PR #{} completed with errors: {} failed ({})",
            outcome.kind,
            outcome.target,
            failure.effect.describe(),
            failure.error
        ),
    };

    let errors: Vec<Value> = outcome
        .failures
        .iter()
        .map(|f| {
            serde_json::json!({
                "effect": f.effect,
                "error": f.error.to_string(),
                "status": f.error.status(),
            })
        })
        .collect();

    serde_json::json!({
        "text": text,
        "action": outcome.kind,
        "target": outcome.target,
        "effects": outcome.effects_invoked,
        "errors": errors,
    })
}
