//! Inbound interactive-action decoding.
//!
//! Slack posts button clicks as a form body with a single `payload` field
//! whose value is a JSON envelope. The button value encodes the action kind
//! and its target as `<kind>|<target>`.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{RemedyError, Result};

const VALUE_DELIMITER: char = '|';

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

/// The closed set of actions a human can pick, plus a catch-all that keeps
/// the original token so unrecognised buttons are reported rather than lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKind {
    RetryCi,
    AssignHuman,
    HumanApproved,
    Unknown(String),
}

impl ActionKind {
    /// Total parse: every token maps to a kind.
    pub fn parse(token: &str) -> Self {
        match token {
            "retry-ci" => ActionKind::RetryCi,
            "assign-human" => ActionKind::AssignHuman,
            "human-approved" => ActionKind::HumanApproved,
            other => ActionKind::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::RetryCi => "retry-ci",
            ActionKind::AssignHuman => "assign-human",
            ActionKind::HumanApproved => "human-approved",
            ActionKind::Unknown(token) => token,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ActionKind::Unknown(_))
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ActionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActionRecord
// ---------------------------------------------------------------------------

/// A decoded unit of work. Only [`decode`] constructs one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRecord {
    kind: ActionKind,
    target: String,
    raw_payload: Value,
}

impl ActionRecord {
    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn raw_payload(&self) -> &Value {
        &self.raw_payload
    }
}

// ---------------------------------------------------------------------------
// decode
// ---------------------------------------------------------------------------

/// Decode a raw `application/x-www-form-urlencoded` request body into an
/// [`ActionRecord`].
///
/// Every structural problem yields [`RemedyError::MalformedRequest`]. An
/// unrecognised action token is not a structural problem and decodes to
/// [`ActionKind::Unknown`].
pub fn decode(raw_body: &[u8]) -> Result<ActionRecord> {
    let payload = url::form_urlencoded::parse(raw_body)
        .find(|(key, _)| key == "payload")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| RemedyError::malformed("missing 'payload' form field"))?;

    let raw_payload: Value = serde_json::from_str(&payload)
        .map_err(|e| RemedyError::malformed(format!("payload is not valid JSON: {e}")))?;

    let value = first_action_value(&raw_payload)?;
    let (kind, target) = split_action_value(value)?;

    Ok(ActionRecord {
        kind: ActionKind::parse(kind),
        target: target.to_string(),
        raw_payload,
    })
}

fn first_action_value(payload: &Value) -> Result<&str> {
    let actions = payload
        .get("actions")
        .and_then(Value::as_array)
        .ok_or_else(|| RemedyError::malformed("payload has no 'actions' array"))?;
    let first = actions
        .first()
        .ok_or_else(|| RemedyError::malformed("'actions' array is empty"))?;
    first
        .get("value")
        .and_then(Value::as_str)
        .ok_or_else(|| RemedyError::malformed("actions[0].value is missing or not a string"))
}

fn split_action_value(value: &str) -> Result<(&str, &str)> {
    let mut parts = value.split(VALUE_DELIMITER);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(kind), Some(target), None) if !kind.is_empty() && !target.is_empty() => {
            Ok((kind, target))
        }
        _ => Err(RemedyError::malformed(format!(
            "action value '{value}' must have the form '<kind>{VALUE_DELIMITER}<target>'"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
