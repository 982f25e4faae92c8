//! Offline comparator for classifier output.
//!
//! Compares a prediction object against a ground-truth file of cases and
//! reports key-level accuracy. Not part of the webhook path.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RemedyError, Result};

pub const DEFAULT_GROUND_TRUTH: &str = "ai/eval/ground_truth.json";
pub const PASS_THRESHOLD: f64 = 0.8;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GroundTruthCase {
    pub expected: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    pub key: String,
    pub expected: Value,
    /// `null` when the prediction lacks the key.
    pub actual: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    /// Rounded to two decimals.
    pub accuracy: f64,
    pub passed: bool,
    pub errors: Vec<Mismatch>,
}

// ---------------------------------------------------------------------------
// compare
// ---------------------------------------------------------------------------

/// Score `prediction` against every case. Each expected key counts once per
/// case. An empty ground truth scores 0 and fails.
pub fn compare(cases: &[GroundTruthCase], prediction: &Map<String, Value>) -> ScoreReport {
    let mut matched = 0usize;
    let mut total = 0usize;
    let mut errors = Vec::new();

    for case in cases {
        for (key, expected) in &case.expected {
            total += 1;
            match prediction.get(key) {
                Some(actual) if values_match(expected, actual) => matched += 1,
                actual => errors.push(Mismatch {
                    key: key.clone(),
                    expected: expected.clone(),
                    actual: actual.cloned().unwrap_or(Value::Null),
                }),
            }
        }
    }

    let accuracy = if total == 0 {
        0.0
    } else {
        matched as f64 / total as f64
    };

    ScoreReport {
        accuracy: (accuracy * 100.0).round() / 100.0,
        passed: accuracy >= PASS_THRESHOLD,
        errors,
    }
}

/// JSON equality where numbers compare by value, so `1` matches `1.0`.
fn values_match(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(a), Value::Number(b)) => a == b || a.as_f64() == b.as_f64(),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_match(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, x)| b.get(k).is_some_and(|y| values_match(x, y)))
        }
        _ => expected == actual,
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

pub fn load_ground_truth(path: &Path) -> Result<Vec<GroundTruthCase>> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| {
        RemedyError::InvalidScoreInput(format!(
            "{}: expected an array of {{\"expected\": {{...}}}} cases: {e}",
            path.display()
        ))
    })
}

pub fn load_prediction(path: &Path) -> Result<Map<String, Value>> {
    let text = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&text)? {
        Value::Object(map) => Ok(map),
        other => Err(RemedyError::InvalidScoreInput(format!(
            "{}: prediction must be a JSON object, got {}",
            path.display(),
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
