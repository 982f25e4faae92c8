use crate::output::print_json;
use anyhow::Context;
use remedy_core::score;
use std::path::Path;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Print the comparison report to stdout; fail when accuracy is below the
/// pass threshold so the exit status gates CI.
pub fn run(prediction: &Path, ground_truth: &Path) -> anyhow::Result<()> {
    let cases = score::load_ground_truth(ground_truth)
        .with_context(|| format!("failed to load ground truth {}", ground_truth.display()))?;
    let predicted = score::load_prediction(prediction)
        .with_context(|| format!("failed to load prediction {}", prediction.display()))?;

    let report = score::compare(&cases, &predicted);
    print_json(&report)?;

    if !report.passed {
        anyhow::bail!(
            "accuracy {:.2} is below the {:.2} pass threshold ({} mismatched keys)",
            report.accuracy,
            score::PASS_THRESHOLD,
            report.errors.len()
        );
    }
    Ok(())
}
