use crate::output::print_json;
use anyhow::Context;
use remedy_core::dispatch::plan;
use std::io::Read;
use std::path::Path;

/// Decode a captured request body and print the effects the webhook would
/// apply. Makes no remote calls.
pub fn run(file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let body = match file {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let record = remedy_core::decode(trim_trailing_newline(&body))?;
    let effects = plan(record.kind(), record.target());

    if json {
        let value = serde_json::json!({
            "action": record.kind(),
            "target": record.target(),
            "known": record.kind().is_known(),
            "effects": effects,
        });
        print_json(&value)?;
        return Ok(());
    }

    println!("action: {}", record.kind());
    println!("target: {}", record.target());
    if effects.is_empty() {
        println!("effects: none (unrecognised action)");
    } else {
        println!("effects:");
        for (i, effect) in effects.iter().enumerate() {
            println!("  {}. {}", i + 1, effect.describe());
        }
    }
    Ok(())
}

/// Captured bodies saved with an editor usually end in a newline that is not
/// part of the form encoding.
fn trim_trailing_newline(body: &[u8]) -> &[u8] {
    let end = body
        .iter()
        .rposition(|b| !matches!(b, b'\n' | b'\r'))
        .map_or(0, |i| i + 1);
    &body[..end]
}
