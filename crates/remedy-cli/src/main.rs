mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::serve::ServeArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "remedy",
    about = "Human-in-the-loop CI remediation: Slack actions in, GitHub labels and retries out",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Slack interactive-action webhook
    Serve(ServeArgs),

    /// Compare a prediction file against ground truth (exit 1 below 0.8 accuracy)
    Score {
        /// Prediction JSON object to score
        prediction: PathBuf,

        /// Ground-truth JSON array of {"expected": {...}} cases
        #[arg(long, default_value = remedy_core::score::DEFAULT_GROUND_TRUTH)]
        ground_truth: PathBuf,
    },

    /// Decode a Slack action form body and show the effects it would trigger
    Decode {
        /// File holding the raw form body (default: stdin)
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long, short = 'j')]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve(_) => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Serve(args) => cmd::serve::run(args),
        Commands::Score {
            prediction,
            ground_truth,
        } => cmd::score::run(&prediction, &ground_truth),
        Commands::Decode { file, json } => cmd::decode::run(file.as_deref(), json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
