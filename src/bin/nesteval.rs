//! nesteval - nested NER evaluation CLI
//!
//! # Usage
//!
//! ```bash
//! # All scoring modes, BeNASch categories
//! nesteval eval -g gold.xml -p predictions.jsonl
//!
//! # Custom categories, recall grouped by node and parent tag
//! nesteval eval -g gold.xml -p predictions.jsonl -c categories.toml --aggregate node-parent
//!
//! # Head/full-span discrepancies
//! nesteval sample -g gold.xml -p predictions.jsonl
//!
//! # Length and depth breakdowns as JSON
//! nesteval breakdown -g gold.xml -p predictions.jsonl --format json -o breakdown.json
//! ```

use std::process::ExitCode;

use clap::Parser;

use nesteval::cli::{self, output::log_level, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level(cli.verbose)))
        .format_timestamp(None)
        .init();

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
