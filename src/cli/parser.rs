//! CLI argument parsing and structure definitions

use clap::{Args, Parser, Subcommand, ValueEnum};

use super::commands;

/// Nested NER evaluation against a hierarchical gold corpus
#[derive(Parser, Debug)]
#[command(name = "nesteval")]
#[command(
    author,
    version,
    about = "Nested NER evaluation against a hierarchical gold corpus",
    long_about = r#"
nesteval - score nested named-entity predictions against an XML gold corpus

MATCHING:
  Predictions match gold nodes by exact character span, separately for the
  full span and for the head span. Matches are many-to-many.

SCORING MODES:
  • boundary        - exact full span
  • head boundary   - exact head span
  • boundary + type - exact full span and agreeing coarse type
  • aggregated      - typed recall bucketed by node, node-parent or depth

EXAMPLES:
  nesteval eval -g gold.xml -p predictions.jsonl
  nesteval eval -g gold.xml -p predictions.jsonl -c categories.toml --aggregate depth
  nesteval sample -g gold.xml -p predictions.jsonl
  nesteval breakdown -g gold.xml -p predictions.jsonl --format json -o breakdown.json
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score predictions in every mode
    #[command(visible_alias = "e")]
    Eval(commands::EvalArgs),

    /// List head/full-span discrepancies per category
    #[command(visible_alias = "s")]
    Sample(commands::SampleArgs),

    /// Score by span length and nesting depth
    #[command(visible_alias = "b")]
    Breakdown(commands::BreakdownArgs),
}

/// Input files shared by every command.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Gold corpus (XML)
    #[arg(short, long, value_name = "PATH")]
    pub gold: String,

    /// Predictions (JSONL, one document per line)
    #[arg(short, long, value_name = "PATH")]
    pub predictions: String,

    /// Category configuration (TOML); BeNASch categories if omitted
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<String>,
}

/// Output options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,

    /// Write to file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Suppress progress messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Human,
    /// Pretty-printed JSON
    Json,
}

/// Grouping key for aggregated recall
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AggregateKey {
    /// Element name
    Node,
    /// Element name and parent element name
    NodeParent,
    /// Nesting depth below the document
    Depth,
}

impl AggregateKey {
    /// Name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::NodeParent => "node-parent",
            Self::Depth => "depth",
        }
    }
}
