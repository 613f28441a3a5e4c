//! Command implementations for the nesteval CLI
//!
//! Each command has its own module; input loading is shared here.

pub mod breakdown;
pub mod eval;
pub mod sample;

pub use breakdown::BreakdownArgs;
pub use eval::EvalArgs;
pub use sample::SampleArgs;

use crate::annotation::Predictions;
use crate::category::CategorySet;
use crate::config::EvalConfig;
use crate::gold::GoldTree;
use crate::loader::{load_gold_xml, load_predictions};

use super::output::{format_error, log_info};
use super::parser::InputArgs;

/// Everything loaded from the input files.
#[derive(Debug)]
pub struct Inputs {
    /// Gold corpus
    pub gold: GoldTree,
    /// Prediction records
    pub predictions: Predictions,
    /// Parsed configuration (defaults if no file was given)
    pub config: EvalConfig,
    /// Categories in report order
    pub categories: CategorySet,
}

/// Load gold, predictions and category configuration.
pub fn load_inputs(args: &InputArgs, quiet: bool) -> Result<Inputs, String> {
    let config = match &args.config {
        Some(path) => EvalConfig::from_path(path)
            .map_err(|e| format_error(&format!("load config {}", path), &e.to_string()))?,
        None => EvalConfig::default(),
    };
    let categories = config
        .category_set()
        .map_err(|e| format_error("categories", &e.to_string()))?;

    let gold = load_gold_xml(&args.gold)
        .map_err(|e| format_error(&format!("load gold {}", args.gold), &e.to_string()))?;
    let predictions = load_predictions(&args.predictions).map_err(|e| {
        format_error(&format!("load predictions {}", args.predictions), &e.to_string())
    })?;

    log_info(
        &format!(
            "{} gold documents, {} prediction records, {} categories",
            gold.document_count(),
            predictions.document_count(),
            categories.len()
        ),
        quiet,
    );

    Ok(Inputs {
        gold,
        predictions,
        config,
        categories,
    })
}
