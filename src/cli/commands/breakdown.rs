//! Breakdown command - scores by span length and nesting depth

use clap::Parser;

use super::super::output::{format_error, log_info, write_output};
use super::super::parser::{InputArgs, OutputArgs, OutputFormat};
use super::load_inputs;

use crate::category::CategorySet;
use crate::eval::{gold_span_tags, predicted_span_tags, score_by_depth, score_by_length};
use crate::report::BreakdownReport;

/// Score by span length bucket and by nesting depth
#[derive(Parser, Debug)]
pub struct BreakdownArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Coarse types to report (repeatable); defaults to the categories' type tags
    #[arg(short, long = "kind", value_name = "TYPE")]
    pub kinds: Vec<String>,
}

/// Coarse types named by the categories' tag filters under `tag_key`.
fn category_kinds(categories: &CategorySet, tag_key: &str) -> Vec<String> {
    let mut kinds: Vec<String> = Vec::new();
    for kind in categories.iter().filter_map(|c| c.tags.get(tag_key)) {
        if !kinds.contains(kind) {
            kinds.push(kind.clone());
        }
    }
    kinds
}

/// Run the breakdown command.
pub fn run(args: BreakdownArgs) -> Result<(), String> {
    let inputs = load_inputs(&args.input, args.output.quiet)?;
    let comparator = &inputs.config.comparator;

    let kinds = if args.kinds.is_empty() {
        category_kinds(&inputs.categories, &comparator.tag_key)
    } else {
        args.kinds.clone()
    };
    if kinds.is_empty() {
        return Err(format_error(
            "breakdown",
            "no types to report; pass --kind or configure category tags",
        ));
    }

    let (gold, depths) = gold_span_tags(&inputs.gold, comparator);
    let predicted = predicted_span_tags(&inputs.predictions, comparator);
    log_info(
        &format!("{} gold tags, {} predicted tags", gold.len(), predicted.len()),
        args.output.quiet,
    );

    let report = BreakdownReport {
        tag_length_eval: score_by_length(&gold, &predicted, &kinds),
        tag_depth_eval: score_by_depth(&gold, &predicted, &kinds, &depths)
            .map_err(|e| format_error("depth breakdown", &e.to_string()))?,
    };

    let content = match args.output.format {
        OutputFormat::Human => report.summary(),
        OutputFormat::Json => report
            .to_json()
            .map_err(|e| format_error("serialize", &e.to_string()))?,
    };
    write_output(&content, args.output.output.as_deref())
}
