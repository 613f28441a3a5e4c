//! Eval command - boundary, head, typed and aggregated scores

use clap::Parser;

use super::super::output::{color, format_error, log_info, write_output};
use super::super::parser::{AggregateKey, InputArgs, OutputArgs, OutputFormat};
use super::load_inputs;

use crate::eval::{
    evaluate, Aggregator, CoarseTypeComparator, NodeAndParentTag, NodeDepth, NodeTag, Scorer,
};
use crate::report::EvalReport;

/// Score predictions against the gold corpus
#[derive(Parser, Debug)]
pub struct EvalArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Also report typed recall grouped by this key
    #[arg(short, long, value_name = "KEY")]
    pub aggregate: Option<AggregateKey>,
}

fn aggregate<A: Aggregator>(
    report: EvalReport,
    scorer: &Scorer<'_>,
    comparator: &CoarseTypeComparator,
    key: AggregateKey,
    aggregator: &A,
) -> Result<EvalReport, String> {
    let recall = scorer
        .scores_custom(comparator, aggregator)
        .map_err(|e| format_error("aggregate", &e.to_string()))?;
    Ok(report.with_aggregated(key.name(), &recall))
}

/// Run the eval command.
pub fn run(args: EvalArgs) -> Result<(), String> {
    let mut inputs = load_inputs(&args.input, args.output.quiet)?;
    let comparator = &inputs.config.comparator;

    let evaluation = evaluate(
        &mut inputs.predictions,
        &mut inputs.gold,
        &inputs.categories,
        comparator,
    )
    .map_err(|e| format_error("evaluate", &e.to_string()))?;

    let mut report = EvalReport::new(&evaluation);
    if let Some(key) = args.aggregate {
        let scorer = evaluation.scorer(&inputs.gold, &inputs.predictions);
        report = match key {
            AggregateKey::Node => aggregate(report, &scorer, comparator, key, &NodeTag),
            AggregateKey::NodeParent => aggregate(report, &scorer, comparator, key, &NodeAndParentTag),
            AggregateKey::Depth => aggregate(report, &scorer, comparator, key, &NodeDepth),
        }?;
    }

    let content = match args.output.format {
        OutputFormat::Human => report.summary(),
        OutputFormat::Json => report
            .to_json()
            .map_err(|e| format_error("serialize", &e.to_string()))?,
    };
    write_output(&content, args.output.output.as_deref())?;

    let avg = &report.typed.weighted_avg;
    log_info(
        &format!(
            "{} P={:.1}% R={:.1}% F1={:.1}%",
            color("1;32", "typed weighted_avg"),
            avg.precision * 100.0,
            avg.recall * 100.0,
            avg.f1 * 100.0
        ),
        args.output.quiet,
    );
    Ok(())
}
