//! Sample command - head/full-span discrepancies

use clap::Parser;

use super::super::output::{format_error, log_info, write_output};
use super::super::parser::{InputArgs, OutputArgs, OutputFormat};
use super::load_inputs;

use crate::eval::{full_span_correct_but_not_head, head_correct_but_not_full_span};
use crate::matcher::SpanMatcher;
use crate::report::SampleReport;

/// List predictions whose head and full span disagree on a match
#[derive(Parser, Debug)]
pub struct SampleArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Run the sample command.
pub fn run(args: SampleArgs) -> Result<(), String> {
    let mut inputs = load_inputs(&args.input, args.output.quiet)?;

    let summary = SpanMatcher::new(&inputs.categories).run(&mut inputs.predictions, &mut inputs.gold);
    let partition = inputs.categories.partition(&inputs.predictions, &inputs.gold);

    let report = SampleReport {
        head_correct_but_not_full_span: head_correct_but_not_full_span(&partition, &inputs.predictions, &inputs.gold),
        full_span_correct_but_not_head: full_span_correct_but_not_head(&partition, &inputs.predictions, &inputs.gold),
    };

    let content = match args.output.format {
        OutputFormat::Human => report.summary(),
        OutputFormat::Json => report
            .to_json()
            .map_err(|e| format_error("serialize", &e.to_string()))?,
    };
    write_output(&content, args.output.output.as_deref())?;

    let total: usize = report
        .head_correct_but_not_full_span
        .iter()
        .chain(&report.full_span_correct_but_not_head)
        .map(|c| c.samples.len())
        .sum();
    log_info(
        &format!("{} samples from {} boundary pairs", total, summary.boundary_pairs),
        args.output.quiet,
    );
    Ok(())
}
