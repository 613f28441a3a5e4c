//! Plain-text and JSON rendering of evaluation results.
//!
//! Three report types, one per CLI command:
//!
//! - [`EvalReport`]: diagnostics, the three per-category modes and an
//!   optional aggregated recall table.
//! - [`BreakdownReport`]: length and depth breakdowns.
//! - [`SampleReport`]: head/full-span discrepancy samples.
//!
//! Each has `summary()` for humans and `to_json()` for tools.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::eval::{
    CategorySamples, CustomRecallReport, DepthBreakdown, Evaluation, LengthBreakdown, ScoreReport,
    WEIGHTED_AVG,
};
use crate::matcher::MatchSummary;
use crate::{Error, Result};

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| Error::InvalidInput(format!("JSON serialization failed: {}", e)))
}

// =============================================================================
// Evaluation report
// =============================================================================

/// Prediction and gold counts of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// Category name
    pub name: String,
    /// Predictions passing the tag filter
    pub predictions: usize,
    /// Gold nodes selected by the query
    pub gold: usize,
}

/// Recall per category per aggregation key, keys rendered as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRecall {
    /// What the keys are (e.g. `node-parent`)
    pub key: String,
    /// `category → key → recall`
    pub recall: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Full result of an evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    /// Matcher diagnostics
    pub matching: MatchSummary,
    /// Per-category selection counts
    pub categories: Vec<CategoryCount>,
    /// Boundary-only scores
    pub boundary: ScoreReport,
    /// Head-boundary-only scores
    pub head_boundary: ScoreReport,
    /// Boundary plus type scores
    pub typed: ScoreReport,
    /// Aggregated typed recall, if requested
    pub aggregated: Option<AggregatedRecall>,
    /// Conditions worth a second look
    pub warnings: Vec<String>,
}

impl EvalReport {
    /// Report of an evaluation run.
    #[must_use]
    pub fn new(evaluation: &Evaluation) -> Self {
        let categories: Vec<CategoryCount> = evaluation
            .partition
            .slices()
            .iter()
            .map(|s| CategoryCount {
                name: s.name.clone(),
                predictions: s.predictions.len(),
                gold: s.gold.len(),
            })
            .collect();

        let mut warnings = Vec::new();
        let m = &evaluation.summary;
        if m.document_mismatch() {
            warnings.push(format!(
                "{} gold documents but {} prediction records; only the first {} were matched",
                m.gold_documents, m.prediction_documents, m.aligned_documents
            ));
        }
        for c in categories.iter().filter(|c| c.gold == 0) {
            warnings.push(format!("category {} has no gold nodes", c.name));
        }

        Self {
            matching: evaluation.summary.clone(),
            categories,
            boundary: evaluation.boundary.clone(),
            head_boundary: evaluation.head_boundary.clone(),
            typed: evaluation.typed.clone(),
            aggregated: None,
            warnings,
        }
    }

    /// Attach an aggregated recall table.
    #[must_use]
    pub fn with_aggregated<K>(mut self, key: impl Into<String>, report: &CustomRecallReport<K>) -> Self
    where
        K: Ord + Clone + fmt::Display,
    {
        self.aggregated = Some(AggregatedRecall {
            key: key.into(),
            recall: report.to_map(),
        });
        self
    }

    /// Human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();

        out.push_str("=== Nested NER Evaluation ===\n");
        out.push_str(&format!(
            "Documents: {} gold, {} predicted ({} matched)\n",
            self.matching.gold_documents,
            self.matching.prediction_documents,
            self.matching.aligned_documents
        ));
        out.push_str(&format!(
            "Pairs: {} boundary, {} head ({} predictions unmatched)\n\n",
            self.matching.boundary_pairs, self.matching.head_pairs, self.matching.unmatched_predictions
        ));

        out.push_str("## Categories\n");
        for c in &self.categories {
            out.push_str(&format!("  {:16} predictions={:<6} gold={}\n", c.name, c.predictions, c.gold));
        }
        out.push('\n');

        for (title, report) in [
            ("Only Boundaries", &self.boundary),
            ("Only Head Boundaries", &self.head_boundary),
            ("Classic (Boundary + Type)", &self.typed),
        ] {
            out.push_str(&format!("## {}\n", title));
            out.push_str(&score_table(report));
            out.push('\n');
        }

        if let Some(ref agg) = self.aggregated {
            out.push_str(&format!("## Aggregated Recall (by {})\n", agg.key));
            for (category, buckets) in &agg.recall {
                out.push_str(&format!("  {}\n", category));
                if buckets.is_empty() {
                    out.push_str("    (no gold)\n");
                }
                for (key, recall) in buckets {
                    out.push_str(&format!("    {:24} R={:.1}%\n", key, recall * 100.0));
                }
            }
            out.push('\n');
        }

        if !self.warnings.is_empty() {
            out.push_str("## Warnings\n");
            for warning in &self.warnings {
                out.push_str(&format!("  - {}\n", warning));
            }
        }

        out
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        to_pretty_json(self)
    }
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

/// Per-category score table with the weighted average as last row.
#[must_use]
pub fn score_table(report: &ScoreReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  {:16} {:>7} {:>7} {:>7} {:>7}   {:>5} {:>5} {:>5}\n",
        "category", "P", "R", "F1", "weight", "tp", "fp", "fn"
    ));
    for c in &report.categories {
        out.push_str(&format!(
            "  {:16} {:>6.1}% {:>6.1}% {:>6.1}% {:>7.3}   {:>5} {:>5} {:>5}\n",
            c.name,
            c.precision * 100.0,
            c.recall * 100.0,
            c.f1 * 100.0,
            c.weight,
            c.counts.true_positives,
            c.counts.false_positives,
            c.counts.false_negatives
        ));
    }
    let avg = &report.weighted_avg;
    out.push_str(&format!(
        "  {:16} {:>6.1}% {:>6.1}% {:>6.1}%\n",
        WEIGHTED_AVG,
        avg.precision * 100.0,
        avg.recall * 100.0,
        avg.f1 * 100.0
    ));
    out
}

// =============================================================================
// Breakdown report
// =============================================================================

/// Length and depth breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownReport {
    /// `kind → length bucket → scores`
    pub tag_length_eval: LengthBreakdown,
    /// `kind → depth → recall`
    pub tag_depth_eval: DepthBreakdown,
}

impl BreakdownReport {
    /// Human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();

        out.push_str("## Span Length\n");
        for (kind, buckets) in &self.tag_length_eval {
            out.push_str(&format!("  {}\n", kind));
            for (bucket, s) in buckets {
                out.push_str(&format!(
                    "    <= {:<4} n={:<5} P={:.1}% R={:.1}% F1={:.1}%\n",
                    bucket,
                    s.count,
                    s.precision * 100.0,
                    s.recall * 100.0,
                    s.f1 * 100.0
                ));
            }
        }
        out.push('\n');

        out.push_str("## Nesting Depth (recall only)\n");
        for (kind, buckets) in &self.tag_depth_eval {
            out.push_str(&format!("  {}\n", kind));
            for (depth, s) in buckets {
                out.push_str(&format!(
                    "    depth {:<3} n={:<5} R={:.1}%\n",
                    depth,
                    s.count,
                    s.recall * 100.0
                ));
            }
        }

        out
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        to_pretty_json(self)
    }
}

// =============================================================================
// Sample report
// =============================================================================

/// Discrepancy samples, head-only section first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleReport {
    /// Head matched, full span did not
    pub head_correct_but_not_full_span: Vec<CategorySamples>,
    /// Full span matched, head did not
    pub full_span_correct_but_not_head: Vec<CategorySamples>,
}

impl SampleReport {
    /// Human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for section in [&self.head_correct_but_not_full_span, &self.full_span_correct_but_not_head] {
            let Some(first) = section.first() else {
                continue;
            };
            out.push_str(&format!("{} {} {}\n", "=".repeat(30), first.kind.title(), "=".repeat(30)));
            for category in section {
                out.push_str(&format!(
                    "{} {} {}\n",
                    "=".repeat(20),
                    category.name.to_uppercase(),
                    "=".repeat(20)
                ));
                for s in &category.samples {
                    out.push_str(&format!("{}\n", s.prediction));
                    out.push_str(&format!("  head: {}\n", s.head.as_deref().unwrap_or("-")));
                    out.push_str(&format!("  gold head: {}\n", s.gold_head_text.as_deref().unwrap_or("-")));
                    out.push_str(&format!(
                        "  gold span: {} ({})\n",
                        s.gold_span_text.as_deref().unwrap_or("-"),
                        s.gold_node
                    ));
                }
            }
        }
        out
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        to_pretty_json(self)
    }
}
