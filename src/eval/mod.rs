//! Scoring of matched nested-NER predictions.
//!
//! # Pipeline
//!
//! ```text
//! Predictions ──┐
//! GoldTree ─────┼── SpanMatcher::run ── CategorySet::partition ── Scorer
//! CategorySet ──┘
//!
//! Scorer ── boundary_scores
//!        ── head_boundary_scores
//!        ── scores(comparator)
//!        ── scores_custom(comparator, aggregator)
//! ```
//!
//! [`evaluate`] runs the matcher, partitions and the three per-category modes
//! in one call. Breakdowns by span length or nesting depth live in
//! [`breakdown`] and operate on flat [`SpanTag`] tuples instead.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use nesteval::annotation::{Annotation, Predictions};
//! use nesteval::category::CategorySet;
//! use nesteval::eval::{evaluate, CoarseTypeComparator};
//! use nesteval::gold::GoldTree;
//!
//! let mut gold = GoldTree::new();
//! let doc = gold.add_document("Anna Muster", BTreeMap::new());
//! let mut attrs = BTreeMap::new();
//! attrs.insert("char_start".to_string(), "0".to_string());
//! attrs.insert("char_end".to_string(), "11".to_string());
//! attrs.insert("entity_type".to_string(), "per_ind".to_string());
//! gold.add_node(doc, None, "PER", attrs).unwrap();
//!
//! let pred = Annotation::from_label("0_0", "Anna Muster", 0, 11, "ent:per").unwrap();
//! let mut preds = Predictions::from_documents(vec![vec![pred]]);
//!
//! let result = evaluate(
//!     &mut preds,
//!     &mut gold,
//!     &CategorySet::benasch(),
//!     &CoarseTypeComparator::default(),
//! )
//! .unwrap();
//! assert_eq!(result.typed.get("Persons").unwrap().f1, 1.0);
//! ```

pub mod breakdown;
pub mod metrics;
pub mod sample;
pub mod scores;
pub mod strategy;

pub use breakdown::{
    gold_span_tags, length_bucket, predicted_span_tags, score_by_depth, score_by_length,
    BucketScore, DepthBreakdown, DepthScore, LengthBreakdown, SpanTag, LENGTH_BUCKETS,
};
pub use metrics::{category_weights, weighted_average, Counts, Metrics};
pub use sample::{
    full_span_correct_but_not_head, head_correct_but_not_full_span, CategorySamples,
    DiscrepancyKind, SpanDiscrepancy,
};
pub use scores::{
    CategoryBuckets, CategoryScore, CustomRecallReport, ScoreMode, ScoreReport, Scorer,
};
pub use strategy::{
    Aggregator, AttributeValue, CoarseTypeComparator, Comparator, NodeAndParentTag, NodeDepth,
    NodeTag, TagPair,
};

use crate::annotation::Predictions;
use crate::category::{CategorySet, Partition};
use crate::gold::GoldTree;
use crate::matcher::{MatchSummary, SpanMatcher};
use crate::Result;

/// Key of the weighted-average entry in report mappings; reserved as a
/// category name.
pub const WEIGHTED_AVG: &str = "weighted_avg";

// =============================================================================
// One-call evaluation
// =============================================================================

/// Everything a standard evaluation run produces.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Matcher diagnostics
    pub summary: MatchSummary,
    /// Category subsets the reports were computed on
    pub partition: Partition,
    /// Boundary-only scores
    pub boundary: ScoreReport,
    /// Head-boundary-only scores
    pub head_boundary: ScoreReport,
    /// Boundary plus type scores
    pub typed: ScoreReport,
}

impl Evaluation {
    /// Scorer over the inputs this evaluation ran on, for further reports.
    #[must_use]
    pub fn scorer<'a>(&'a self, gold: &'a GoldTree, predictions: &'a Predictions) -> Scorer<'a> {
        Scorer::new(gold, predictions, &self.partition)
    }

    /// Report of one mode.
    #[must_use]
    pub fn report(&self, mode: ScoreMode) -> &ScoreReport {
        match mode {
            ScoreMode::Boundary => &self.boundary,
            ScoreMode::HeadBoundary => &self.head_boundary,
            ScoreMode::Typed => &self.typed,
        }
    }
}

/// Match, partition and score in the three per-category modes.
///
/// Match state on both inputs is replaced by this run's.
pub fn evaluate<C: Comparator + ?Sized>(
    predictions: &mut Predictions,
    gold: &mut GoldTree,
    categories: &CategorySet,
    comparator: &C,
) -> Result<Evaluation> {
    log::info!(
        "{} gold documents, {} prediction records",
        gold.document_count(),
        predictions.document_count()
    );
    let summary = SpanMatcher::new(categories).run(predictions, gold);
    let partition = categories.partition(predictions, gold);

    let scorer = Scorer::new(gold, predictions, &partition);
    let boundary = scorer.boundary_scores();
    let head_boundary = scorer.head_boundary_scores();
    let typed = scorer.scores(comparator)?;

    Ok(Evaluation {
        summary,
        partition,
        boundary,
        head_boundary,
        typed,
    })
}
