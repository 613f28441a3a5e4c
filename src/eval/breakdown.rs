//! Length and depth breakdowns over flat span tuples.
//!
//! Unlike [`Scorer`](crate::eval::scores::Scorer), these work on plain
//! [`SpanTag`] tuples and count by tuple membership: a gold tag is a true
//! positive if an equal tuple is among the predicted tags of the same bucket.
//!
//! # Length buckets
//!
//! Bucket `b` holds spans with `prev < len <= b`, where `prev` is the
//! previous boundary (0 for the first bucket):
//!
//! ```text
//! (0,10] (10,20] (20,40] (40,80] (80,160] (160,320]
//! ```
//!
//! Spans of length 0 or longer than 320 fall in no bucket.
//!
//! # Depth buckets
//!
//! Gold tags are bucketed by a depth list aligned index for index with them.
//! Predicted tags are *not* filtered by depth, so only recall is meaningful
//! and only recall is reported.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::annotation::Predictions;
use crate::eval::metrics::{recall, Counts};
use crate::eval::strategy::CoarseTypeComparator;
use crate::gold::GoldTree;
use crate::{Error, Result};

/// Upper bounds of the length buckets.
pub const LENGTH_BUCKETS: [usize; 6] = [10, 20, 40, 80, 160, 320];

// =============================================================================
// Span tuples
// =============================================================================

/// A typed span, compared by value.
///
/// `document` keeps spans of different documents apart; tuples built for a
/// single document can leave it at 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpanTag {
    /// Coarse type
    pub kind: String,
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
    /// Document index
    #[serde(default)]
    pub document: usize,
}

impl SpanTag {
    /// Tag in document 0.
    #[must_use]
    pub fn new(kind: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind: kind.into(),
            start,
            end,
            document: 0,
        }
    }

    /// Same tag in another document.
    #[must_use]
    pub fn in_document(mut self, document: usize) -> Self {
        self.document = document;
        self
    }

    /// `end - start` (0 for inverted spans).
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True if the span has no extent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bucket boundary a span length falls into, if any.
#[must_use]
pub fn length_bucket(len: usize) -> Option<usize> {
    let mut lower = 0;
    for &upper in &LENGTH_BUCKETS {
        if len > lower && len <= upper {
            return Some(upper);
        }
        lower = upper;
    }
    None
}

/// Gold span tuples plus the aligned depth list.
///
/// Nodes without a full span or without the comparator's gold attribute are
/// skipped.
#[must_use]
pub fn gold_span_tags(tree: &GoldTree, comparator: &CoarseTypeComparator) -> (Vec<SpanTag>, Vec<usize>) {
    let mut tags = Vec::new();
    let mut depths = Vec::new();
    for node in tree.nodes() {
        let (Some((start, end)), Some(kind)) = (node.span, comparator.gold_kind(node)) else {
            continue;
        };
        tags.push(SpanTag::new(kind, start, end).in_document(node.document.index()));
        depths.push(node.depth);
    }
    (tags, depths)
}

/// Predicted span tuples; predictions without the comparator's tag are skipped.
#[must_use]
pub fn predicted_span_tags(predictions: &Predictions, comparator: &CoarseTypeComparator) -> Vec<SpanTag> {
    (0..predictions.document_count())
        .flat_map(move |doc| {
            predictions.document(doc).iter().filter_map(move |p| {
                comparator
                    .prediction_kind(p)
                    .map(|kind| SpanTag::new(kind, p.start, p.end).in_document(doc))
            })
        })
        .collect()
}

// =============================================================================
// Length
// =============================================================================

/// Scores of one length bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketScore {
    /// Gold tags in the bucket
    pub count: usize,
    /// Precision (0.0-1.0)
    pub precision: f64,
    /// Recall (0.0-1.0)
    pub recall: f64,
    /// F1 (0.0-1.0)
    pub f1: f64,
    /// Raw counts
    pub counts: Counts,
}

/// `kind → bucket boundary → scores`.
pub type LengthBreakdown = BTreeMap<String, BTreeMap<usize, BucketScore>>;

/// Precision, recall and F1 per type per length bucket.
///
/// Every requested kind gets all six buckets, including empty ones.
#[must_use]
pub fn score_by_length<S: AsRef<str>>(gold: &[SpanTag], predicted: &[SpanTag], kinds: &[S]) -> LengthBreakdown {
    let mut breakdown = LengthBreakdown::new();
    for kind in kinds {
        let kind = kind.as_ref();
        let mut buckets = BTreeMap::new();
        let mut lower = 0;
        for &upper in &LENGTH_BUCKETS {
            let in_bucket = |t: &&SpanTag| t.kind == kind && t.len() > lower && t.len() <= upper;
            let valid_gold: Vec<&SpanTag> = gold.iter().filter(in_bucket).collect();
            let valid_pred: Vec<&SpanTag> = predicted.iter().filter(in_bucket).collect();

            let counts = membership_counts(&valid_gold, &valid_pred);
            let metrics = counts.metrics();
            buckets.insert(
                upper,
                BucketScore {
                    count: valid_gold.len(),
                    precision: metrics.precision,
                    recall: metrics.recall,
                    f1: metrics.f1,
                    counts,
                },
            );
            lower = upper;
        }
        breakdown.insert(kind.to_string(), buckets);
    }
    breakdown
}

// =============================================================================
// Depth
// =============================================================================

/// Recall of one depth bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthScore {
    /// Gold tags at this depth
    pub count: usize,
    /// Recall (0.0-1.0)
    pub recall: f64,
}

/// `kind → depth → recall`.
pub type DepthBreakdown = BTreeMap<String, BTreeMap<usize, DepthScore>>;

/// Recall per type per nesting depth, for depths `0..=max(depths)`.
///
/// `depths[i]` is the depth of `gold[i]`; a length mismatch is an error. An
/// empty depth list yields no buckets.
pub fn score_by_depth<S: AsRef<str>>(
    gold: &[SpanTag],
    predicted: &[SpanTag],
    kinds: &[S],
    depths: &[usize],
) -> Result<DepthBreakdown> {
    if gold.len() != depths.len() {
        return Err(Error::invalid_input(format!(
            "depth list has {} entries but there are {} gold tags",
            depths.len(),
            gold.len()
        )));
    }
    let max_depth = depths.iter().copied().max();

    let mut breakdown = DepthBreakdown::new();
    for kind in kinds {
        let kind = kind.as_ref();
        let mut buckets = BTreeMap::new();
        let valid_pred: Vec<&SpanTag> = predicted.iter().filter(|t| t.kind == kind).collect();
        for depth in max_depth.into_iter().flat_map(|max| 0..=max) {
            let valid_gold: Vec<&SpanTag> = gold
                .iter()
                .zip(depths)
                .filter(|(t, d)| t.kind == kind && **d == depth)
                .map(|(t, _)| t)
                .collect();
            let counts = membership_counts(&valid_gold, &valid_pred);
            buckets.insert(
                depth,
                DepthScore {
                    count: valid_gold.len(),
                    recall: recall(counts.true_positives, counts.false_negatives),
                },
            );
        }
        breakdown.insert(kind.to_string(), buckets);
    }
    Ok(breakdown)
}

/// Duplicates count once per occurrence on each side.
fn membership_counts(gold: &[&SpanTag], predicted: &[&SpanTag]) -> Counts {
    let gold_set: HashSet<&SpanTag> = gold.iter().copied().collect();
    let pred_set: HashSet<&SpanTag> = predicted.iter().copied().collect();
    let tp = gold.iter().filter(|t| pred_set.contains(*t)).count();
    let fp = predicted.iter().filter(|t| !gold_set.contains(*t)).count();
    Counts::new(tp, fp, gold.len() - tp)
}
