//! Precision, recall, F1 and the weighted category average.
//!
//! All ratios guard their denominator and return `0.0` instead of dividing by
//! zero:
//!
//! | metric | formula | zero when |
//! |--------|---------|-----------|
//! | precision | `tp / (tp + fp)` | `tp + fp == 0` |
//! | recall | `tp / (tp + fn)` | `tp + fn == 0` |
//! | f1 | `2 / (1/p + 1/r)` | `p == 0` or `r == 0` |
//!
//! F1 is the harmonic mean taken through reciprocals, so it is only defined
//! when both inputs are positive; otherwise it is zero.

use serde::{Deserialize, Serialize};

/// `tp / (tp + fp)`, or 0 without predictions.
#[must_use]
pub fn precision(tp: usize, fp: usize) -> f64 {
    if tp + fp > 0 {
        tp as f64 / (tp + fp) as f64
    } else {
        0.0
    }
}

/// `tp / (tp + fn)`, or 0 without gold.
#[must_use]
pub fn recall(tp: usize, fn_count: usize) -> f64 {
    if tp + fn_count > 0 {
        tp as f64 / (tp + fn_count) as f64
    } else {
        0.0
    }
}

/// Harmonic mean of precision and recall via reciprocals.
#[must_use]
pub fn f1(precision: f64, recall: f64) -> f64 {
    if precision > 0.0 && recall > 0.0 {
        2.0 / (1.0 / precision + 1.0 / recall)
    } else {
        0.0
    }
}

/// True positive / false positive / false negative counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    /// True positives
    pub true_positives: usize,
    /// False positives
    pub false_positives: usize,
    /// False negatives
    pub false_negatives: usize,
}

impl Counts {
    /// Create from raw counts.
    #[must_use]
    pub fn new(true_positives: usize, false_positives: usize, false_negatives: usize) -> Self {
        Self {
            true_positives,
            false_positives,
            false_negatives,
        }
    }

    /// Precision.
    #[must_use]
    pub fn precision(&self) -> f64 {
        precision(self.true_positives, self.false_positives)
    }

    /// Recall.
    #[must_use]
    pub fn recall(&self) -> f64 {
        recall(self.true_positives, self.false_negatives)
    }

    /// F1.
    #[must_use]
    pub fn f1(&self) -> f64 {
        f1(self.precision(), self.recall())
    }

    /// All three metrics.
    #[must_use]
    pub fn metrics(&self) -> Metrics {
        Metrics::new(self.precision(), self.recall())
    }

    /// Add another set of counts.
    pub fn merge(&mut self, other: &Counts) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }
}

/// Precision, recall and F1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Precision (0.0-1.0)
    pub precision: f64,
    /// Recall (0.0-1.0)
    pub recall: f64,
    /// F1 (0.0-1.0)
    pub f1: f64,
}

impl Metrics {
    /// Metrics from precision and recall; F1 is derived.
    #[must_use]
    pub fn new(precision: f64, recall: f64) -> Self {
        Self {
            precision,
            recall,
            f1: f1(precision, recall),
        }
    }
}

/// Share of each category in the total gold count.
///
/// All weights are zero when there is no gold at all.
#[must_use]
pub fn category_weights(gold_counts: &[usize]) -> Vec<f64> {
    let total: usize = gold_counts.iter().sum();
    gold_counts
        .iter()
        .map(|&c| if total > 0 { c as f64 / total as f64 } else { 0.0 })
        .collect()
}

/// Weight-dot-product of each metric across categories.
///
/// The averaged F1 is the weighted mean of per-category F1 values, not the
/// F1 of the averaged precision and recall.
#[must_use]
pub fn weighted_average(metrics: &[Metrics], weights: &[f64]) -> Metrics {
    metrics
        .iter()
        .zip(weights)
        .fold(Metrics::default(), |mut acc, (m, &w)| {
            acc.precision += m.precision * w;
            acc.recall += m.recall * w;
            acc.f1 += m.f1 * w;
            acc
        })
}
