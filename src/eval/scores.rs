//! Category scoring over matched predictions and gold nodes.
//!
//! # Modes
//!
//! | Mode | Gold node is TP when | Prediction is FP when |
//! |------|----------------------|-----------------------|
//! | [`ScoreMode::Typed`] | some boundary match agrees | no boundary match, or **any** match disagrees |
//! | [`ScoreMode::Boundary`] | it has a boundary match | it has no boundary match |
//! | [`ScoreMode::HeadBoundary`] | it has a head match | it has no head match |
//!
//! Gold nodes that are not TP are FN.
//!
//! # The agreement asymmetry
//!
//! In typed mode the gold side uses "any agrees" while the prediction side uses
//! "all agree". A prediction that matches two gold nodes with identical
//! boundaries, one of the right type and one of the wrong type, makes the
//! right-typed node a TP *and* is itself counted as a FP:
//!
//! ```text
//! gold A  [10,20) per_name   ─┐
//! gold B  [10,20) org_x      ─┼── pred [10,20) ent:per
//!                             │
//! A: TP (pred agrees)   B: FN (no agreeing match)   pred: FP (B disagrees)
//! ```
//!
//! # Weighted average
//!
//! Each category is weighted by its share of the summed gold counts of all
//! categories. With no gold anywhere every weight is zero and so is the
//! average.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::annotation::{Annotation, Predictions};
use crate::category::{CategorySlice, Partition};
use crate::eval::metrics::{category_weights, weighted_average, Counts, Metrics};
use crate::eval::strategy::{Aggregator, Comparator};
use crate::eval::WEIGHTED_AVG;
use crate::gold::{GoldNode, GoldTree};
use crate::Result;

/// Which matching definition a report uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMode {
    /// Exact boundary plus type agreement.
    Typed,
    /// Exact boundary only.
    Boundary,
    /// Exact head boundary only.
    HeadBoundary,
}

impl ScoreMode {
    /// All modes.
    #[must_use]
    pub fn all() -> &'static [ScoreMode] {
        &[ScoreMode::Boundary, ScoreMode::HeadBoundary, ScoreMode::Typed]
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ScoreMode::Typed => "boundary + type",
            ScoreMode::Boundary => "boundary only",
            ScoreMode::HeadBoundary => "head boundary only",
        }
    }
}

/// Scores of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// Category name
    pub name: String,
    /// Precision (0.0-1.0)
    pub precision: f64,
    /// Recall (0.0-1.0)
    pub recall: f64,
    /// F1 (0.0-1.0)
    pub f1: f64,
    /// Share of the total gold count
    pub weight: f64,
    /// Raw counts
    pub counts: Counts,
    /// Gold nodes in the category
    pub gold: usize,
    /// Predictions in the category
    pub predictions: usize,
}

impl CategoryScore {
    /// Precision, recall and F1.
    #[must_use]
    pub fn metrics(&self) -> Metrics {
        Metrics {
            precision: self.precision,
            recall: self.recall,
            f1: self.f1,
        }
    }
}

/// Per-category scores plus their weighted average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Matching definition
    pub mode: ScoreMode,
    /// Scores in category order
    pub categories: Vec<CategoryScore>,
    /// Gold-count-weighted average
    pub weighted_avg: Metrics,
}

impl ScoreReport {
    fn from_counts(mode: ScoreMode, entries: Vec<(&CategorySlice, Counts)>) -> Self {
        let gold_counts: Vec<usize> = entries.iter().map(|(s, _)| s.gold.len()).collect();
        let weights = category_weights(&gold_counts);

        let categories: Vec<CategoryScore> = entries
            .into_iter()
            .zip(&weights)
            .map(|((slice, counts), &weight)| {
                let metrics = counts.metrics();
                if slice.gold.is_empty() {
                    log::warn!("category {} has no gold nodes", slice.name);
                }
                CategoryScore {
                    name: slice.name.clone(),
                    precision: metrics.precision,
                    recall: metrics.recall,
                    f1: metrics.f1,
                    weight,
                    counts,
                    gold: slice.gold.len(),
                    predictions: slice.predictions.len(),
                }
            })
            .collect();

        let metrics: Vec<Metrics> = categories.iter().map(CategoryScore::metrics).collect();
        let weighted_avg = weighted_average(&metrics, &weights);

        Self {
            mode,
            categories,
            weighted_avg,
        }
    }

    /// Scores of a category by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CategoryScore> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Nested mapping `category → {precision, recall, f1, weight}`, plus a
    /// `weighted_avg` entry with `{precision, recall, f1}`.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        let mut map = BTreeMap::new();
        for c in &self.categories {
            let mut entry = BTreeMap::new();
            entry.insert("precision".to_string(), c.precision);
            entry.insert("recall".to_string(), c.recall);
            entry.insert("f1".to_string(), c.f1);
            entry.insert("weight".to_string(), c.weight);
            map.insert(c.name.clone(), entry);
        }
        let mut avg = BTreeMap::new();
        avg.insert("precision".to_string(), self.weighted_avg.precision);
        avg.insert("recall".to_string(), self.weighted_avg.recall);
        avg.insert("f1".to_string(), self.weighted_avg.f1);
        map.insert(WEIGHTED_AVG.to_string(), avg);
        map
    }
}

/// Per-bucket recall counts of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBuckets<K> {
    /// Category name
    pub name: String,
    /// Counts per aggregation key (only TP and FN are populated)
    pub buckets: BTreeMap<K, Counts>,
}

/// Recall per category per aggregation key.
///
/// Precision and F1 are not reported: false positives cannot be attributed to
/// a gold-side bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomRecallReport<K> {
    /// Buckets in category order
    pub categories: Vec<CategoryBuckets<K>>,
}

impl<K: Ord + Clone + std::fmt::Display> CustomRecallReport<K> {
    /// Recall of `key` in `category`.
    #[must_use]
    pub fn recall(&self, category: &str, key: &K) -> Option<f64> {
        self.categories
            .iter()
            .find(|c| c.name == category)?
            .buckets
            .get(key)
            .map(Counts::recall)
    }

    /// Nested mapping `category → key → recall`, keys rendered with `Display`.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        self.categories
            .iter()
            .map(|c| {
                let buckets = c
                    .buckets
                    .iter()
                    .map(|(k, counts)| (k.to_string(), counts.recall()))
                    .collect();
                (c.name.clone(), buckets)
            })
            .collect()
    }
}

/// Scores a partition after the span matcher has run.
#[derive(Debug, Clone, Copy)]
pub struct Scorer<'a> {
    gold: &'a GoldTree,
    predictions: &'a Predictions,
    partition: &'a Partition,
}

impl<'a> Scorer<'a> {
    /// Scorer over matched inputs and their category partition.
    #[must_use]
    pub fn new(gold: &'a GoldTree, predictions: &'a Predictions, partition: &'a Partition) -> Self {
        Self {
            gold,
            predictions,
            partition,
        }
    }

    /// Boundary plus type agreement.
    pub fn scores<C: Comparator + ?Sized>(&self, comparator: &C) -> Result<ScoreReport> {
        let mut entries = Vec::with_capacity(self.partition.slices().len());
        for slice in self.partition.slices() {
            let mut counts = Counts::default();
            for &node in &slice.gold {
                if self.gold_agrees(self.gold.node(node), comparator)? {
                    counts.true_positives += 1;
                } else {
                    counts.false_negatives += 1;
                }
            }
            for &pred in &slice.predictions {
                if !self.prediction_agrees(self.predictions.get(pred), comparator)? {
                    counts.false_positives += 1;
                }
            }
            log::debug!("{} ({}): {:?}", slice.name, ScoreMode::Typed.name(), counts);
            entries.push((slice, counts));
        }
        Ok(ScoreReport::from_counts(ScoreMode::Typed, entries))
    }

    /// Boundary matching only; type agreement is ignored.
    #[must_use]
    pub fn boundary_scores(&self) -> ScoreReport {
        self.presence_scores(
            ScoreMode::Boundary,
            |n| !n.boundary_matches().is_empty(),
            |p| !p.boundary_matches().is_empty(),
        )
    }

    /// Head boundary matching only.
    #[must_use]
    pub fn head_boundary_scores(&self) -> ScoreReport {
        self.presence_scores(
            ScoreMode::HeadBoundary,
            |n| !n.head_matches().is_empty(),
            |p| !p.head_matches().is_empty(),
        )
    }

    /// Typed-mode recall bucketed by an aggregation key of each gold node.
    pub fn scores_custom<C, A>(
        &self,
        comparator: &C,
        aggregator: &A,
    ) -> Result<CustomRecallReport<A::Key>>
    where
        C: Comparator + ?Sized,
        A: Aggregator + ?Sized,
    {
        let mut categories = Vec::with_capacity(self.partition.slices().len());
        for slice in self.partition.slices() {
            let mut buckets: BTreeMap<A::Key, Counts> = BTreeMap::new();
            for &id in &slice.gold {
                let node = self.gold.node(id);
                let key = aggregator.key(self.gold, node)?;
                let counts = buckets.entry(key).or_default();
                if self.gold_agrees(node, comparator)? {
                    counts.true_positives += 1;
                } else {
                    counts.false_negatives += 1;
                }
            }
            categories.push(CategoryBuckets {
                name: slice.name.clone(),
                buckets,
            });
        }
        Ok(CustomRecallReport { categories })
    }

    fn presence_scores(
        &self,
        mode: ScoreMode,
        gold_matched: impl Fn(&GoldNode) -> bool,
        prediction_matched: impl Fn(&Annotation) -> bool,
    ) -> ScoreReport {
        let entries = self
            .partition
            .slices()
            .iter()
            .map(|slice| {
                let tp = count(&slice.gold, |&id| gold_matched(self.gold.node(id)));
                let fp = slice.predictions.len()
                    - count(&slice.predictions, |&id| prediction_matched(self.predictions.get(id)));
                let counts = Counts::new(tp, fp, slice.gold.len() - tp);
                log::debug!("{} ({}): {:?}", slice.name, mode.name(), counts);
                (slice, counts)
            })
            .collect();
        ScoreReport::from_counts(mode, entries)
    }

    /// Any matched prediction agrees.
    fn gold_agrees<C: Comparator + ?Sized>(&self, node: &GoldNode, comparator: &C) -> Result<bool> {
        for &pred in node.boundary_matches() {
            if comparator.agrees(node, self.predictions.get(pred))? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Matched at all, and every matched node agrees.
    fn prediction_agrees<C: Comparator + ?Sized>(
        &self,
        prediction: &Annotation,
        comparator: &C,
    ) -> Result<bool> {
        if prediction.boundary_matches().is_empty() {
            return Ok(false);
        }
        for &node in prediction.boundary_matches() {
            if !comparator.agrees(self.gold.node(node), prediction)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn count<T>(items: &[T], pred: impl Fn(&T) -> bool) -> usize {
    items.iter().filter(|item| pred(item)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotation;
    use crate::category::{Category, CategorySet};
    use crate::eval::strategy::{CoarseTypeComparator, NodeAndParentTag, NodeDepth, TagPair};
    use crate::matcher::SpanMatcher;
    use crate::query::NodeQuery;
    use std::collections::BTreeMap;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    struct Run {
        tree: GoldTree,
        preds: Predictions,
        partition: Partition,
    }

    fn run(tree: GoldTree, preds: Vec<Annotation>, categories: CategorySet) -> Run {
        let mut tree = tree;
        let mut preds = Predictions::from_documents(vec![preds]);
        SpanMatcher::new(&categories).run(&mut preds, &mut tree);
        let partition = categories.partition(&preds, &tree);
        Run { tree, preds, partition }
    }

    fn single_person() -> GoldTree {
        let mut tree = GoldTree::new();
        let doc = tree.add_document("", BTreeMap::new());
        tree.add_node(
            doc,
            None,
            "PER",
            attrs(&[("char_start", "10"), ("char_end", "20"), ("entity_type", "per_name")]),
        )
        .unwrap();
        tree
    }

    #[test]
    fn test_agreeing_match() {
        let r = run(
            single_person(),
            vec![Annotation::from_label("0_0", "x", 10, 20, "ent:per").unwrap()],
            CategorySet::benasch(),
        );
        let scorer = Scorer::new(&r.tree, &r.preds, &r.partition);
        let report = scorer.scores(&CoarseTypeComparator::default()).unwrap();
        let persons = report.get("Persons").unwrap();
        assert_eq!(persons.counts, Counts::new(1, 0, 0));
        assert_eq!(persons.f1, 1.0);
        assert_eq!(persons.weight, 1.0);
        assert_eq!(report.weighted_avg, Metrics::new(1.0, 1.0));
    }

    #[test]
    fn test_disagreeing_match() {
        let r = run(
            single_person(),
            vec![Annotation::from_label("0_0", "x", 10, 20, "ent:org").unwrap()],
            CategorySet::benasch(),
        );
        let scorer = Scorer::new(&r.tree, &r.preds, &r.partition);

        let typed = scorer.scores(&CoarseTypeComparator::default()).unwrap();
        assert_eq!(typed.get("Persons").unwrap().counts, Counts::new(0, 0, 1));
        assert_eq!(typed.get("Organizations").unwrap().counts, Counts::new(0, 1, 0));

        let boundary = scorer.boundary_scores();
        assert_eq!(boundary.get("Persons").unwrap().counts.true_positives, 1);
        assert_eq!(boundary.get("Organizations").unwrap().counts.false_positives, 0);
    }

    #[test]
    fn test_asymmetric_disagreement() {
        let mut tree = single_person();
        tree.add_node(
            crate::gold::DocId(0),
            None,
            "ORG",
            attrs(&[("char_start", "10"), ("char_end", "20"), ("entity_type", "org_x")]),
        )
        .unwrap();
        let all = CategorySet::new(vec![Category::new(
            "All",
            Default::default(),
            NodeQuery::HasAttribute("entity_type".into()),
        )])
        .unwrap();
        let r = run(tree, vec![Annotation::from_label("0_0", "x", 10, 20, "ent:per").unwrap()], all);
        let report = Scorer::new(&r.tree, &r.preds, &r.partition)
            .scores(&CoarseTypeComparator::default())
            .unwrap();
        // one gold TP (per), one gold FN (org), the prediction is a FP
        assert_eq!(report.get("All").unwrap().counts, Counts::new(1, 1, 1));
    }

    #[test]
    fn test_head_scores() {
        let mut tree = GoldTree::new();
        let doc = tree.add_document("", BTreeMap::new());
        tree.add_node(
            doc,
            None,
            "PER",
            attrs(&[
                ("char_start", "0"),
                ("char_end", "20"),
                ("head_char_start", "5"),
                ("head_char_end", "9"),
                ("entity_type", "per"),
            ]),
        )
        .unwrap();
        let with_head = Annotation::from_label("0_0", "x", 0, 15, "ent:per")
            .unwrap()
            .with_head(Annotation::head_of("0_0", "h", 5, 9, 1.0));
        let without_head = Annotation::from_label("0_1", "y", 0, 20, "ent:per").unwrap();
        let r = run(tree, vec![with_head, without_head], CategorySet::benasch());
        let scorer = Scorer::new(&r.tree, &r.preds, &r.partition);

        let head = scorer.head_boundary_scores();
        assert_eq!(head.mode, ScoreMode::HeadBoundary);
        assert_eq!(head.get("Persons").unwrap().counts, Counts::new(1, 1, 0));

        let boundary = scorer.boundary_scores();
        assert_eq!(boundary.get("Persons").unwrap().counts, Counts::new(1, 1, 0));
    }

    #[test]
    fn test_zero_gold_category() {
        let r = run(
            single_person(),
            vec![Annotation::from_label("0_0", "x", 1, 2, "ent:loc").unwrap()],
            CategorySet::benasch(),
        );
        let report = Scorer::new(&r.tree, &r.preds, &r.partition).boundary_scores();
        let locs = report.get("Locations").unwrap();
        assert_eq!(locs.weight, 0.0);
        assert_eq!(locs.recall, 0.0);
        assert_eq!(locs.counts, Counts::new(0, 1, 0));
        assert!(report.weighted_avg.recall.is_finite());
    }

    #[test]
    fn test_no_gold_at_all() {
        let r = run(GoldTree::new(), Vec::new(), CategorySet::benasch());
        let report = Scorer::new(&r.tree, &r.preds, &r.partition).boundary_scores();
        assert!(report.categories.iter().all(|c| c.weight == 0.0));
        assert_eq!(report.weighted_avg, Metrics::default());
    }

    #[test]
    fn test_to_map_shape() {
        let r = run(
            single_person(),
            vec![Annotation::from_label("0_0", "x", 10, 20, "ent:per").unwrap()],
            CategorySet::benasch(),
        );
        let map = Scorer::new(&r.tree, &r.preds, &r.partition).boundary_scores().to_map();
        assert_eq!(map.len(), 5);
        assert_eq!(map["Persons"]["weight"], 1.0);
        assert_eq!(map[WEIGHTED_AVG].len(), 3);
        assert!(!map[WEIGHTED_AVG].contains_key("weight"));
    }

    #[test]
    fn test_scores_custom() {
        let mut tree = GoldTree::new();
        let doc = tree.add_document("", BTreeMap::new());
        let org = tree
            .add_node(
                doc,
                None,
                "ORG",
                attrs(&[("char_start", "0"), ("char_end", "30"), ("entity_type", "org")]),
            )
            .unwrap();
        for (s, e) in [("0", "5"), ("10", "15")] {
            tree.add_node(
                doc,
                Some(org),
                "PER",
                attrs(&[("char_start", s), ("char_end", e), ("entity_type", "per")]),
            )
            .unwrap();
        }
        tree.add_node(
            doc,
            None,
            "PER",
            attrs(&[("char_start", "40"), ("char_end", "45"), ("entity_type", "per")]),
        )
        .unwrap();
        let preds = vec![
            Annotation::from_label("0_0", "a", 0, 5, "ent:per").unwrap(),
            Annotation::from_label("0_1", "b", 40, 45, "ent:per").unwrap(),
        ];
        let r = run(tree, preds, CategorySet::benasch());
        let scorer = Scorer::new(&r.tree, &r.preds, &r.partition);
        let cmp = CoarseTypeComparator::default();

        let by_parent = scorer.scores_custom(&cmp, &NodeAndParentTag).unwrap();
        let in_org = TagPair { tag: "PER".into(), parent: "ORG".into() };
        let top = TagPair { tag: "PER".into(), parent: "Document".into() };
        assert_eq!(by_parent.recall("Persons", &in_org), Some(0.5));
        assert_eq!(by_parent.recall("Persons", &top), Some(1.0));
        assert_eq!(by_parent.recall("Organizations", &in_org), None);

        let by_depth = scorer.scores_custom(&cmp, &NodeDepth).unwrap();
        assert_eq!(by_depth.recall("Persons", &1), Some(0.5));
        assert_eq!(by_depth.recall("Organizations", &0), Some(0.0));

        let map = by_parent.to_map();
        assert_eq!(map["Persons"]["PER < ORG"], 0.5);
        assert!(map["Locations"].is_empty());
    }

    #[test]
    fn test_comparator_errors_propagate() {
        let mut tree = GoldTree::new();
        let doc = tree.add_document("", BTreeMap::new());
        tree.add_node(doc, None, "X", attrs(&[("char_start", "0"), ("char_end", "1")]))
            .unwrap();
        let any = CategorySet::new(vec![Category::new("Any", Default::default(), NodeQuery::Any)]).unwrap();
        let r = run(tree, vec![Annotation::from_label("0_0", "x", 0, 1, "ent:per").unwrap()], any);
        let result = Scorer::new(&r.tree, &r.preds, &r.partition).scores(&CoarseTypeComparator::default());
        assert!(result.is_err());
    }
}
