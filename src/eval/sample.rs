//! Error sampling: predictions whose head and full span disagree on a match.
//!
//! Two directions are sampled per category:
//!
//! - **head correct, full span wrong**: the head matched a gold node that the
//!   full span did not match.
//! - **full span correct, head wrong**: the full span matched a gold node
//!   that the head did not match.
//!
//! Each sample carries enough text to eyeball the error without opening the
//! corpus: the prediction, its head, the gold `head_text` and the gold span
//! sliced from the document text.

use serde::{Deserialize, Serialize};

use crate::annotation::{PredictionId, Predictions};
use crate::category::Partition;
use crate::gold::{GoldTree, NodeId};

/// Which way a head match and a full-span match disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// Head matched, full span did not
    HeadOnly,
    /// Full span matched, head did not
    SpanOnly,
}

impl DiscrepancyKind {
    /// Section title.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            DiscrepancyKind::HeadOnly => "HEAD CORRECT, FULL SPAN WRONG",
            DiscrepancyKind::SpanOnly => "FULL SPAN CORRECT, HEAD WRONG",
        }
    }
}

/// One prediction/gold pair where the two match kinds disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanDiscrepancy {
    /// Prediction handle
    #[serde(skip)]
    pub prediction_id: Option<PredictionId>,
    /// Gold node handle
    #[serde(skip)]
    pub node_id: Option<NodeId>,
    /// Rendered prediction
    pub prediction: String,
    /// Rendered head of the prediction, if any
    pub head: Option<String>,
    /// Gold node label (`TAG#index`)
    pub gold_node: String,
    /// Gold `head_text` attribute
    pub gold_head_text: Option<String>,
    /// Gold span sliced from the document text
    pub gold_span_text: Option<String>,
}

/// Samples of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySamples {
    /// Category name
    pub name: String,
    /// Direction sampled
    pub kind: DiscrepancyKind,
    /// Samples in prediction order
    pub samples: Vec<SpanDiscrepancy>,
}

/// Head matched a node the full span did not, per category.
#[must_use]
pub fn head_correct_but_not_full_span(
    partition: &Partition,
    predictions: &Predictions,
    gold: &GoldTree,
) -> Vec<CategorySamples> {
    collect(partition, predictions, gold, DiscrepancyKind::HeadOnly)
}

/// Full span matched a node the head did not, per category.
#[must_use]
pub fn full_span_correct_but_not_head(
    partition: &Partition,
    predictions: &Predictions,
    gold: &GoldTree,
) -> Vec<CategorySamples> {
    collect(partition, predictions, gold, DiscrepancyKind::SpanOnly)
}

fn collect(
    partition: &Partition,
    predictions: &Predictions,
    gold: &GoldTree,
    kind: DiscrepancyKind,
) -> Vec<CategorySamples> {
    partition
        .slices()
        .iter()
        .map(|slice| {
            let mut samples = Vec::new();
            for &pid in &slice.predictions {
                let pred = predictions.get(pid);
                let (found, other) = match kind {
                    DiscrepancyKind::HeadOnly => (pred.head_matches(), pred.boundary_matches()),
                    DiscrepancyKind::SpanOnly => (pred.boundary_matches(), pred.head_matches()),
                };
                for &node_id in found.iter().filter(|n| !other.contains(*n)) {
                    let node = gold.node(node_id);
                    samples.push(SpanDiscrepancy {
                        prediction_id: Some(pid),
                        node_id: Some(node_id),
                        prediction: pred.to_string(),
                        head: pred.head.as_ref().map(ToString::to_string),
                        gold_node: node.label(),
                        gold_head_text: node.head_text().map(str::to_string),
                        gold_span_text: gold.span_text(node_id),
                    });
                }
            }
            log::debug!("{}: {} samples ({:?})", slice.name, samples.len(), kind);
            CategorySamples {
                name: slice.name.clone(),
                kind,
                samples,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotation;
    use crate::category::CategorySet;
    use crate::matcher::SpanMatcher;
    use std::collections::BTreeMap;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn setup() -> (GoldTree, Predictions, Partition) {
        let mut tree = GoldTree::new();
        let doc = tree.add_document("Die Firma Muster AG meldet", BTreeMap::new());
        tree.add_node(
            doc,
            None,
            "ORG",
            attrs(&[
                ("char_start", "4"),
                ("char_end", "19"),
                ("head_char_start", "4"),
                ("head_char_end", "9"),
                ("head_text", "Firma"),
                ("entity_type", "org"),
            ]),
        )
        .unwrap();
        let head_only = Annotation::from_label("0_0", "Firma Muster", 4, 16, "ent:org")
            .unwrap()
            .with_head(Annotation::head_of("0_0", "Firma", 4, 9, 1.0));
        let span_only = Annotation::from_label("0_1", "Firma Muster AG", 4, 19, "ent:org")
            .unwrap()
            .with_head(Annotation::head_of("0_1", "Muster", 10, 16, 1.0));
        let both = Annotation::from_label("0_2", "Firma Muster AG", 4, 19, "ent:org")
            .unwrap()
            .with_head(Annotation::head_of("0_2", "Firma", 4, 9, 1.0));

        let mut preds = Predictions::from_documents(vec![vec![head_only, span_only, both]]);
        let categories = CategorySet::benasch();
        SpanMatcher::new(&categories).run(&mut preds, &mut tree);
        let partition = categories.partition(&preds, &tree);
        (tree, preds, partition)
    }

    #[test]
    fn test_head_correct_but_not_full_span() {
        let (tree, preds, partition) = setup();
        let result = head_correct_but_not_full_span(&partition, &preds, &tree);
        let orgs = result.iter().find(|c| c.name == "Organizations").unwrap();
        assert_eq!(orgs.samples.len(), 1);
        let s = &orgs.samples[0];
        assert_eq!(s.prediction_id, Some(PredictionId(0)));
        assert_eq!(s.gold_head_text.as_deref(), Some("Firma"));
        assert_eq!(s.gold_span_text.as_deref(), Some("Firma Muster AG"));
        assert!(s.head.as_deref().unwrap().starts_with("Firma"));
        assert!(result.iter().filter(|c| c.name != "Organizations").all(|c| c.samples.is_empty()));
    }

    #[test]
    fn test_full_span_correct_but_not_head() {
        let (tree, preds, partition) = setup();
        let result = full_span_correct_but_not_head(&partition, &preds, &tree);
        let orgs = result.iter().find(|c| c.name == "Organizations").unwrap();
        assert_eq!(orgs.kind, DiscrepancyKind::SpanOnly);
        assert_eq!(orgs.samples.len(), 1);
        assert_eq!(orgs.samples[0].prediction_id, Some(PredictionId(1)));
        assert_eq!(orgs.samples[0].gold_node, "ORG#0");
    }
}
