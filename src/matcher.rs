//! Exact-boundary alignment of predictions to gold nodes.
//!
//! For each document (gold and prediction documents are zipped by position):
//!
//! 1. The candidate pool is the union of the nodes selected by any category
//!    query in that document. A node selected by several categories is in the
//!    pool once.
//! 2. Every prediction whose `(start, end)` equals a candidate's full span is
//!    recorded on both sides (`boundary_matches`).
//! 3. Every prediction with a head whose `(start, end)` equals a candidate's
//!    head span is recorded on both sides (`head_matches`). The gold node
//!    records the id of the owning prediction, not of the head.
//!
//! The match is many-to-many. Nothing is deduplicated across predictions and
//! there is no tie-break: two gold nodes with identical boundaries both match.
//! Candidates are indexed by span per document, so the cost is linear in
//! predictions plus candidates.
//!
//! [`SpanMatcher::run`] clears all match state before matching, so running it
//! twice over the same inputs yields the same match sets.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::annotation::{PredictionId, Predictions};
use crate::category::CategorySet;
use crate::gold::{DocId, GoldTree, NodeId};
use crate::query::NodeQuery;

/// Aligns predictions with gold nodes by exact span equality.
#[derive(Debug, Clone)]
pub struct SpanMatcher {
    queries: Vec<NodeQuery>,
}

/// Counts from one matcher run, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Documents in the gold corpus
    pub gold_documents: usize,
    /// Records in the prediction stream
    pub prediction_documents: usize,
    /// Documents actually aligned (the shorter of the two)
    pub aligned_documents: usize,
    /// Candidate gold nodes over all aligned documents
    pub candidate_nodes: usize,
    /// Recorded (prediction, node) full-span pairs
    pub boundary_pairs: usize,
    /// Recorded (prediction, node) head pairs
    pub head_pairs: usize,
    /// Predictions in aligned documents with no full-span match
    pub unmatched_predictions: usize,
}

impl MatchSummary {
    /// True if gold and prediction document counts differ.
    #[must_use]
    pub fn document_mismatch(&self) -> bool {
        self.gold_documents != self.prediction_documents
    }
}

impl SpanMatcher {
    /// Matcher whose candidate pool is the union of the categories' queries.
    #[must_use]
    pub fn new(categories: &CategorySet) -> Self {
        Self {
            queries: categories.queries().cloned().collect(),
        }
    }

    /// Matcher over explicit queries.
    #[must_use]
    pub fn from_queries(queries: impl IntoIterator<Item = NodeQuery>) -> Self {
        Self {
            queries: queries.into_iter().collect(),
        }
    }

    /// Candidate nodes of one document, deduplicated, in document order.
    #[must_use]
    pub fn candidates(&self, gold: &GoldTree, document: DocId) -> Vec<NodeId> {
        let pool: BTreeSet<NodeId> = self
            .queries
            .iter()
            .flat_map(|q| gold.select_in(document, q))
            .collect();
        pool.into_iter().collect()
    }

    /// Reset match state, then match every aligned document.
    ///
    /// Mismatched document counts are tolerated: surplus documents on either
    /// side are left unmatched and reported in the summary.
    pub fn run(&self, predictions: &mut Predictions, gold: &mut GoldTree) -> MatchSummary {
        predictions.clear_matches();
        gold.clear_matches();

        let mut summary = MatchSummary {
            gold_documents: gold.document_count(),
            prediction_documents: predictions.document_count(),
            aligned_documents: gold.document_count().min(predictions.document_count()),
            ..MatchSummary::default()
        };
        if summary.document_mismatch() {
            log::warn!(
                "gold has {} documents but predictions have {}; aligning the first {}",
                summary.gold_documents,
                summary.prediction_documents,
                summary.aligned_documents
            );
        }

        for doc in 0..summary.aligned_documents {
            let (pairs, heads, unmatched, candidates) =
                self.match_document(predictions, gold, DocId(doc));
            log::debug!(
                "document {}: {} candidates, {} boundary pairs, {} head pairs",
                doc,
                candidates,
                pairs,
                heads
            );
            summary.candidate_nodes += candidates;
            summary.boundary_pairs += pairs;
            summary.head_pairs += heads;
            summary.unmatched_predictions += unmatched;
        }

        log::info!(
            "matched {} documents: {} boundary pairs, {} head pairs, {} unmatched predictions",
            summary.aligned_documents,
            summary.boundary_pairs,
            summary.head_pairs,
            summary.unmatched_predictions
        );
        summary
    }

    fn match_document(
        &self,
        predictions: &mut Predictions,
        gold: &mut GoldTree,
        document: DocId,
    ) -> (usize, usize, usize, usize) {
        let candidates = self.candidates(gold, document);

        let mut by_span: HashMap<(usize, usize), Vec<NodeId>> = HashMap::new();
        let mut by_head: HashMap<(usize, usize), Vec<NodeId>> = HashMap::new();
        for &id in &candidates {
            let node = gold.node(id);
            if let Some(span) = node.span {
                by_span.entry(span).or_default().push(id);
            }
            if let Some(head) = node.head_span {
                by_head.entry(head).or_default().push(id);
            }
        }

        let ids: Vec<PredictionId> = predictions.document_ids(document.index()).collect();
        let (mut pairs, mut heads, mut unmatched) = (0, 0, 0);
        for pid in ids {
            let prediction = predictions.get_mut(pid);

            let full = by_span.get(&prediction.span()).map_or(&[][..], Vec::as_slice);
            prediction.boundary_matches.extend_from_slice(full);
            if full.is_empty() {
                unmatched += 1;
            }

            let head = match &prediction.head {
                Some(h) => by_head.get(&h.span()).map_or(&[][..], Vec::as_slice),
                None => &[][..],
            };
            prediction.head_matches.extend_from_slice(head);

            for &node in full {
                gold.record_boundary_match(node, pid);
            }
            for &node in head {
                gold.record_head_match(node, pid);
            }
            pairs += full.len();
            heads += head.len();
        }
        (pairs, heads, unmatched, candidates.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotation;
    use crate::category::CategorySet;
    use std::collections::BTreeMap;

    fn node(tree: &mut GoldTree, doc: DocId, parent: Option<NodeId>, pairs: &[(&str, &str)]) -> NodeId {
        let attrs: BTreeMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        tree.add_node(doc, parent, "N", attrs).unwrap()
    }

    fn gold() -> GoldTree {
        let mut tree = GoldTree::new();
        let doc = tree.add_document("", BTreeMap::new());
        let org = node(
            &mut tree,
            doc,
            None,
            &[("char_start", "0"), ("char_end", "24"), ("entity_type", "org")],
        );
        node(
            &mut tree,
            doc,
            Some(org),
            &[
                ("char_start", "10"),
                ("char_end", "20"),
                ("head_char_start", "15"),
                ("head_char_end", "20"),
                ("entity_type", "per_name"),
            ],
        );
        // duplicate annotation with identical boundaries
        node(
            &mut tree,
            doc,
            Some(org),
            &[("char_start", "10"), ("char_end", "20"), ("entity_type", "per_role")],
        );
        tree
    }

    fn preds() -> Predictions {
        let head = Annotation::head_of("0_0", "x", 15, 20, 1.0);
        Predictions::from_documents(vec![vec![
            Annotation::from_label("0_0", "p", 10, 20, "ent:per").unwrap().with_head(head),
            Annotation::from_label("0_1", "q", 3, 7, "ent:loc").unwrap(),
            Annotation::from_label("0_2", "r", 10, 20, "ent:org").unwrap(),
        ]])
    }

    #[test]
    fn test_many_to_many() {
        let mut tree = gold();
        let mut preds = preds();
        let summary = SpanMatcher::new(&CategorySet::benasch()).run(&mut preds, &mut tree);

        let p0 = preds.get(PredictionId(0));
        assert_eq!(p0.boundary_matches(), &[NodeId(1), NodeId(2)]);
        assert_eq!(p0.head_matches(), &[NodeId(1)]);
        assert!(preds.get(PredictionId(1)).boundary_matches().is_empty());

        assert_eq!(tree.node(NodeId(1)).boundary_matches(), &[PredictionId(0), PredictionId(2)]);
        assert_eq!(tree.node(NodeId(1)).head_matches(), &[PredictionId(0)]);
        assert!(tree.node(NodeId(0)).boundary_matches().is_empty());

        assert_eq!(summary.boundary_pairs, 4);
        assert_eq!(summary.head_pairs, 1);
        assert_eq!(summary.unmatched_predictions, 1);
        assert_eq!(summary.candidate_nodes, 3);
    }

    #[test]
    fn test_overlapping_queries_match_once() {
        let mut tree = gold();
        let mut preds = preds();
        let matcher = SpanMatcher::from_queries(vec![
            NodeQuery::attribute_prefix("entity_type", "per"),
            NodeQuery::attribute_prefix("entity_type", "per_name"),
            NodeQuery::Any,
        ]);
        assert_eq!(matcher.candidates(&tree, DocId(0)).len(), 3);
        matcher.run(&mut preds, &mut tree);
        assert_eq!(tree.node(NodeId(1)).boundary_matches().len(), 2);
        assert_eq!(preds.get(PredictionId(0)).boundary_matches().len(), 2);
    }

    #[test]
    fn test_only_candidates_are_matched() {
        let mut tree = gold();
        let mut preds = preds();
        let matcher = SpanMatcher::from_queries(vec![NodeQuery::attribute_equals("entity_type", "per_role")]);
        matcher.run(&mut preds, &mut tree);
        assert_eq!(preds.get(PredictionId(0)).boundary_matches(), &[NodeId(2)]);
        assert!(preds.get(PredictionId(0)).head_matches().is_empty());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let mut tree = gold();
        let mut preds = preds();
        let matcher = SpanMatcher::new(&CategorySet::benasch());
        let first = matcher.run(&mut preds, &mut tree);
        let snapshot: Vec<Vec<PredictionId>> =
            tree.nodes().iter().map(|n| n.boundary_matches().to_vec()).collect();

        let second = matcher.run(&mut preds, &mut tree);
        assert_eq!(first, second);
        let again: Vec<Vec<PredictionId>> =
            tree.nodes().iter().map(|n| n.boundary_matches().to_vec()).collect();
        assert_eq!(snapshot, again);
        assert_eq!(preds.get(PredictionId(0)).boundary_matches().len(), 2);
    }

    #[test]
    fn test_document_count_mismatch_tolerated() {
        let mut tree = gold();
        tree.add_document("second", BTreeMap::new());
        let mut preds = preds();
        let summary = SpanMatcher::new(&CategorySet::benasch()).run(&mut preds, &mut tree);
        assert!(summary.document_mismatch());
        assert_eq!(summary.aligned_documents, 1);

        let mut empty = Predictions::new();
        let summary = SpanMatcher::new(&CategorySet::benasch()).run(&mut empty, &mut tree);
        assert_eq!(summary.aligned_documents, 0);
        assert!(tree.nodes().iter().all(|n| n.boundary_matches().is_empty()));
    }
}
