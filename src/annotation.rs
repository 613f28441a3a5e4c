//! Predicted spans and the per-run prediction arena.
//!
//! A prediction is an [`Annotation`]: a character span, a tag mapping parsed
//! from a `key:value;key:value` label, a confidence, and optionally one nested
//! head span. Predictions of a whole run live in [`Predictions`], which hands
//! out [`PredictionId`] handles. Gold nodes refer back to predictions through
//! those handles.
//!
//! ```rust
//! use nesteval::annotation::{parse_tags, Annotation};
//!
//! let tags = parse_tags("ent:per;val:ind").unwrap();
//! let pred = Annotation::new("0_0", "Anna Muster", 10, 21, tags, 0.9);
//! assert_eq!(pred.tag("ent"), Some("per"));
//! assert_eq!(pred.len(), 11);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::gold::NodeId;
use crate::{Error, Result};

/// Tag key carried (with an empty value) by every head sub-annotation.
pub const HEAD_TAG: &str = "head";

/// Category key → category value.
pub type Tags = BTreeMap<String, String>;

/// Handle of a prediction inside a [`Predictions`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PredictionId(pub(crate) usize);

impl PredictionId {
    /// Position in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Parse a `;`-separated list of `key:value` pairs.
///
/// Every segment must split into exactly two parts on `:`. An empty string
/// is a single empty segment and is rejected.
pub fn parse_tags(value: &str) -> Result<Tags> {
    let mut tags = Tags::new();
    for segment in value.split(';') {
        let mut parts = segment.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(val), None) => {
                tags.insert(key.to_string(), val.to_string());
            }
            _ => {
                return Err(Error::parse(format!(
                    "tag segment '{}' in '{}' is not of the form key:value",
                    segment, value
                )))
            }
        }
    }
    Ok(tags)
}

/// Id of the `idx`-th prediction of document `doc`.
#[must_use]
pub fn prediction_label(doc: usize, idx: usize) -> String {
    format!("{}_{}", doc, idx)
}

/// One predicted span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// `{document}_{index}`, or `{document}_{index}_head` for a head span
    pub id: String,
    /// Surface text
    pub text: String,
    /// Start character offset
    pub start: usize,
    /// End character offset
    pub end: usize,
    /// Category tags
    pub tags: Tags,
    /// Model confidence; carried through, not used in scoring
    pub confidence: f64,
    /// Nested head span (never itself has a head)
    pub head: Option<Box<Annotation>>,
    #[serde(skip)]
    pub(crate) boundary_matches: Vec<NodeId>,
    #[serde(skip)]
    pub(crate) head_matches: Vec<NodeId>,
}

impl Annotation {
    /// Create an annotation without a head.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        start: usize,
        end: usize,
        tags: Tags,
        confidence: f64,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            start,
            end,
            tags,
            confidence,
            head: None,
            boundary_matches: Vec::new(),
            head_matches: Vec::new(),
        }
    }

    /// Create a head sub-annotation. Its only tag is [`HEAD_TAG`].
    #[must_use]
    pub fn head_of(
        parent_id: &str,
        text: impl Into<String>,
        start: usize,
        end: usize,
        confidence: f64,
    ) -> Self {
        let mut tags = Tags::new();
        tags.insert(HEAD_TAG.to_string(), String::new());
        Self::new(format!("{}_head", parent_id), text, start, end, tags, confidence)
    }

    /// Attach a head span. Any head the given span carries is dropped.
    #[must_use]
    pub fn with_head(mut self, mut head: Annotation) -> Self {
        head.head = None;
        self.head = Some(Box::new(head));
        self
    }

    /// Convenience for building test fixtures: tags from a label string.
    pub fn from_label(
        id: impl Into<String>,
        text: impl Into<String>,
        start: usize,
        end: usize,
        label: &str,
    ) -> Result<Self> {
        Ok(Self::new(id, text, start, end, parse_tags(label)?, 1.0))
    }

    /// Tag value for `key`.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// True if this is a head sub-annotation.
    #[must_use]
    pub fn is_head(&self) -> bool {
        self.tags.contains_key(HEAD_TAG)
    }

    /// `(start, end)`.
    #[must_use]
    pub fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Span length in characters (0 for zero-length or inverted spans).
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True for zero-length spans.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Conjunctive exact-match filter: every `key = value` in `filter` must be
    /// present with the same value.
    #[must_use]
    pub fn satisfies(&self, filter: &Tags) -> bool {
        filter
            .iter()
            .all(|(key, value)| self.tags.get(key) == Some(value))
    }

    /// Gold nodes whose full span equals this prediction's span.
    #[must_use]
    pub fn boundary_matches(&self) -> &[NodeId] {
        &self.boundary_matches
    }

    /// Gold nodes whose head span equals this prediction's head span.
    #[must_use]
    pub fn head_matches(&self) -> &[NodeId] {
        &self.head_matches
    }

    pub(crate) fn clear_matches(&mut self) {
        self.boundary_matches.clear();
        self.head_matches.clear();
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<String> = self
            .tags
            .iter()
            .map(|(k, v)| format!("{}:{}", k, v))
            .collect();
        write!(
            f,
            "{} ({{{}}}, {}, {})",
            self.text,
            tags.join(";"),
            self.start,
            self.end
        )
    }
}

/// All predictions of a run, grouped by document.
///
/// Document order is the order of the prediction stream; it is zipped
/// positionally with the gold documents.
#[derive(Debug, Clone, Default)]
pub struct Predictions {
    annotations: Vec<Annotation>,
    documents: Vec<Range<usize>>,
    by_label: HashMap<String, PredictionId>,
}

impl Predictions {
    /// Empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from per-document annotation lists.
    #[must_use]
    pub fn from_documents(documents: Vec<Vec<Annotation>>) -> Self {
        let mut predictions = Self::new();
        for doc in documents {
            predictions.push_document(doc);
        }
        predictions
    }

    /// Append one document's predictions; returns the document index.
    pub fn push_document(&mut self, annotations: Vec<Annotation>) -> usize {
        let start = self.annotations.len();
        for annotation in annotations {
            let id = PredictionId(self.annotations.len());
            if self.by_label.insert(annotation.id.clone(), id).is_some() {
                log::warn!("duplicate prediction id '{}'", annotation.id);
            }
            self.annotations.push(annotation);
        }
        self.documents.push(start..self.annotations.len());
        self.documents.len() - 1
    }

    /// Number of documents (prediction records).
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Total number of predictions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// True if there are no predictions at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Predictions of document `doc` (empty if out of range).
    #[must_use]
    pub fn document(&self, doc: usize) -> &[Annotation] {
        match self.documents.get(doc) {
            Some(range) => &self.annotations[range.clone()],
            None => &[],
        }
    }

    /// Handles of the predictions of document `doc`.
    pub fn document_ids(&self, doc: usize) -> impl Iterator<Item = PredictionId> {
        self.documents
            .get(doc)
            .cloned()
            .unwrap_or(0..0)
            .map(PredictionId)
    }

    /// Prediction by handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle comes from a different arena.
    #[must_use]
    pub fn get(&self, id: PredictionId) -> &Annotation {
        &self.annotations[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: PredictionId) -> &mut Annotation {
        &mut self.annotations[id.0]
    }

    /// Prediction by its string id (`{doc}_{idx}`).
    #[must_use]
    pub fn by_label(&self, label: &str) -> Option<PredictionId> {
        self.by_label.get(label).copied()
    }

    /// All predictions in stream order, flattened across documents.
    pub fn iter(&self) -> impl Iterator<Item = (PredictionId, &Annotation)> {
        self.annotations
            .iter()
            .enumerate()
            .map(|(i, a)| (PredictionId(i), a))
    }

    /// Forget every recorded match.
    pub fn clear_matches(&mut self) {
        for annotation in &mut self.annotations {
            annotation.clear_matches();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        let tags = parse_tags("ent:org;val:ind").unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags["ent"], "org");
        assert_eq!(tags["val"], "ind");
    }

    #[test]
    fn test_parse_tags_allows_empty_value() {
        let tags = parse_tags("ent:").unwrap();
        assert_eq!(tags["ent"], "");
    }

    #[test]
    fn test_parse_tags_rejects_malformed() {
        assert!(parse_tags("ent").is_err());
        assert!(parse_tags("").is_err());
        assert!(parse_tags("ent:per;").is_err());
        assert!(parse_tags("a:b:c").is_err());
    }

    #[test]
    fn test_head_sentinel() {
        let head = Annotation::head_of("3_1", "Muster", 15, 21, 0.8);
        assert_eq!(head.id, "3_1_head");
        assert!(head.is_head());
        assert_eq!(head.tags.len(), 1);
        assert_eq!(head.tag(HEAD_TAG), Some(""));
    }

    #[test]
    fn test_with_head_strips_nested_head() {
        let inner = Annotation::head_of("0_0_head", "x", 0, 1, 1.0);
        let head = Annotation::head_of("0_0", "Anna", 0, 4, 1.0).with_head(inner);
        let pred = Annotation::from_label("0_0", "Anna M", 0, 6, "ent:per")
            .unwrap()
            .with_head(head);
        assert!(pred.head.as_ref().unwrap().head.is_none());
    }

    #[test]
    fn test_satisfies_is_conjunctive() {
        let pred = Annotation::from_label("0_0", "x", 0, 1, "ent:per;val:ind").unwrap();

        let mut filter = Tags::new();
        assert!(pred.satisfies(&filter), "empty filter accepts everything");

        filter.insert("ent".into(), "per".into());
        assert!(pred.satisfies(&filter));

        filter.insert("val".into(), "grp".into());
        assert!(!pred.satisfies(&filter), "mismatched value excludes");

        let mut missing = Tags::new();
        missing.insert("mod".into(), "x".into());
        assert!(!pred.satisfies(&missing), "missing key excludes");
    }

    #[test]
    fn test_zero_length_span() {
        let pred = Annotation::from_label("0_0", "", 5, 5, "ent:per").unwrap();
        assert!(pred.is_empty());
        let inverted = Annotation::from_label("0_1", "", 7, 5, "ent:per").unwrap();
        assert_eq!(inverted.len(), 0);
    }

    #[test]
    fn test_predictions_arena() {
        let doc0 = vec![
            Annotation::from_label("0_0", "a", 0, 1, "ent:per").unwrap(),
            Annotation::from_label("0_1", "b", 2, 3, "ent:org").unwrap(),
        ];
        let doc1 = vec![Annotation::from_label("1_0", "c", 0, 1, "ent:loc").unwrap()];
        let preds = Predictions::from_documents(vec![doc0, Vec::new(), doc1]);

        assert_eq!(preds.document_count(), 3);
        assert_eq!(preds.len(), 3);
        assert_eq!(preds.document(0).len(), 2);
        assert!(preds.document(1).is_empty());
        assert_eq!(preds.document(2)[0].id, "1_0");
        assert!(preds.document(7).is_empty());

        let ids: Vec<_> = preds.document_ids(2).collect();
        assert_eq!(ids, vec![PredictionId(2)]);
        assert_eq!(preds.by_label("0_1"), Some(PredictionId(1)));
        assert_eq!(preds.get(PredictionId(1)).tag("ent"), Some("org"));
    }

    #[test]
    fn test_display() {
        let pred = Annotation::from_label("0_0", "Zürich", 3, 9, "ent:gpe").unwrap();
        assert_eq!(pred.to_string(), "Zürich ({ent:gpe}, 3, 9)");
    }
}
