//! Hierarchical gold corpus.
//!
//! # Structure
//!
//! ```text
//! GoldTree
//!   ├── Document (document_text)
//!   │     ├── GoldNode  ORG   char_start=0  char_end=24   depth 0
//!   │     │     └── GoldNode  PER   char_start=10 char_end=21  depth 1
//!   │     │           └── GoldNode  NP  ...                     depth 2
//!   │     └── ...
//!   └── Document ...
//! ```
//!
//! Nodes live in one arena and are addressed by [`NodeId`]; ids follow
//! document order (pre-order). Each node carries mutable match sets that the
//! span matcher fills in. They are ordinary `Vec<PredictionId>`s, not encoded
//! attribute strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::annotation::PredictionId;
use crate::query::NodeQuery;
use crate::{Error, Result};

/// Element name of gold documents.
pub const DOCUMENT_TAG: &str = "Document";

/// Full span start attribute.
pub const CHAR_START: &str = "char_start";
/// Full span end attribute.
pub const CHAR_END: &str = "char_end";
/// Head span start attribute.
pub const HEAD_CHAR_START: &str = "head_char_start";
/// Head span end attribute.
pub const HEAD_CHAR_END: &str = "head_char_end";
/// Type attribute; its first `_`-delimited segment is the coarse type.
pub const ENTITY_TYPE: &str = "entity_type";
/// Head surface text attribute.
pub const HEAD_TEXT: &str = "head_text";
/// Document text attribute.
pub const DOCUMENT_TEXT: &str = "document_text";

/// Handle of a gold node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position in the arena (document order).
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle of a gold document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocId(pub(crate) usize);

impl DocId {
    /// Position of the document in corpus order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One gold document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Handle
    pub id: DocId,
    /// Full raw text
    pub text: String,
    /// Remaining attributes of the document element
    pub attributes: BTreeMap<String, String>,
    nodes: Vec<NodeId>,
}

impl Document {
    /// Nodes of this document in document order.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Slice `[start, end)` of the document text by character offset.
    ///
    /// Returns `None` if the range is inverted or runs past the text.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> Option<String> {
        if start > end {
            return None;
        }
        let mut chars = self.text.chars();
        let mut out = String::new();
        for _ in 0..start {
            chars.next()?;
        }
        for _ in start..end {
            out.push(chars.next()?);
        }
        Some(out)
    }
}

/// One gold annotation node.
#[derive(Debug, Clone)]
pub struct GoldNode {
    /// Handle
    pub id: NodeId,
    /// Element name (e.g. `ORG`, `PER`, `NP`)
    pub tag: String,
    /// Owning document
    pub document: DocId,
    /// Parent node; `None` for direct children of the document
    pub parent: Option<NodeId>,
    /// Nesting depth below the document (0 for direct children)
    pub depth: usize,
    /// Full span, if the node carries `char_start`/`char_end`
    pub span: Option<(usize, usize)>,
    /// Head span, if the node carries `head_char_start`/`head_char_end`
    pub head_span: Option<(usize, usize)>,
    attributes: BTreeMap<String, String>,
    children: Vec<NodeId>,
    boundary_matches: Vec<PredictionId>,
    head_matches: Vec<PredictionId>,
}

impl GoldNode {
    /// Raw attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attribute value, or [`Error::MissingAttribute`].
    pub fn require_attribute(&self, name: &str) -> Result<&str> {
        self.attribute(name)
            .ok_or_else(|| Error::missing_attribute(self.label(), name))
    }

    /// All attributes.
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// `entity_type` attribute.
    #[must_use]
    pub fn entity_type(&self) -> Option<&str> {
        self.attribute(ENTITY_TYPE)
    }

    /// `head_text` attribute.
    #[must_use]
    pub fn head_text(&self) -> Option<&str> {
        self.attribute(HEAD_TEXT)
    }

    /// Child nodes in document order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Predictions whose full span matched this node.
    #[must_use]
    pub fn boundary_matches(&self) -> &[PredictionId] {
        &self.boundary_matches
    }

    /// Predictions whose head span matched this node's head.
    #[must_use]
    pub fn head_matches(&self) -> &[PredictionId] {
        &self.head_matches
    }

    /// `TAG#index`, for diagnostics.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}#{}", self.tag, self.id.0)
    }
}

/// Arena holding every gold document and node of a corpus.
#[derive(Debug, Clone, Default)]
pub struct GoldTree {
    documents: Vec<Document>,
    nodes: Vec<GoldNode>,
}

impl GoldTree {
    /// Empty corpus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document.
    pub fn add_document(
        &mut self,
        text: impl Into<String>,
        attributes: BTreeMap<String, String>,
    ) -> DocId {
        let id = DocId(self.documents.len());
        self.documents.push(Document {
            id,
            text: text.into(),
            attributes,
            nodes: Vec::new(),
        });
        id
    }

    /// Append a node under `parent` (or directly under the document).
    ///
    /// Span attributes are parsed here; a present but non-integer offset is a
    /// parse error. Nodes must be added in document order.
    pub fn add_node(
        &mut self,
        document: DocId,
        parent: Option<NodeId>,
        tag: impl Into<String>,
        attributes: BTreeMap<String, String>,
    ) -> Result<NodeId> {
        let tag = tag.into();
        if document.0 >= self.documents.len() {
            return Err(Error::invalid_input(format!(
                "document {} does not exist",
                document.0
            )));
        }
        let depth = match parent {
            Some(p) => {
                let parent_node = self.nodes.get(p.0).ok_or_else(|| {
                    Error::invalid_input(format!("parent node {} does not exist", p.0))
                })?;
                if parent_node.document != document {
                    return Err(Error::invalid_input(format!(
                        "parent {} belongs to another document",
                        parent_node.label()
                    )));
                }
                parent_node.depth + 1
            }
            None => 0,
        };

        let id = NodeId(self.nodes.len());
        let span = parse_span(&tag, id, &attributes, CHAR_START, CHAR_END)?;
        let head_span = parse_span(&tag, id, &attributes, HEAD_CHAR_START, HEAD_CHAR_END)?;

        self.nodes.push(GoldNode {
            id,
            tag,
            document,
            parent,
            depth,
            span,
            head_span,
            attributes,
            children: Vec::new(),
            boundary_matches: Vec::new(),
            head_matches: Vec::new(),
        });
        if let Some(p) = parent {
            self.nodes[p.0].children.push(id);
        }
        self.documents[document.0].nodes.push(id);
        Ok(id)
    }

    /// Number of documents.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Number of nodes across all documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the corpus has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Documents in corpus order.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Document by handle.
    #[must_use]
    pub fn document(&self, id: DocId) -> &Document {
        &self.documents[id.0]
    }

    /// All nodes in document order.
    #[must_use]
    pub fn nodes(&self) -> &[GoldNode] {
        &self.nodes
    }

    /// Node by handle.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &GoldNode {
        &self.nodes[id.0]
    }

    /// Parent node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<&GoldNode> {
        self.node(id).parent.map(|p| self.node(p))
    }

    /// Element name of the parent; [`DOCUMENT_TAG`] for top-level nodes.
    #[must_use]
    pub fn parent_tag(&self, id: NodeId) -> &str {
        self.parent(id)
            .map_or(DOCUMENT_TAG, |parent| parent.tag.as_str())
    }

    /// Ancestors from the parent up to the top-level node.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &GoldNode> {
        std::iter::successors(self.parent(id), move |n| self.parent(n.id))
    }

    /// Document the node belongs to.
    #[must_use]
    pub fn parent_document(&self, id: NodeId) -> &Document {
        self.document(self.node(id).document)
    }

    /// Text covered by the node's full span.
    #[must_use]
    pub fn span_text(&self, id: NodeId) -> Option<String> {
        let (start, end) = self.node(id).span?;
        self.parent_document(id).slice(start, end)
    }

    /// Nodes anywhere in the corpus satisfying `query`.
    #[must_use]
    pub fn select(&self, query: &NodeQuery) -> Vec<NodeId> {
        self.select_by(|tree, node| query.matches(tree, node))
    }

    /// Nodes of one document satisfying `query`.
    #[must_use]
    pub fn select_in(&self, document: DocId, query: &NodeQuery) -> Vec<NodeId> {
        self.document(document)
            .nodes
            .iter()
            .copied()
            .filter(|&id| query.matches(self, self.node(id)))
            .collect()
    }

    /// Nodes anywhere in the corpus satisfying an arbitrary predicate.
    pub fn select_by<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&GoldTree, &GoldNode) -> bool,
    {
        self.nodes
            .iter()
            .filter(|node| predicate(self, node))
            .map(|node| node.id)
            .collect()
    }

    pub(crate) fn record_boundary_match(&mut self, node: NodeId, prediction: PredictionId) {
        self.nodes[node.0].boundary_matches.push(prediction);
    }

    pub(crate) fn record_head_match(&mut self, node: NodeId, prediction: PredictionId) {
        self.nodes[node.0].head_matches.push(prediction);
    }

    /// Forget every recorded match.
    pub fn clear_matches(&mut self) {
        for node in &mut self.nodes {
            node.boundary_matches.clear();
            node.head_matches.clear();
        }
    }
}

fn parse_span(
    tag: &str,
    id: NodeId,
    attributes: &BTreeMap<String, String>,
    start_attr: &str,
    end_attr: &str,
) -> Result<Option<(usize, usize)>> {
    let (Some(start), Some(end)) = (attributes.get(start_attr), attributes.get(end_attr)) else {
        return Ok(None);
    };
    let parse = |attr: &str, raw: &str| {
        raw.trim().parse::<usize>().map_err(|_| {
            Error::parse(format!(
                "{}#{}: attribute {}='{}' is not a non-negative integer",
                tag, id.0, attr, raw
            ))
        })
    };
    Ok(Some((parse(start_attr, start)?, parse(end_attr, end)?)))
}
