//! Swappable comparison and aggregation strategies for the scoring engine.
//!
//! A [`Comparator`] decides whether a matched prediction agrees with a gold
//! node (typically: same coarse type). An [`Aggregator`] maps a gold node to
//! a bucket key for per-bucket recall. Closures implement both traits:
//!
//! ```rust
//! use nesteval::annotation::Annotation;
//! use nesteval::eval::strategy::{Aggregator, Comparator};
//! use nesteval::gold::{GoldNode, GoldTree};
//!
//! let same_text = |_: &GoldNode, p: &Annotation| !p.text.is_empty();
//! let by_tag = |_: &GoldTree, n: &GoldNode| n.tag.clone();
//! # fn takes<C: Comparator, A: Aggregator>(_: &C, _: &A) {}
//! # takes(&same_text, &by_tag);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;
use crate::gold::{GoldNode, GoldTree, ENTITY_TYPE};
use crate::{Error, Result};

/// Type agreement between a gold node and a matched prediction.
pub trait Comparator {
    /// Does `prediction` agree with `gold`?
    ///
    /// Errors when an attribute or tag the comparison needs is missing.
    fn agrees(&self, gold: &GoldNode, prediction: &Annotation) -> Result<bool>;
}

impl<F> Comparator for F
where
    F: Fn(&GoldNode, &Annotation) -> bool,
{
    fn agrees(&self, gold: &GoldNode, prediction: &Annotation) -> Result<bool> {
        Ok(self(gold, prediction))
    }
}

/// Bucket key of a gold node for aggregated recall.
pub trait Aggregator {
    /// Key type; ordered so reports are deterministic.
    type Key: Ord + Clone + fmt::Display;

    /// Key of `node`.
    fn key(&self, tree: &GoldTree, node: &GoldNode) -> Result<Self::Key>;
}

impl<F, K> Aggregator for F
where
    F: Fn(&GoldTree, &GoldNode) -> K,
    K: Ord + Clone + fmt::Display,
{
    type Key = K;

    fn key(&self, tree: &GoldTree, node: &GoldNode) -> Result<K> {
        Ok(self(tree, node))
    }
}

/// Compares the first segment of a gold attribute with a prediction tag.
///
/// With the defaults, gold `entity_type="per_name"` agrees with a prediction
/// tagged `ent:per`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoarseTypeComparator {
    /// Gold attribute holding the fine type
    pub gold_attribute: String,
    /// Separator; the segment before it is the coarse type
    pub separator: String,
    /// Prediction tag holding the coarse type
    pub tag_key: String,
}

impl Default for CoarseTypeComparator {
    fn default() -> Self {
        Self {
            gold_attribute: ENTITY_TYPE.to_string(),
            separator: "_".to_string(),
            tag_key: "ent".to_string(),
        }
    }
}

impl CoarseTypeComparator {
    /// Coarse type of a gold node, if it has the attribute.
    #[must_use]
    pub fn gold_kind<'a>(&self, gold: &'a GoldNode) -> Option<&'a str> {
        gold.attribute(&self.gold_attribute).map(|v| self.coarse(v))
    }

    /// Coarse type of a prediction, if it has the tag.
    #[must_use]
    pub fn prediction_kind<'a>(&self, prediction: &'a Annotation) -> Option<&'a str> {
        prediction.tag(&self.tag_key)
    }

    fn coarse<'a>(&self, value: &'a str) -> &'a str {
        if self.separator.is_empty() {
            return value;
        }
        value.split(self.separator.as_str()).next().unwrap_or(value)
    }
}

impl Comparator for CoarseTypeComparator {
    fn agrees(&self, gold: &GoldNode, prediction: &Annotation) -> Result<bool> {
        let kind = gold.require_attribute(&self.gold_attribute).map(|v| self.coarse(v))?;
        let tag = prediction
            .tag(&self.tag_key)
            .ok_or_else(|| Error::missing_tag(prediction.id.as_str(), self.tag_key.as_str()))?;
        Ok(kind == tag)
    }
}

/// Buckets by element name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeTag;

impl Aggregator for NodeTag {
    type Key = String;

    fn key(&self, _tree: &GoldTree, node: &GoldNode) -> Result<String> {
        Ok(node.tag.clone())
    }
}

/// Element name of a node together with its parent's.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagPair {
    /// Node element name
    pub tag: String,
    /// Parent element name (`Document` at top level)
    pub parent: String,
}

impl fmt::Display for TagPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} < {}", self.tag, self.parent)
    }
}

/// Buckets by `(element name, parent element name)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeAndParentTag;

impl Aggregator for NodeAndParentTag {
    type Key = TagPair;

    fn key(&self, tree: &GoldTree, node: &GoldNode) -> Result<TagPair> {
        Ok(TagPair {
            tag: node.tag.clone(),
            parent: tree.parent_tag(node.id).to_string(),
        })
    }
}

/// Buckets by nesting depth below the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeDepth;

impl Aggregator for NodeDepth {
    type Key = usize;

    fn key(&self, _tree: &GoldTree, node: &GoldNode) -> Result<usize> {
        Ok(node.depth)
    }
}

/// Buckets by the value of a gold attribute; missing attributes are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValue(pub String);

impl Aggregator for AttributeValue {
    type Key = String;

    fn key(&self, _tree: &GoldTree, node: &GoldNode) -> Result<String> {
        node.require_attribute(&self.0).map(str::to_string)
    }
}
