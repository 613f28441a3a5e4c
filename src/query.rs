//! Typed structural queries over the gold tree.
//!
//! A [`NodeQuery`] selects gold nodes by element name, parent element name
//! and attribute predicates. It deserializes from category configuration:
//!
//! ```toml
//! gold = { attribute_prefix = { name = "entity_type", prefix = "per" } }
//! gold = { all = [{ tag = "PER" }, { not = { parent_tag = "ORG" } }] }
//! gold = "any"
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::gold::{GoldNode, GoldTree};

/// Predicate over a gold node in its tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeQuery {
    /// Every node.
    Any,
    /// Element name equals.
    Tag(String),
    /// Parent element name equals (`Document` for top-level nodes).
    ParentTag(String),
    /// Attribute is present.
    HasAttribute(String),
    /// Attribute is present and equal to `value`.
    AttributeEquals {
        /// Attribute name
        name: String,
        /// Required value
        value: String,
    },
    /// Attribute is present and starts with `prefix`.
    AttributePrefix {
        /// Attribute name
        name: String,
        /// Required prefix
        prefix: String,
    },
    /// Every sub-query holds.
    All(Vec<NodeQuery>),
    /// At least one sub-query holds.
    AnyOf(Vec<NodeQuery>),
    /// The sub-query does not hold.
    Not(Box<NodeQuery>),
}

impl NodeQuery {
    /// Nodes whose `name` attribute starts with `prefix`.
    #[must_use]
    pub fn attribute_prefix(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        NodeQuery::AttributePrefix {
            name: name.into(),
            prefix: prefix.into(),
        }
    }

    /// Nodes whose `name` attribute equals `value`.
    #[must_use]
    pub fn attribute_equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        NodeQuery::AttributeEquals {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Nodes with element name `tag`.
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        NodeQuery::Tag(tag.into())
    }

    /// Evaluate against `node`.
    #[must_use]
    pub fn matches(&self, tree: &GoldTree, node: &GoldNode) -> bool {
        match self {
            NodeQuery::Any => true,
            NodeQuery::Tag(tag) => node.tag == *tag,
            NodeQuery::ParentTag(tag) => tree.parent_tag(node.id) == tag.as_str(),
            NodeQuery::HasAttribute(name) => node.attribute(name).is_some(),
            NodeQuery::AttributeEquals { name, value } => {
                node.attribute(name) == Some(value.as_str())
            }
            NodeQuery::AttributePrefix { name, prefix } => node
                .attribute(name)
                .is_some_and(|v| v.starts_with(prefix.as_str())),
            NodeQuery::All(queries) => queries.iter().all(|q| q.matches(tree, node)),
            NodeQuery::AnyOf(queries) => queries.iter().any(|q| q.matches(tree, node)),
            NodeQuery::Not(query) => !query.matches(tree, node),
        }
    }
}

/// Renders as an XPath-like predicate, for logs.
impl fmt::Display for NodeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeQuery::Any => write!(f, "*"),
            NodeQuery::Tag(tag) => write!(f, "self::{}", tag),
            NodeQuery::ParentTag(tag) => write!(f, "parent::{}", tag),
            NodeQuery::HasAttribute(name) => write!(f, "@{}", name),
            NodeQuery::AttributeEquals { name, value } => write!(f, "@{}='{}'", name, value),
            NodeQuery::AttributePrefix { name, prefix } => {
                write!(f, "starts-with(@{},'{}')", name, prefix)
            }
            NodeQuery::All(queries) => join(f, queries, " and "),
            NodeQuery::AnyOf(queries) => join(f, queries, " or "),
            NodeQuery::Not(query) => write!(f, "not({})", query),
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, queries: &[NodeQuery], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, q) in queries.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", q)?;
    }
    write!(f, ")")
}
