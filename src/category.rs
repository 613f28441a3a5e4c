//! Evaluation categories and the category filter.
//!
//! A [`Category`] pairs a tag predicate on predictions with a structural
//! query on gold nodes. [`CategorySet::partition`] applies every category to
//! the whole run. Categories are independent, so a prediction or node may land
//! in several of them (an `Organizations` and an `AllEntities` category can
//! coexist).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::annotation::{Annotation, PredictionId, Predictions, Tags};
use crate::gold::{GoldTree, NodeId, ENTITY_TYPE};
use crate::query::NodeQuery;
use crate::{Error, Result};

/// One named evaluation category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Report name
    pub name: String,
    /// Predictions must carry every one of these tags with the same value
    #[serde(default)]
    pub tags: Tags,
    /// Gold nodes belonging to this category
    pub gold: NodeQuery,
}

impl Category {
    /// Create a category.
    #[must_use]
    pub fn new(name: impl Into<String>, tags: Tags, gold: NodeQuery) -> Self {
        Self {
            name: name.into(),
            tags,
            gold,
        }
    }

    /// Category keyed on one tag, selecting gold nodes whose `entity_type`
    /// starts with `prefix`.
    #[must_use]
    pub fn entity_prefix(name: impl Into<String>, tag_key: &str, prefix: &str) -> Self {
        let mut tags = Tags::new();
        tags.insert(tag_key.to_string(), prefix.to_string());
        Self::new(name, tags, NodeQuery::attribute_prefix(ENTITY_TYPE, prefix))
    }

    /// Does the prediction pass this category's tag predicate?
    #[must_use]
    pub fn accepts(&self, prediction: &Annotation) -> bool {
        prediction.satisfies(&self.tags)
    }
}

/// Ordered collection of categories; order is report order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySet {
    categories: Vec<Category>,
}

impl CategorySet {
    /// Build from categories; names must be unique.
    pub fn new(categories: Vec<Category>) -> Result<Self> {
        let mut seen = HashSet::new();
        for category in &categories {
            if !seen.insert(category.name.as_str()) {
                return Err(Error::config(format!(
                    "duplicate category name '{}'",
                    category.name
                )));
            }
            if category.name == crate::eval::WEIGHTED_AVG {
                return Err(Error::config(format!(
                    "'{}' is reserved for the weighted average",
                    crate::eval::WEIGHTED_AVG
                )));
            }
        }
        Ok(Self { categories })
    }

    /// The BeNASch entity categories: persons, organizations, locations and
    /// geopolitical entities, keyed on the `ent` tag.
    #[must_use]
    pub fn benasch() -> Self {
        Self {
            categories: vec![
                Category::entity_prefix("Persons", "ent", "per"),
                Category::entity_prefix("Organizations", "ent", "org"),
                Category::entity_prefix("Locations", "ent", "loc"),
                Category::entity_prefix("GPEs", "ent", "gpe"),
            ],
        }
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// True if there are no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Categories in order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    /// Gold queries of all categories, in order.
    pub fn queries(&self) -> impl Iterator<Item = &NodeQuery> {
        self.categories.iter().map(|c| &c.gold)
    }

    /// Split the run into per-category prediction and gold subsets.
    ///
    /// Gold queries run over the whole corpus, not per document.
    #[must_use]
    pub fn partition(&self, predictions: &Predictions, gold: &GoldTree) -> Partition {
        let slices = self
            .categories
            .iter()
            .map(|category| {
                let preds: Vec<PredictionId> = predictions
                    .iter()
                    .filter(|(_, p)| category.accepts(p))
                    .map(|(id, _)| id)
                    .collect();
                let nodes = gold.select(&category.gold);
                log::info!(
                    "category {}: {} predictions, {} gold ({})",
                    category.name,
                    preds.len(),
                    nodes.len(),
                    category.gold
                );
                CategorySlice {
                    name: category.name.clone(),
                    predictions: preds,
                    gold: nodes,
                }
            })
            .collect();
        Partition { slices }
    }
}

impl<'a> IntoIterator for &'a CategorySet {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.iter()
    }
}

/// Predictions and gold nodes of one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySlice {
    /// Category name
    pub name: String,
    /// Predictions passing the tag predicate
    pub predictions: Vec<PredictionId>,
    /// Gold nodes selected by the structural query
    pub gold: Vec<NodeId>,
}

/// Output of the category filter, in category order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    slices: Vec<CategorySlice>,
}

impl Partition {
    /// Build directly from slices.
    #[must_use]
    pub fn from_slices(slices: Vec<CategorySlice>) -> Self {
        Self { slices }
    }

    /// Slices in category order.
    #[must_use]
    pub fn slices(&self) -> &[CategorySlice] {
        &self.slices
    }

    /// Slice by category name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CategorySlice> {
        self.slices.iter().find(|s| s.name == name)
    }

    /// Total gold count over all categories (nodes in several categories
    /// count once per category).
    #[must_use]
    pub fn total_gold(&self) -> usize {
        self.slices.iter().map(|s| s.gold.len()).sum()
    }
}
