//! # nesteval
//!
//! Evaluation of nested named-entity predictions against a hierarchical gold
//! corpus.
//!
//! - **Matching**: exact character-span alignment, separately for full spans
//!   and head spans, many-to-many
//! - **Categories**: named evaluation slices combining a prediction tag filter
//!   with a structural gold query
//! - **Scoring**: boundary-only, head-boundary-only and boundary+type
//!   precision/recall/F1 with a gold-weighted average, plus recall grouped by
//!   arbitrary keys (node tag, parent tag, depth)
//! - **Breakdowns**: scores by span length bucket and by nesting depth
//!
//! ## Quick Start
//!
//! ```rust
//! use nesteval::category::CategorySet;
//! use nesteval::eval::{evaluate, CoarseTypeComparator};
//! use nesteval::loader::{parse_gold_xml, parse_predictions};
//!
//! let mut gold = parse_gold_xml(
//!     r#"<Corpus><Document document_text="Anna Muster in Bern">
//!          <PER char_start="0" char_end="11" entity_type="per_ind"/>
//!          <GPE char_start="15" char_end="19" entity_type="gpe"/>
//!        </Document></Corpus>"#,
//! )?;
//! let mut preds = parse_predictions(
//!     r#"[{"text": "Anna Muster", "start_pos": 0, "end_pos": 11, "labels": [{"value": "ent:per", "confidence": 0.9}]}]"#,
//! )?;
//!
//! let result = evaluate(&mut preds, &mut gold, &CategorySet::benasch(), &CoarseTypeComparator::default())?;
//! assert_eq!(result.typed.get("Persons").unwrap().f1, 1.0);
//! assert_eq!(result.typed.get("GPEs").unwrap().recall, 0.0);
//! # Ok::<(), nesteval::Error>(())
//! ```
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`annotation`] | predicted spans, tag parsing, the prediction arena |
//! | [`gold`] | gold document/node arena |
//! | [`query`] | structural gold node queries |
//! | [`category`] | evaluation categories and partitioning |
//! | [`config`] | TOML configuration |
//! | [`matcher`] | exact-span matcher |
//! | [`eval`] | scoring, breakdowns, error sampling |
//! | [`loader`] | XML gold and JSONL prediction readers |
//! | [`report`] | text and JSON rendering |

#![warn(missing_docs)]

pub mod annotation;
pub mod category;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
mod error;
pub mod eval;
pub mod gold;
pub mod loader;
pub mod matcher;
pub mod query;
pub mod report;

pub use error::{Error, Result};

/// Common imports.
pub mod prelude {
    pub use crate::annotation::{Annotation, PredictionId, Predictions, Tags};
    pub use crate::category::{Category, CategorySet, Partition};
    pub use crate::config::EvalConfig;
    pub use crate::eval::{
        evaluate, Aggregator, CoarseTypeComparator, Comparator, Evaluation, ScoreMode,
        ScoreReport, Scorer,
    };
    pub use crate::gold::{DocId, GoldNode, GoldTree, NodeId};
    pub use crate::matcher::{MatchSummary, SpanMatcher};
    pub use crate::query::NodeQuery;
    pub use crate::{Error, Result};
}
