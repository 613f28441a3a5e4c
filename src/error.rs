//! Error types for nesteval.

use thiserror::Error;

/// Result type for nesteval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for nesteval operations.
///
/// Malformed inputs abort the run. The only recovered failure in the
/// scoring path is a zero denominator, which yields `0.0` instead of an error.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error (tag strings, JSONL records, XML, offsets).
    #[error("Parse error: {0}")]
    Parse(String),

    /// A gold node lacks an attribute a comparator or aggregator needs.
    #[error("Gold node {node} has no attribute '{attribute}'")]
    MissingAttribute {
        /// Node tag and index, for locating it in the corpus
        node: String,
        /// Attribute name that was read
        attribute: String,
    },

    /// A prediction lacks a tag a comparator needs.
    #[error("Prediction {prediction} has no tag '{key}'")]
    MissingTag {
        /// Prediction id (`{doc}_{idx}`)
        prediction: String,
        /// Tag key that was read
        key: String,
    },

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Category configuration error.
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a missing attribute error.
    pub fn missing_attribute(node: impl Into<String>, attribute: impl Into<String>) -> Self {
        Error::MissingAttribute {
            node: node.into(),
            attribute: attribute.into(),
        }
    }

    /// Create a missing tag error.
    pub fn missing_tag(prediction: impl Into<String>, key: impl Into<String>) -> Self {
        Error::MissingTag {
            prediction: prediction.into(),
            key: key.into(),
        }
    }
}
