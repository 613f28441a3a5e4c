//! Readers for the on-disk corpus formats.
//!
//! - [`gold`]: XML corpus, one `Document` element per document, nested
//!   annotation elements below it.
//! - [`predictions`]: JSONL, one JSON array of predicted spans per line.
//!
//! Both sides are positionally aligned: the n-th `Document` is scored against
//! the n-th prediction record.

pub mod gold;
pub mod predictions;

pub use gold::{load_gold_xml, parse_gold_xml};
pub use predictions::{load_predictions, parse_predictions};
