//! JSONL prediction records.
//!
//! Each non-blank line is one document: a JSON array of spans.
//!
//! ```json
//! [{"text": "Anna Muster", "start_pos": 0, "end_pos": 11,
//!   "labels": [{"value": "ent:per;val:ind", "confidence": 0.93}],
//!   "head": {"text": "Muster", "start_pos": 5, "end_pos": 11,
//!            "labels": [{"value": "head", "confidence": 0.88}]}}]
//! ```
//!
//! Only the first label is read. Ids are `{document}_{index}`, heads get a
//! `_head` suffix. A head's own label value is ignored; it carries the single
//! tag `head` with an empty value.

use std::path::Path;

use serde::Deserialize;

use crate::annotation::{parse_tags, prediction_label, Annotation, Predictions};
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct RawLabel {
    value: String,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct RawSpan {
    text: String,
    start_pos: usize,
    end_pos: usize,
    labels: Vec<RawLabel>,
    #[serde(default)]
    head: Option<Box<RawSpan>>,
}

impl RawSpan {
    fn first_label(&self, id: &str) -> Result<&RawLabel> {
        self.labels
            .first()
            .ok_or_else(|| Error::parse(format!("prediction {} has no labels", id)))
    }

    fn into_annotation(self, id: String) -> Result<Annotation> {
        let label = self.first_label(&id)?;
        let tags = parse_tags(&label.value)
            .map_err(|e| Error::parse(format!("prediction {}: {}", id, e)))?;
        let confidence = label.confidence;

        let head = match self.head {
            Some(raw) => {
                let confidence = raw.first_label(&format!("{}_head", id))?.confidence;
                Some(Annotation::head_of(&id, raw.text, raw.start_pos, raw.end_pos, confidence))
            }
            None => None,
        };

        let annotation = Annotation::new(id, self.text, self.start_pos, self.end_pos, tags, confidence);
        Ok(match head {
            Some(head) => annotation.with_head(head),
            None => annotation,
        })
    }
}

/// Parse JSONL prediction records from a string.
///
/// Blank lines are skipped and do not count as documents.
pub fn parse_predictions(content: &str) -> Result<Predictions> {
    let mut predictions = Predictions::new();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let spans: Vec<RawSpan> = serde_json::from_str(line).map_err(|e| {
            Error::parse(format!("Failed to parse JSONL line {}: {}", line_num + 1, e))
        })?;

        let doc = predictions.document_count();
        let annotations = spans
            .into_iter()
            .enumerate()
            .map(|(idx, span)| span.into_annotation(prediction_label(doc, idx)))
            .collect::<Result<Vec<_>>>()?;
        log::debug!("line {}: {} predictions", line_num + 1, annotations.len());
        predictions.push_document(annotations);
    }
    log::info!(
        "loaded {} predictions in {} documents",
        predictions.len(),
        predictions.document_count()
    );
    Ok(predictions)
}

/// Load JSONL prediction records from a file.
pub fn load_predictions<P: AsRef<Path>>(path: P) -> Result<Predictions> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(Error::Io)?;
    parse_predictions(&content)
}
