//! Canonical output records and the deterministic merge of partial results.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PipelineError;
use crate::document::Document;

/// Metric fields produced by one stage for one document.
pub type Partial = BTreeMap<String, Value>;

/// How key collisions between partial results are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// The later partial overwrites the earlier value.
    #[default]
    LastWriteWins,
    /// A later partial writing a different value to an existing key is an
    /// error. Rewriting an identical value is allowed.
    DetectConflicts,
}

/// One merged output record: the text under its configured key, then every
/// other key in lexicographic order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub text_key: String,
    pub text: String,
    pub fields: BTreeMap<String, Value>,
}

impl ScoreRecord {
    pub fn new(text_key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text_key: text_key.into(),
            text: text.into(),
            fields: BTreeMap::new(),
        }
    }

    /// The original record of a validated document.
    pub fn from_document(doc: &Document, text_key: &str) -> Self {
        Self {
            text_key: text_key.to_string(),
            text: doc.text.clone(),
            fields: doc.extra.clone(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Keys in serialized order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.text_key.as_str()).chain(self.fields.keys().map(String::as_str))
    }
}

impl Serialize for ScoreRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(&self.text_key, &self.text)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Apply `partials` to `original` in order.
///
/// The text is never altered: a partial may repeat it verbatim, any other
/// value under the text key is a [`PipelineError::MergeConflict`] in both
/// modes. Merging the same partials twice yields the same record.
pub fn merge(
    original: &ScoreRecord,
    partials: &[Partial],
    mode: MergeMode,
) -> Result<ScoreRecord, PipelineError> {
    let mut merged = original.clone();
    for partial in partials {
        for (key, value) in partial {
            if *key == merged.text_key {
                if value.as_str() != Some(merged.text.as_str()) {
                    return Err(PipelineError::MergeConflict { key: key.clone() });
                }
                continue;
            }
            match mode {
                MergeMode::LastWriteWins => {
                    merged.fields.insert(key.clone(), value.clone());
                }
                MergeMode::DetectConflicts => match merged.fields.get(key) {
                    Some(existing) if existing != value => {
                        return Err(PipelineError::MergeConflict { key: key.clone() });
                    }
                    Some(_) => {}
                    None => {
                        merged.fields.insert(key.clone(), value.clone());
                    }
                },
            }
        }
    }
    Ok(merged)
}
