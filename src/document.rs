//! Explicit document schema, validated at ingress.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PipelineError;

/// Stable document identifier. Keeps the input representation on output.
///
/// Integers order before strings, in numeric order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocId {
    Int(i64),
    /// Only integers above `i64::MAX`.
    UInt(u64),
    Str(String),
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocId::Int(v) => write!(f, "{v}"),
            DocId::UInt(v) => write!(f, "{v}"),
            DocId::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<&DocId> for Value {
    fn from(id: &DocId) -> Self {
        match id {
            DocId::Int(v) => Value::from(*v),
            DocId::UInt(v) => Value::from(*v),
            DocId::Str(v) => Value::from(v.as_str()),
        }
    }
}

impl From<i64> for DocId {
    fn from(value: i64) -> Self {
        DocId::Int(value)
    }
}

impl From<u64> for DocId {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(v) => DocId::Int(v),
            Err(_) => DocId::UInt(value),
        }
    }
}

impl From<&str> for DocId {
    fn from(value: &str) -> Self {
        DocId::Str(value.to_string())
    }
}

/// Names of the record keys holding the text and the identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FieldNames {
    pub text: String,
    pub id: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            text: "text".to_string(),
            id: "id".to_string(),
        }
    }
}

/// One validated input record.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocId,
    pub text: String,
    /// Every other key of the input record, untouched.
    pub extra: BTreeMap<String, Value>,
}

impl Document {
    /// Validate one record. `index` is its position in the batch and is
    /// only used for error reporting.
    pub fn from_value(
        index: usize,
        value: Value,
        fields: &FieldNames,
    ) -> Result<Self, PipelineError> {
        let invalid = |field: &str, reason: &str| PipelineError::Validation {
            index,
            field: field.to_string(),
            reason: reason.to_string(),
        };

        let Value::Object(map) = value else {
            return Err(invalid("<record>", "record must be a JSON object"));
        };
        let mut extra: BTreeMap<String, Value> = map.into_iter().collect();

        let text = match extra.remove(&fields.text) {
            Some(Value::String(text)) => text,
            Some(_) => return Err(invalid(&fields.text, "text must be a string")),
            None => return Err(invalid(&fields.text, "missing text field")),
        };

        let id = match extra.get(&fields.id) {
            Some(Value::String(s)) => DocId::Str(s.clone()),
            Some(Value::Number(n)) => match (n.as_i64(), n.as_u64()) {
                (Some(v), _) => DocId::Int(v),
                (None, Some(v)) => DocId::UInt(v),
                (None, None) => {
                    return Err(invalid(&fields.id, "numeric id must be an integer"));
                }
            },
            Some(_) => return Err(invalid(&fields.id, "id must be a string or an integer")),
            None => return Err(invalid(&fields.id, "missing id field")),
        };

        Ok(Self { id, text, extra })
    }
}

/// Validate a whole batch before any work starts. Ids must be unique.
pub fn validate_batch(
    records: Vec<Value>,
    fields: &FieldNames,
) -> Result<Vec<Document>, PipelineError> {
    let mut seen: HashMap<DocId, usize> = HashMap::with_capacity(records.len());
    let mut docs = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let doc = Document::from_value(index, record, fields)?;
        if let Some(first) = seen.insert(doc.id.clone(), index) {
            return Err(PipelineError::Validation {
                index,
                field: fields.id.clone(),
                reason: format!("duplicate id {} (first seen at record {first})", doc.id),
            });
        }
        docs.push(doc);
    }
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_int_and_string_ids() {
        let fields = FieldNames::default();
        let a = Document::from_value(0, json!({"id": 7, "text": "x"}), &fields).unwrap();
        let b = Document::from_value(1, json!({"id": "doc-7", "text": "y"}), &fields).unwrap();
        assert_eq!(a.id, DocId::Int(7));
        assert_eq!(b.id, DocId::Str("doc-7".into()));
        assert_eq!(a.extra.get("id"), Some(&json!(7)));
        assert!(!a.extra.contains_key("text"));
    }

    #[test]
    fn custom_field_names() {
        let fields = FieldNames {
            text: "content".into(),
            id: "uid".into(),
        };
        let doc = Document::from_value(0, json!({"uid": "a", "content": "hi", "lang": "zh"}), &fields)
            .unwrap();
        assert_eq!(doc.text, "hi");
        assert_eq!(doc.extra.get("lang"), Some(&json!("zh")));
    }

    #[test]
    fn missing_text_names_index_and_field() {
        let err = Document::from_value(3, json!({"id": 1}), &FieldNames::default()).unwrap_err();
        match err {
            PipelineError::Validation { index, field, .. } => {
                assert_eq!(index, 3);
                assert_eq!(field, "text");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_shapes() {
        let fields = FieldNames::default();
        for record in [
            json!("just text"),
            json!({"id": 1, "text": 5}),
            json!({"text": "x"}),
            json!({"id": 1.5, "text": "x"}),
            json!({"id": null, "text": "x"}),
        ] {
            assert!(matches!(
                Document::from_value(0, record, &fields),
                Err(PipelineError::Validation { .. })
            ));
        }
    }

    #[test]
    fn duplicate_ids_rejected() {
        let records = vec![
            json!({"id": 1, "text": "a"}),
            json!({"id": 2, "text": "b"}),
            json!({"id": 1, "text": "c"}),
        ];
        let err = validate_batch(records, &FieldNames::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Validation { index: 2, .. }));
    }

    #[test]
    fn int_and_string_ids_are_distinct() {
        let records = vec![json!({"id": 1, "text": "a"}), json!({"id": "1", "text": "b"})];
        assert_eq!(validate_batch(records, &FieldNames::default()).unwrap().len(), 2);
    }

    #[test]
    fn ids_order_ints_before_strings() {
        let mut ids = vec![DocId::from("a"), DocId::from(10i64), DocId::from(2i64)];
        ids.sort();
        assert_eq!(ids, vec![DocId::Int(2), DocId::Int(10), DocId::Str("a".into())]);
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"[2,10,"a"]"#);
    }

    #[test]
    fn ids_above_i64_max_accepted() {
        let fields = FieldNames::default();
        let big = u64::MAX;
        let doc = Document::from_value(0, json!({"id": big, "text": "x"}), &fields).unwrap();
        assert_eq!(doc.id, DocId::UInt(big));
        assert_eq!(Value::from(&doc.id), json!(big));
        assert_eq!(doc.id.to_string(), "18446744073709551615");

        let mut ids = vec![DocId::from(big), DocId::from("a"), DocId::from(5u64), DocId::from(-3i64)];
        ids.sort();
        assert_eq!(
            ids,
            vec![DocId::Int(-3), DocId::Int(5), DocId::UInt(big), DocId::Str("a".into())]
        );
        assert_eq!(
            serde_json::to_string(&ids).unwrap(),
            r#"[-3,5,18446744073709551615,"a"]"#
        );
    }
}
