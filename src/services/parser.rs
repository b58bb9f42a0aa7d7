// src/services/parser.rs

//! Index document parsing and schema validation.
//!
//! A feed index is a single JSON object mapping canteen names to their
//! data-feed URLs (or null for "known, but no feed yet"). Anything else is
//! rejected; validation stops at the first violation.

use serde_json::Value;
use thiserror::Error;

use crate::models::ValidationKind;

/// A validated index: canteen name to optional meta URL, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedIndex {
    entries: Vec<(String, Option<String>)>,
}

impl FeedIndex {
    /// Entries in document order.
    pub fn entries(&self) -> &[(String, Option<String>)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A rejected index document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// Body was not parseable JSON
    #[error("no JSON: {0}")]
    NoJson(String),

    /// JSON was well-formed but not a name-to-URL mapping
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
}

impl IndexError {
    pub fn kind(&self) -> ValidationKind {
        match self {
            IndexError::NoJson(_) => ValidationKind::NoJson,
            IndexError::InvalidJson(_) => ValidationKind::InvalidJson,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            IndexError::NoJson(message) | IndexError::InvalidJson(message) => message,
        }
    }
}

/// Decode and validate an index document.
pub fn parse_index(data: &[u8]) -> Result<FeedIndex, IndexError> {
    // from_slice rejects trailing garbage, so partial documents fail here.
    let value: Value =
        serde_json::from_slice(data).map_err(|e| IndexError::NoJson(e.to_string()))?;

    let Value::Object(object) = value else {
        return Err(IndexError::InvalidJson("Index must be an object".into()));
    };

    let mut entries = Vec::with_capacity(object.len());
    for (name, value) in object {
        let url = match value {
            Value::String(url) => Some(url),
            Value::Null => None,
            _ => {
                return Err(IndexError::InvalidJson(
                    "URL must be a string or null".into(),
                ));
            }
        };
        entries.push((name, url));
    }
    Ok(FeedIndex { entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_index() {
        let index = parse_index(
            br#"{"test": "http://example.org/test.xml",
                 "test2": null}"#,
        )
        .unwrap();

        assert_eq!(
            index.entries(),
            &[
                (
                    "test".to_string(),
                    Some("http://example.org/test.xml".to_string())
                ),
                ("test2".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_empty_index() {
        let index = parse_index(b"{}").unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_document_order_preserved() {
        let index = parse_index(br#"{"z": null, "a": null, "m": null}"#).unwrap();
        let names: Vec<&str> = index.entries().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_trailing_garbage_is_no_json() {
        let error = parse_index(br#"{"test": "http://example.org/test.xml"}{"#).unwrap_err();
        assert_eq!(error.kind(), ValidationKind::NoJson);
    }

    #[test]
    fn test_garbled_body_is_no_json() {
        let error = parse_index(b"not json at all").unwrap_err();
        assert_eq!(error.kind(), ValidationKind::NoJson);
    }

    #[test]
    fn test_number_value_rejected() {
        let error = parse_index(br#"{"test": 4}"#).unwrap_err();
        assert_eq!(error.kind(), ValidationKind::InvalidJson);
        assert_eq!(error.message(), "URL must be a string or null");
    }

    #[test]
    fn test_nested_object_value_rejected() {
        let error = parse_index(br#"{"test": {"test": "http://test.xml"}}"#).unwrap_err();
        assert_eq!(error.kind(), ValidationKind::InvalidJson);
        assert_eq!(error.message(), "URL must be a string or null");
    }

    #[test]
    fn test_array_value_rejected() {
        let error = parse_index(br#"{"test": ["http://test.xml"]}"#).unwrap_err();
        assert_eq!(error.kind(), ValidationKind::InvalidJson);
        assert_eq!(error.message(), "URL must be a string or null");
    }

    #[test]
    fn test_non_object_document_rejected() {
        let error = parse_index(b"[1, 2]").unwrap_err();
        assert_eq!(error.kind(), ValidationKind::InvalidJson);
        assert_eq!(error.message(), "Index must be an object");
    }
}
