//! Sketch and sketch-collection inputs
//!
//! A sketch is a user-drawn proposed protected area. Geometry never reaches
//! this crate; what arrives is the sketch's identity, its children (empty for
//! a leaf), and the user-supplied attribute bag from the drawing tool. List
//! attributes such as the declared activity set arrive JSON-encoded and are
//! decoded once, here, before any classification logic sees them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::core::errors::{Error, Result};

/// Attribute key carrying the sketch's declared activity codes
pub const ACTIVITIES_ATTRIB: &str = "ACTIVITIES";

/// A sketch or sketch collection, geometry stripped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sketch {
    /// Stable identifier
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Child sketches; empty for a leaf sketch
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Sketch>,

    /// User-supplied attributes, some values JSON-encoded lists
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

impl Sketch {
    /// Create a leaf sketch
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Create a collection from child sketches
    pub fn collection(id: impl Into<String>, children: Vec<Sketch>) -> Self {
        Self {
            id: id.into(),
            name: None,
            children,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn is_collection(&self) -> bool {
        !self.children.is_empty()
    }

    /// Leaf sketches: the children of a collection, or the sketch itself
    pub fn leaves(&self) -> Vec<&Sketch> {
        if self.is_collection() {
            self.children.iter().collect()
        } else {
            vec![self]
        }
    }

    /// Ids of the leaf sketches
    pub fn leaf_ids(&self) -> Vec<&str> {
        self.leaves().into_iter().map(|s| s.id.as_str()).collect()
    }

    /// Decode a list attribute. Accepts a native JSON array of strings or a
    /// JSON-encoded string value; the empty string decodes to an empty list.
    /// Returns `None` when the attribute is absent; callers decide whether
    /// absence is fatal.
    pub fn json_list_attribute(&self, key: &str) -> Result<Option<Vec<String>>> {
        let Some(raw) = self.attributes.get(key) else {
            return Ok(None);
        };
        let decoded = match raw {
            Value::Array(items) => items
                .iter()
                .map(|v| {
                    v.as_str().map(String::from).ok_or_else(|| {
                        Error::invalid_input(format!(
                            "sketch {}: attribute {key} contains a non-string entry",
                            self.id
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            Value::String(s) if s.is_empty() => Vec::new(),
            Value::String(s) => serde_json::from_str::<Vec<String>>(s).map_err(|e| {
                Error::invalid_input(format!(
                    "sketch {}: attribute {key} is not a JSON string list: {e}",
                    self.id
                ))
            })?,
            other => {
                return Err(Error::invalid_input(format!(
                    "sketch {}: attribute {key} has unexpected type {other}",
                    self.id
                )))
            }
        };
        Ok(Some(decoded))
    }

    /// Declared activity codes, defaulting to an empty list when the
    /// attribute is absent
    pub fn activities_or_default(&self) -> Result<Vec<String>> {
        Ok(self.json_list_attribute(ACTIVITIES_ATTRIB)?.unwrap_or_default())
    }

    /// Declared activity codes; absence is a classification input error
    pub fn required_activities(&self) -> Result<Vec<String>> {
        self.json_list_attribute(ACTIVITIES_ATTRIB)?.ok_or_else(|| {
            Error::classification(format!(
                "sketch {} is missing the {ACTIVITIES_ATTRIB} attribute",
                self.id
            ))
        })
    }
}
