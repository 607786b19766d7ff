//! Raw player records as returned by the record source

use mpg_common::{PlayerField, PLAYER_FULL_NAME};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Scalar attribute value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }
}

/// One player's attribute set
///
/// Only numeric and string attributes are kept. `null`, booleans and nested
/// values are dropped on parse, so the attribute reads as absent.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl From<Map<String, Value>> for Record {
    fn from(object: Map<String, Value>) -> Self {
        let fields = object
            .into_iter()
            .filter_map(|(name, value)| {
                let value = match value {
                    Value::Number(n) => FieldValue::Number(n.as_f64()?),
                    Value::String(s) => FieldValue::Text(s),
                    _ => return None,
                };
                Some((name, value))
            })
            .collect();
        Self { fields }
    }
}

impl Record {
    /// Build a record from `(name, value)` pairs
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Value of a selectable player field
    pub fn field(&self, field: PlayerField) -> Option<&FieldValue> {
        self.get(field.as_str())
    }

    /// Display name, if the record carries one
    pub fn full_name(&self) -> Option<&str> {
        self.get(PLAYER_FULL_NAME).and_then(FieldValue::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parse a record source response body: a JSON array of objects
pub fn parse_records(body: &[u8]) -> Result<Vec<Record>, serde_json::Error> {
    serde_json::from_slice(body)
}
