//! # Documents and Summaries

use chrono::{SecondsFormat, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::errors::{StoreError, StoreResult};
use super::naming::StorageKey;

/// A proforma document
///
/// Only `id` and `createdAt` are typed. Every other field is carried
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, deserialize_with = "id_text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Invoice numbers arrive as strings or bare numbers
fn id_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "id must be a string or number, got {}",
            other
        ))),
    }
}

impl Document {
    /// Create a document with the two store-relevant fields set
    pub fn new(id: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            created_at: Some(created_at.into()),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Get a pass-through field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Interpret a request body as a document
    pub fn from_value(value: Value) -> StoreResult<Self> {
        if !value.is_object() {
            return Err(StoreError::Validation("document must be a JSON object".into()));
        }
        serde_json::from_value(value).map_err(|e| StoreError::Validation(e.to_string()))
    }

    /// Decode a stored blob; both `id` and `createdAt` must be present
    pub fn from_stored(key: &str, bytes: &[u8]) -> StoreResult<Self> {
        let doc: Document =
            serde_json::from_slice(bytes).map_err(|e| StoreError::parse(key, e))?;

        if doc.id.as_deref().map_or(true, str::is_empty) {
            return Err(StoreError::parse(key, "missing id"));
        }
        if doc.created_at.is_none() {
            return Err(StoreError::parse(key, "missing createdAt"));
        }
        Ok(doc)
    }

    /// Serialize for storage
    pub fn to_bytes(&self) -> StoreResult<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| StoreError::Validation(e.to_string()))
    }

    /// Check required fields before a write, stamping `createdAt` if absent
    pub fn prepare_for_create(&mut self) -> StoreResult<()> {
        match self.id.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(StoreError::Validation("missing required field: id".into()))
            }
            Some(_) => {}
        }

        match self.created_at.as_deref().map(str::trim) {
            None => {
                self.created_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
            }
            Some("") => {
                return Err(StoreError::Validation("createdAt must not be empty".into()))
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Best human-readable label for listings
    pub fn display_name(&self) -> String {
        let nested_client = self
            .field("client")
            .and_then(|c| c.get("name"))
            .and_then(Value::as_str);

        [
            self.field("clientName").and_then(Value::as_str),
            nested_client,
            self.field("customerName").and_then(Value::as_str),
            self.field("name").and_then(Value::as_str),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| self.id.clone().unwrap_or_default())
    }

    /// Document total: an explicit `total`, else the sum of its line items
    pub fn total(&self) -> f64 {
        if let Some(total) = self.field("total").and_then(as_number) {
            return total;
        }

        self.field("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| {
                        let quantity = item.get("quantity").and_then(as_number).unwrap_or(1.0);
                        let price = item
                            .get("unitPrice")
                            .or_else(|| item.get("price"))
                            .and_then(as_number)
                            .unwrap_or(0.0);
                        quantity * price
                    })
                    .sum()
            })
            .unwrap_or(0.0)
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Listing projection of a stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub total: f64,
    pub key: String,
    pub version: u32,
}

impl DocumentSummary {
    pub fn from_document(doc: &Document, key: &StorageKey) -> Self {
        Self {
            id: doc.id.clone().unwrap_or_else(|| key.id.clone()),
            name: doc.display_name(),
            created_at: doc.created_at.clone().unwrap_or_default(),
            total: doc.total(),
            key: key.file_name(),
            version: key.version,
        }
    }
}
