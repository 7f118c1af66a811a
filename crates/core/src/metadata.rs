use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::MetadataError;

/// Scalar metadata value attached to an indexed record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetadataValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn kind(&self) -> MetadataKind {
        match self {
            MetadataValue::Text(_) => MetadataKind::Text,
            MetadataValue::Integer(_) => MetadataKind::Integer,
            MetadataValue::Float(_) => MetadataKind::Float,
            MetadataValue::Boolean(_) => MetadataKind::Boolean,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::Text(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::Text(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        MetadataValue::Integer(i)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Boolean(b)
    }
}

/// Flat key/value metadata of one record.
pub type Metadata = BTreeMap<String, MetadataValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetadataKind {
    Text,
    Integer,
    Float,
    Boolean,
}

impl MetadataKind {
    fn name(self) -> &'static str {
        match self {
            MetadataKind::Text => "text",
            MetadataKind::Integer => "integer",
            MetadataKind::Float => "float",
            MetadataKind::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub kind: MetadataKind,
    pub required: bool,
}

/// Declared metadata fields of a corpus. Records are checked against it
/// before they are written or flattened into result rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataSchema {
    fields: BTreeMap<String, FieldSpec>,
}

impl MetadataSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: &str, kind: MetadataKind) -> Self {
        self.fields
            .insert(name.to_string(), FieldSpec { kind, required: true });
        self
    }

    pub fn optional(mut self, name: &str, kind: MetadataKind) -> Self {
        self.fields
            .insert(name.to_string(), FieldSpec { kind, required: false });
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Schema of the records produced from chunks.
    pub fn chunk_records() -> Self {
        Self::new()
            .required("source", MetadataKind::Text)
            .required("chunk_index", MetadataKind::Integer)
            .required("tokens", MetadataKind::Integer)
            .required("page_numbers", MetadataKind::Text)
    }

    pub fn validate(&self, metadata: &Metadata) -> Result<(), MetadataError> {
        for (key, value) in metadata {
            let spec = self
                .fields
                .get(key)
                .ok_or_else(|| MetadataError::UnknownField(key.clone()))?;
            if spec.kind != value.kind() {
                return Err(MetadataError::TypeMismatch {
                    field: key.clone(),
                    expected: spec.kind.name(),
                    actual: value.kind().name(),
                });
            }
        }
        for (key, spec) in &self.fields {
            if spec.required && !metadata.contains_key(key) {
                return Err(MetadataError::MissingField(key.clone()));
            }
        }
        Ok(())
    }
}
