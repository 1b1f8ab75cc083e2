use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Ordered key sequence from the root of a raw record down to a leaf value
pub type FieldPath = &'static [&'static str];

/// What a field becomes when its source path is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultPolicy {
    /// Absent values become `null`
    Null,
    /// Absent values become the current UTC time as an ISO-8601 string
    CurrentTimestamp,
    /// Absent values become this fixed string
    Literal(&'static str),
    /// Always a boolean: `false` only when the source is explicitly `false`
    TrueUnlessFalse,
}

/// A single mapping rule: output column name, source path, default policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaEntry {
    pub output_name: &'static str,
    pub path: FieldPath,
    pub default: DefaultPolicy,
}

impl SchemaEntry {
    pub const fn new(output_name: &'static str, path: FieldPath, default: DefaultPolicy) -> Self {
        SchemaEntry {
            output_name,
            path,
            default,
        }
    }

    pub const fn nullable(output_name: &'static str, path: FieldPath) -> Self {
        Self::new(output_name, path, DefaultPolicy::Null)
    }
}

/// One flattened output record.
///
/// Holds exactly one value per schema entry, in schema order. Serializes as a
/// JSON object whose key order is the schema declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRecord {
    fields: Vec<(&'static str, Value)>,
}

impl FlatRecord {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        FlatRecord {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: &'static str, value: Value) {
        self.fields.push((name, value));
    }

    /// Get the value of an output field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Output field names in schema order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }
}

impl Serialize for FlatRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// How a `null`-defaulted field decides its source value is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsenceRule {
    /// Missing, `null`, `false`, zero and `""` all count as absent
    Falsy,
    /// Only missing keys and `null` count as absent
    Presence,
}

/// Parser used for each record once its bytes have been isolated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserBackend {
    Serde,
    /// SIMD-accelerated parsing via simd-json
    Simd,
}

/// Configuration for the flattening pipeline
#[derive(Debug, Clone)]
pub struct FlattenConfig {
    /// Absence test applied to every non-boolean field
    pub absence: AbsenceRule,

    /// Per-record JSON parser
    pub parser: ParserBackend,

    /// Upper bound on the raw size of a single record (None = unbounded)
    pub max_record_bytes: Option<usize>,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig {
            absence: AbsenceRule::Falsy,
            parser: ParserBackend::Serde,
            max_record_bytes: None,
        }
    }
}
