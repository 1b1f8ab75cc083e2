use crate::error::SchemaError;
use crate::flatten::schema::Schema;
use crate::flatten::types::{AbsenceRule, DefaultPolicy, FlatRecord, SchemaEntry};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Descend `value` along `path`, key by key.
///
/// Returns `None` when a key is missing or an intermediate value is not an
/// object. Never panics on unexpected shapes.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
}

/// JavaScript truthiness over JSON values: `null`, `false`, zero and `""`
/// are falsy; every array and object is truthy.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Render a timestamp the way `Date.prototype.toISOString` does
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Maps raw nested records onto the flat column layout
pub struct Flattener {
    schema: Schema,
    absence: AbsenceRule,
    clock: fn() -> DateTime<Utc>,
}

impl Flattener {
    pub fn new(schema: Schema, absence: AbsenceRule) -> Self {
        Flattener {
            schema,
            absence,
            clock: Utc::now,
        }
    }

    /// Flattener over the built-in table
    pub fn builtin(absence: AbsenceRule) -> Result<Self, SchemaError> {
        Ok(Self::new(Schema::builtin()?, absence))
    }

    /// Replace the wall clock used for the timestamp default
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Flatten one raw record. Total: every schema field is present in the output.
    pub fn flatten(&self, record: &Value) -> FlatRecord {
        let mut flat = FlatRecord::with_capacity(self.schema.len());
        for entry in self.schema.entries() {
            flat.push(entry.output_name, self.resolve(entry, record));
        }
        flat
    }

    fn resolve(&self, entry: &SchemaEntry, record: &Value) -> Value {
        let found = lookup(record, entry.path);

        match entry.default {
            DefaultPolicy::TrueUnlessFalse => {
                Value::Bool(!matches!(found, Some(Value::Bool(false))))
            }
            DefaultPolicy::Null => self.present(found).cloned().unwrap_or(Value::Null),
            DefaultPolicy::CurrentTimestamp => match self.present(found) {
                Some(value) => value.clone(),
                None => Value::String(iso_timestamp((self.clock)())),
            },
            DefaultPolicy::Literal(fallback) => match self.present(found) {
                Some(value) => value.clone(),
                None => Value::String(fallback.to_string()),
            },
        }
    }

    fn present<'a>(&self, found: Option<&'a Value>) -> Option<&'a Value> {
        let value = found?;
        let absent = match self.absence {
            AbsenceRule::Falsy => is_falsy(value),
            AbsenceRule::Presence => value.is_null(),
        };
        if absent {
            None
        } else {
            Some(value)
        }
    }
}
