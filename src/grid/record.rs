use std::fmt;

use crate::domain::DGError;

/// A single scalar cell value. Records are schema-free, so every field
/// carries its own kind tag instead of a table-wide schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Value {
    /// Numeric view used by range filters, typed comparison and the
    /// derivations. Booleans are not numbers.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Map edited input text to the narrowest kind that accepts it, so a
    /// cell edited through the text editor keeps sorting numerically.
    pub fn parse(input: &str) -> Value {
        if let Ok(v) = input.parse::<i64>() {
            return Value::Int(v);
        }
        if let Ok(v) = input.parse::<f64>() {
            return Value::Float(v);
        }
        match input {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Str(input.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(v) => f.write_str(v),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// One row of tabular data: a stable identity plus an ordered field list.
/// Two records of the same store may carry different optional fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: i64,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(id: i64) -> Self {
        Record {
            id,
            fields: Vec::new(),
        }
    }

    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.set(field, value.into());
        self
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Replace the field value, appending the field when the record does
    /// not carry it yet.
    pub fn set(&mut self, field: &str, value: Value) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Holds the loaded records in load order. Filtering, sorting and paging
/// never touch it; only explicit edits and removals do.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        RecordStore::default()
    }

    /// Replace the full record set.
    pub fn load(&mut self, records: Vec<Record>) {
        self.records = records;
    }

    pub fn all(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.get(id).is_some()
    }

    /// Replace one field value on one record, in place. The change is
    /// visible to the next filter/sort pass.
    pub fn update(&mut self, id: i64, field: &str, value: Value) -> Result<(), DGError> {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.set(field, value);
                Ok(())
            }
            None => Err(DGError::RecordNotFound(id)),
        }
    }

    /// Remove one record, keeping the load order of the rest.
    pub fn remove(&mut self, id: i64) -> Result<Record, DGError> {
        match self.records.iter().position(|r| r.id == id) {
            Some(idx) => Ok(self.records.remove(idx)),
            None => Err(DGError::RecordNotFound(id)),
        }
    }
}
