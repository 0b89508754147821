//! Row implementation
//!
//! Field-ordered mapping from column name to value.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{Value, ID_COLUMN};

static NULL: Value = Value::Null;

/// A single row, fields kept in column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Set a field, replacing it in place if already present
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Field value, or `Value::Null` when the row has no such field
    pub fn value_of(&self, name: &str) -> &Value {
        self.get(name).unwrap_or(&NULL)
    }

    /// The row's `_id` as rendered hex, if present
    pub fn id(&self) -> Option<&str> {
        match self.get(ID_COLUMN) {
            Some(Value::Text(id)) => Some(id.as_str()),
            _ => None,
        }
    }

    /// Build a row holding exactly `columns`, absent ones as Null
    pub fn project(&self, columns: &[String]) -> Row {
        let mut projected = Row::with_capacity(columns.len());
        for name in columns {
            projected.insert(name.clone(), self.value_of(name).clone());
        }
        projected
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
