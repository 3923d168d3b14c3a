use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use shared::domain::FieldValue;

/// Field name → final value, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedResult {
    entries: Vec<FieldValue>,
}

impl ComposedResult {
    pub(crate) fn new(entries: Vec<FieldValue>) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ComposedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", entry.name, entry.value)?;
        }
        Ok(())
    }
}

// Serialized as a JSON object whose keys keep field order.
impl Serialize for ComposedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.value)?;
        }
        map.end()
    }
}
