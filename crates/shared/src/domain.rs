use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

id_newtype!(ControlId);
id_newtype!(ContainerId);

/// Opaque option token. Compared by equality; ordering is a policy choice
/// made by the caller (see [`ValueOrdering`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionValue(pub String);

impl OptionValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub label: String,
    pub value: OptionValue,
}

impl OptionEntry {
    pub fn new(label: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// The "nothing chosen" entry present in every control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonValue {
    pub label: String,
    pub value: OptionValue,
}

impl Default for NonValue {
    fn default() -> Self {
        Self {
            label: "None".into(),
            value: OptionValue::from("-1"),
        }
    }
}

impl NonValue {
    pub fn entry(&self) -> OptionEntry {
        OptionEntry {
            label: self.label.clone(),
            value: self.value.clone(),
        }
    }

    pub fn matches(&self, value: &OptionValue) -> bool {
        &self.value == value
    }
}

/// Every option a user could ever pick, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<OptionEntry>", into = "Vec<OptionEntry>")]
pub struct OptionPool {
    entries: Vec<OptionEntry>,
}

impl OptionPool {
    pub fn new(entries: impl IntoIterator<Item = OptionEntry>) -> Self {
        let mut pool = Self::default();
        for entry in entries {
            pool.insert(entry);
        }
        pool
    }

    /// Repeated labels keep their first position and take the newest value.
    pub fn insert(&mut self, entry: OptionEntry) {
        match self.entries.iter_mut().find(|e| e.label == entry.label) {
            Some(existing) => existing.value = entry.value,
            None => self.entries.push(entry),
        }
    }

    pub fn entries(&self) -> &[OptionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_value(&self, value: &OptionValue) -> bool {
        self.entries.iter().any(|e| &e.value == value)
    }

    pub fn label_for(&self, value: &OptionValue) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| &e.value == value)
            .map(|e| e.label.as_str())
    }

    pub fn retain(&mut self, keep: impl FnMut(&OptionEntry) -> bool) {
        self.entries.retain(keep);
    }
}

impl From<Vec<OptionEntry>> for OptionPool {
    fn from(entries: Vec<OptionEntry>) -> Self {
        Self::new(entries)
    }
}

impl From<OptionPool> for Vec<OptionEntry> {
    fn from(pool: OptionPool) -> Self {
        pool.entries
    }
}

impl FromIterator<OptionEntry> for OptionPool {
    fn from_iter<T: IntoIterator<Item = OptionEntry>>(iter: T) -> Self {
        Self::new(iter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOrdering {
    /// Numeric when both tokens parse as numbers, lexicographic otherwise.
    #[default]
    Natural,
    Lexicographic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonValuePlacement {
    #[default]
    Pinned,
    Sorted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionOrder {
    #[default]
    ByValue,
    ByLabel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ControlState {
    Empty,
    Holding(OptionValue),
}
