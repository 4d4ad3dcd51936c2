//! Model parameter mappings
//!
//! [`ModelParameters`] maps parameter names to numeric values. Ordering is
//! by name so two ranks holding the same mapping iterate it identically.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name → value mapping handed to an occupation model
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelParameters {
    values: BTreeMap<String, f64>,
}

impl ModelParameters {
    /// Empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or overwrite a value, returning the previous one
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(name.into(), value)
    }

    /// Look up a value
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// True if the name is present
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no entries
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Names in name order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Overwrite entries with those from `other`
    pub fn merge(&mut self, other: &ModelParameters) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    /// Fail with [`Error::MissingParameter`] on the first required name
    /// (in `required` order) that is absent.
    pub fn require_all<'a>(&self, required: impl IntoIterator<Item = &'a str>) -> Result<()> {
        for name in required {
            if !self.contains(name) {
                return Err(Error::MissingParameter {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Fail with [`Error::UnknownParameter`] on the first name (in name
    /// order) that is not in `recognized`.
    pub fn reject_unknown(&self, recognized: &[&str]) -> Result<()> {
        for name in self.names() {
            if !recognized.contains(&name) {
                return Err(Error::UnknownParameter {
                    name: name.to_string(),
                    valid: recognized.iter().map(|s| s.to_string()).collect(),
                });
            }
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ModelParameters {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
