use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identity extracted from a successful validation response.
///
/// Attribute names are always lower-cased; every attribute holds one or more values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl Principal {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn push_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes
            .entry(name.to_lowercase())
            .or_default()
            .push(value.into());
    }

    /// First value of `name` (case-insensitive).
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attribute_values(name).first().map(String::as_str)
    }

    pub fn attribute_values(&self, name: &str) -> &[String] {
        self.attributes
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
