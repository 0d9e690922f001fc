//! Directory Service domain types: an LDAP-like entry store.

use std::collections::BTreeMap;

/// A directory entry keyed by a distinguished-name-shaped id
/// (e.g. `"cn=alice,ou=people,dc=example,dc=com"`), carrying arbitrary
/// single- or multi-valued attributes the way LDAP entries do.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    pub dn: String,
    pub object_class: Vec<String>,
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>, object_class: Vec<String>) -> Self {
        Self {
            dn: dn.into(),
            object_class,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, values: Vec<String>) -> Self {
        self.attributes.insert(key.into(), values);
        self
    }

    pub fn attribute(&self, key: &str) -> &[String] {
        self.attributes.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Case-insensitive substring match against a single attribute's values,
    /// the minimal filter semantics a directory search needs here.
    pub fn matches_attribute(&self, key: &str, needle: &str) -> bool {
        let needle_lower = needle.to_lowercase();
        self.attribute(key)
            .iter()
            .any(|v| v.to_lowercase().contains(&needle_lower))
    }
}
