//! Prefix-to-URI namespace mappings detected from a document root.

use crate::parse::XmlDocument;

/// An ordered prefix→URI mapping. The empty prefix is the default
/// namespace. Keys are unique; inserting an existing prefix overrides
/// its URI in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceMap {
    entries: Vec<(String, String)>,
}

impl NamespaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        let prefix = prefix.into();
        let uri = uri.into();
        match self.entries.iter_mut().find(|(p, _)| *p == prefix) {
            Some(entry) => entry.1 = uri,
            None => self.entries.push((prefix, uri)),
        }
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    pub fn has_default(&self) -> bool {
        self.get("").is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    /// Applies every entry of `overrides` on top of this map.
    pub fn merge(&mut self, overrides: &NamespaceMap) {
        for (prefix, uri) in overrides.iter() {
            self.insert(prefix, uri);
        }
    }
}

impl FromIterator<(String, String)> for NamespaceMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut map = NamespaceMap::new();
        for (prefix, uri) in iter {
            map.insert(prefix, uri);
        }
        map
    }
}

/// Reads the namespace declarations off the document's root element into
/// a prefix→URI map. Only the root element is inspected; URIs are not
/// validated.
pub fn extract_namespaces(doc: &XmlDocument<'_>) -> NamespaceMap {
    let mut map = NamespaceMap::new();
    if let Some(root_el) = doc.root().element_children().next()
        && let Some(node) = root_el.tree_node()
    {
        for ns in node.namespaces() {
            map.insert(ns.name().unwrap_or(""), ns.uri());
        }
    }
    map
}
