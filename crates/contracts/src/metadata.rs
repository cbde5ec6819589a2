//! Metadata tree attached to the container as a side structure.

use serde::{Deserialize, Serialize};

/// Property value in a metadata section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Number(f64),
    Text(String),
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Metadata section: named, typed, with ordered properties and child sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub properties: Vec<(String, MetadataValue)>,
    #[serde(default)]
    pub children: Vec<MetadataNode>,
}

impl MetadataNode {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style property insertion
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder-style child insertion
    pub fn with_child(mut self, child: MetadataNode) -> Self {
        self.children.push(child);
        self
    }

    /// Set a property, replacing an existing one with the same key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        let key = key.into();
        let value = value.into();
        match self.properties.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.properties.push((key, value)),
        }
    }

    pub fn property(&self, key: &str) -> Option<&MetadataValue> {
        self.properties.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn child(&self, name: &str) -> Option<&MetadataNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Resolve a path of section names below this node
    pub fn find(&self, path: &[&str]) -> Option<&MetadataNode> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => self.child(head)?.find(rest),
        }
    }

    /// Total number of sections in this subtree, including self
    pub fn section_count(&self) -> usize {
        1 + self.children.iter().map(Self::section_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_nested() {
        let tree = MetadataNode::new("session", "recording").with_child(
            MetadataNode::new("hardware", "recording hardware")
                .with_child(MetadataNode::new("eeg system", "hardware.eeg").with_property("gain", 100.0)),
        );
        let eeg = tree.find(&["hardware", "eeg system"]).unwrap();
        assert_eq!(eeg.property("gain"), Some(&MetadataValue::Number(100.0)));
        assert!(tree.find(&["hardware", "missing"]).is_none());
        assert_eq!(tree.section_count(), 3);
    }

    #[test]
    fn test_set_replaces() {
        let mut node = MetadataNode::new("subject", "subject");
        node.set("name", "A");
        node.set("name", "B");
        assert_eq!(node.properties.len(), 1);
        assert_eq!(node.property("name"), Some(&MetadataValue::from("B")));
    }
}
