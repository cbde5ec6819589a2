//! Serializable container model

use chrono::{DateTime, Utc};
use contracts::{ArrayRef, ArraySpec, Dimension, MetadataNode, RegionPlacement};
use serde::{Deserialize, Serialize};

/// One container: arrays, groups, regions and the metadata tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataNode>,
    pub arrays: Vec<StoredArray>,
    pub groups: Vec<StoredGroup>,
    pub regions: Vec<StoredRegion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArray {
    #[serde(flatten)]
    pub spec: ArraySpec,
    pub dimensions: Vec<Dimension>,
    /// Tree attached to this array only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataNode>,
    /// Path into the container metadata tree
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata_link: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredGroup {
    pub name: String,
    pub kind: String,
    pub arrays: Vec<ArrayRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRegion {
    pub name: String,
    pub kind: String,
    pub placement: RegionPlacement,
    pub references: Vec<ArrayRef>,
    pub features: Vec<ArrayRef>,
}

impl Container {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
            metadata: None,
            arrays: Vec::new(),
            groups: Vec::new(),
            regions: Vec::new(),
        }
    }

    pub fn array(&self, name: &str) -> Option<&StoredArray> {
        self.arrays.iter().find(|a| a.spec.name == name)
    }

    pub fn array_at(&self, array: ArrayRef) -> Option<&StoredArray> {
        self.arrays.get(array.0)
    }

    pub fn group(&self, name: &str) -> Option<&StoredGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn region(&self, name: &str) -> Option<&StoredRegion> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Names of the arrays in a group, in insertion order
    pub fn group_array_names(&self, name: &str) -> Vec<&str> {
        self.group(name)
            .map(|g| self.names_of(&g.arrays))
            .unwrap_or_default()
    }

    /// Names of the arrays a region references
    pub fn referenced_names(&self, region: &str) -> Vec<&str> {
        self.region(region)
            .map(|r| self.names_of(&r.references))
            .unwrap_or_default()
    }

    /// Arrays of one kind, in write order
    pub fn arrays_of_kind(&self, kind: &str) -> Vec<&StoredArray> {
        self.arrays.iter().filter(|a| a.spec.kind == kind).collect()
    }

    fn names_of(&self, refs: &[ArrayRef]) -> Vec<&str> {
        refs.iter()
            .filter_map(|&r| self.array_at(r))
            .map(|a| a.spec.name.as_str())
            .collect()
    }
}

impl StoredArray {
    pub fn new(spec: ArraySpec) -> Self {
        Self {
            spec,
            dimensions: Vec::new(),
            metadata: None,
            metadata_link: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.spec.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spec.values.is_empty()
    }

    pub fn time_dimension(&self) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.is_time())
    }
}
