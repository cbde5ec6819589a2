//! Annotated container vocabulary: array specs, dimensions, regions, handles.

use serde::{Deserialize, Deserializer, Serialize};

/// Handle of an array written to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArrayRef(pub usize);

/// Handle of an array group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupRef(pub usize);

/// Handle of a region (tag)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionRef(pub usize);

/// Numeric payload of an array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayValues {
    /// One value per sample
    Scalars(#[serde(deserialize_with = "values_with_gaps")] Vec<f64>),
    /// Fixed-width tuple per sample
    Tuples {
        width: usize,
        #[serde(deserialize_with = "rows_with_gaps")]
        rows: Vec<Vec<f64>>,
    },
}

/// JSON has no NaN: serializers write it as `null`, read it back as NaN
fn values_with_gaps<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    let values: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

fn rows_with_gaps<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<f64>>, D::Error> {
    let rows: Vec<Vec<Option<f64>>> = Vec::deserialize(deserializer)?;
    Ok(rows
        .into_iter()
        .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
        .collect())
}

impl ArrayValues {
    /// Number of samples (first dimension)
    pub fn len(&self) -> usize {
        match self {
            Self::Scalars(values) => values.len(),
            Self::Tuples { rows, .. } => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything needed to write one array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArraySpec {
    pub name: String,
    pub kind: String,
    pub values: ArrayValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ArraySpec {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, values: ArrayValues) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            values,
            unit: None,
            label: None,
            description: None,
        }
    }

    pub fn scalars(name: impl Into<String>, kind: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, kind, ArrayValues::Scalars(values))
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Dimension descriptor attached to an array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dimension", rename_all = "snake_case")]
pub enum Dimension {
    /// Regularly sampled: sample `k` sits at `origin + k * dt`
    Uniform {
        #[serde(default)]
        origin: f64,
        dt: f64,
        unit: String,
        label: String,
    },
    /// Explicit per-sample ticks
    Irregular {
        #[serde(deserialize_with = "values_with_gaps")]
        ticks: Vec<f64>,
        unit: String,
        label: String,
    },
    /// Named components
    Categorical { labels: Vec<String> },
}

impl Dimension {
    pub fn is_time(&self) -> bool {
        matches!(self, Self::Uniform { .. } | Self::Irregular { .. })
    }
}

/// Where a region sits on the common time axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "placement", rename_all = "snake_case")]
pub enum RegionPlacement {
    /// Many instants stored as arrays (multi-tag)
    Arrays {
        positions: ArrayRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extents: Option<ArrayRef>,
    },
    /// One interval stored inline, one entry per data dimension
    Inline {
        position: Vec<f64>,
        extent: Vec<f64>,
        units: Vec<String>,
    },
}

/// Attachment point for a metadata tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataTarget {
    Container,
    Array(ArrayRef),
}
