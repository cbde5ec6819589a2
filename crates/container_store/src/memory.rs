//! MemoryStore - keeps the whole container in memory

use contracts::{
    AnnotatedStore, ArrayRef, ArraySpec, ArrayValues, ContractError, Dimension, GroupRef,
    MetadataNode, MetadataTarget, RegionPlacement, RegionRef,
};
use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::model::{Container, StoredArray, StoredGroup, StoredRegion};

/// In-memory annotated store
///
/// Checks every operation against the container built so far, so it doubles as
/// a reference for what a persistent backend must accept.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    container: Container,
    closed: bool,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            container: Container::new(name),
            closed: false,
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn into_container(self) -> Container {
        self.container
    }

    fn fail(&self, err: StoreError) -> ContractError {
        err.into_contract(&self.container.name)
    }

    fn ensure_open(&self) -> Result<(), ContractError> {
        if self.closed {
            return Err(self.fail(StoreError::Closed));
        }
        Ok(())
    }

    fn array_mut(&mut self, array: ArrayRef) -> Result<&mut StoredArray, ContractError> {
        self.container
            .arrays
            .get_mut(array.0)
            .ok_or(ContractError::UnknownReference {
                kind: "array",
                id: array.0,
            })
    }

    fn check_array(&self, array: ArrayRef) -> Result<&StoredArray, ContractError> {
        self.container
            .array_at(array)
            .ok_or(ContractError::UnknownReference {
                kind: "array",
                id: array.0,
            })
    }

    fn region_mut(&mut self, region: RegionRef) -> Result<&mut StoredRegion, ContractError> {
        self.container
            .regions
            .get_mut(region.0)
            .ok_or(ContractError::UnknownReference {
                kind: "region",
                id: region.0,
            })
    }

    /// The first dimension of an array must be its time axis
    fn attach_time_dimension(
        &mut self,
        array: ArrayRef,
        dimension: Dimension,
        ticks: Option<usize>,
    ) -> Result<(), ContractError> {
        self.ensure_open()?;
        let stored = self.check_array(array)?;
        let name = stored.spec.name.clone();

        if !stored.dimensions.is_empty() {
            return Err(self.fail(StoreError::invalid_array(name, "time dimension must come first")));
        }
        if let Some(found) = ticks {
            let expected = stored.len();
            if found != expected {
                return Err(self.fail(StoreError::DimensionLength {
                    array: name,
                    expected,
                    found,
                }));
            }
        }

        self.array_mut(array)?.dimensions.push(dimension);
        Ok(())
    }
}

impl AnnotatedStore for MemoryStore {
    fn name(&self) -> &str {
        &self.container.name
    }

    fn define_group(&mut self, name: &str, kind: &str) -> Result<GroupRef, ContractError> {
        self.ensure_open()?;
        self.container.groups.push(StoredGroup {
            name: name.to_string(),
            kind: kind.to_string(),
            arrays: Vec::new(),
        });
        Ok(GroupRef(self.container.groups.len() - 1))
    }

    fn add_to_group(&mut self, group: GroupRef, array: ArrayRef) -> Result<(), ContractError> {
        self.ensure_open()?;
        self.check_array(array)?;
        let stored = self
            .container
            .groups
            .get_mut(group.0)
            .ok_or(ContractError::UnknownReference {
                kind: "group",
                id: group.0,
            })?;
        if !stored.arrays.contains(&array) {
            stored.arrays.push(array);
        }
        Ok(())
    }

    #[instrument(name = "memory_store_write_array", skip_all, fields(array = %spec.name))]
    fn write_array(&mut self, spec: ArraySpec) -> Result<ArrayRef, ContractError> {
        self.ensure_open()?;
        if self.container.array(&spec.name).is_some() {
            return Err(self.fail(StoreError::DuplicateArray(spec.name)));
        }
        if let ArrayValues::Tuples { width, rows } = &spec.values {
            if let Some(row) = rows.iter().find(|r| r.len() != *width) {
                let message = format!("row of width {} in an array of width {width}", row.len());
                return Err(self.fail(StoreError::invalid_array(spec.name, message)));
            }
        }

        debug!(samples = spec.values.len(), "array written");
        self.container.arrays.push(StoredArray::new(spec));
        Ok(ArrayRef(self.container.arrays.len() - 1))
    }

    fn attach_uniform_time_dimension(
        &mut self,
        array: ArrayRef,
        origin: f64,
        dt: f64,
        unit: &str,
        label: &str,
    ) -> Result<(), ContractError> {
        if !(dt.is_finite() && dt > 0.0) {
            let name = self.check_array(array)?.spec.name.clone();
            let message = format!("sampling interval {dt} must be positive");
            return Err(self.fail(StoreError::invalid_array(name, message)));
        }
        if !origin.is_finite() {
            let name = self.check_array(array)?.spec.name.clone();
            let message = format!("time origin {origin} is not finite");
            return Err(self.fail(StoreError::invalid_array(name, message)));
        }
        let dimension = Dimension::Uniform {
            origin,
            dt,
            unit: unit.to_string(),
            label: label.to_string(),
        };
        self.attach_time_dimension(array, dimension, None)
    }

    fn attach_irregular_time_dimension(
        &mut self,
        array: ArrayRef,
        ticks: Vec<f64>,
        unit: &str,
        label: &str,
    ) -> Result<(), ContractError> {
        let count = ticks.len();
        let dimension = Dimension::Irregular {
            ticks,
            unit: unit.to_string(),
            label: label.to_string(),
        };
        self.attach_time_dimension(array, dimension, Some(count))
    }

    fn attach_categorical_dimension(
        &mut self,
        array: ArrayRef,
        labels: Vec<String>,
    ) -> Result<(), ContractError> {
        self.ensure_open()?;
        let stored = self.check_array(array)?;
        let name = stored.spec.name.clone();

        match &stored.spec.values {
            ArrayValues::Tuples { width, .. } if *width == labels.len() => {}
            ArrayValues::Tuples { width, .. } => {
                let message = format!("{} labels for tuples of width {width}", labels.len());
                return Err(self.fail(StoreError::invalid_array(name, message)));
            }
            ArrayValues::Scalars(_) => {
                let message = "categorical dimension needs a tuple array";
                return Err(self.fail(StoreError::invalid_array(name, message)));
            }
        }

        self.array_mut(array)?
            .dimensions
            .push(Dimension::Categorical { labels });
        Ok(())
    }

    fn define_region(
        &mut self,
        name: &str,
        kind: &str,
        placement: RegionPlacement,
    ) -> Result<RegionRef, ContractError> {
        self.ensure_open()?;
        match &placement {
            RegionPlacement::Arrays { positions, extents } => {
                let count = self.check_array(*positions)?.len();
                if let Some(extents) = extents {
                    let found = self.check_array(*extents)?.len();
                    if found != count {
                        let message = format!("{count} positions but {found} extents");
                        return Err(self.fail(StoreError::invalid_region(name, message)));
                    }
                }
            }
            RegionPlacement::Inline {
                position,
                extent,
                units,
            } => {
                if position.len() != extent.len() || position.len() != units.len() {
                    let message = "position, extent and units must have one entry per dimension";
                    return Err(self.fail(StoreError::invalid_region(name, message)));
                }
            }
        }

        self.container.regions.push(StoredRegion {
            name: name.to_string(),
            kind: kind.to_string(),
            placement,
            references: Vec::new(),
            features: Vec::new(),
        });
        Ok(RegionRef(self.container.regions.len() - 1))
    }

    fn add_reference(&mut self, region: RegionRef, array: ArrayRef) -> Result<(), ContractError> {
        self.ensure_open()?;
        let array_name = self.check_array(array)?.spec.name.clone();
        let container = self.container.name.clone();
        let stored = self.region_mut(region)?;
        if stored.references.contains(&array) {
            let message = format!("already references '{array_name}'");
            return Err(StoreError::invalid_region(stored.name.clone(), message).into_contract(&container));
        }
        stored.references.push(array);
        Ok(())
    }

    fn add_feature(&mut self, region: RegionRef, array: ArrayRef) -> Result<(), ContractError> {
        self.ensure_open()?;
        self.check_array(array)?;
        let stored = self.region_mut(region)?;
        if !stored.features.contains(&array) {
            stored.features.push(array);
        }
        Ok(())
    }

    fn attach_metadata_tree(
        &mut self,
        target: MetadataTarget,
        tree: MetadataNode,
    ) -> Result<(), ContractError> {
        self.ensure_open()?;
        match target {
            MetadataTarget::Container => self.container.metadata = Some(tree),
            MetadataTarget::Array(array) => self.array_mut(array)?.metadata = Some(tree),
        }
        Ok(())
    }

    fn link_metadata(&mut self, array: ArrayRef, path: &[&str]) -> Result<(), ContractError> {
        self.ensure_open()?;
        self.check_array(array)?;
        let found = self
            .container
            .metadata
            .as_ref()
            .and_then(|root| root.find(path))
            .is_some();
        if !found {
            return Err(self.fail(StoreError::MissingSection(path.join("/"))));
        }
        self.array_mut(array)?.metadata_link = path.iter().map(|s| s.to_string()).collect();
        Ok(())
    }

    fn flush_and_close(&mut self) -> Result<(), ContractError> {
        if !self.closed {
            debug!(
                container = %self.container.name,
                arrays = self.container.arrays.len(),
                regions = self.container.regions.len(),
                "memory store closed"
            );
            self.closed = true;
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
