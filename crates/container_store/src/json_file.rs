//! JsonFileStore - writes the container to one JSON file when closed

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use contracts::{
    AnnotatedStore, ArrayRef, ArraySpec, ContractError, GroupRef, MetadataNode, MetadataTarget,
    RegionPlacement, RegionRef,
};
use tracing::{error, info, instrument};

use crate::error::StoreError;
use crate::memory::MemoryStore;
use crate::model::Container;

/// Store persisting to `<dir>/<name>.json`
///
/// Operations are validated and buffered by an inner [`MemoryStore`]; the file
/// is written once, by `flush_and_close`. Non-finite sample values are written
/// as `null`.
#[derive(Debug)]
pub struct JsonFileStore {
    inner: MemoryStore,
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store for container `name` inside `dir`, creating `dir` if needed
    pub fn create(dir: &Path, name: &str) -> Result<Self, ContractError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::Io(e).into_contract(name))?;
        Ok(Self {
            inner: MemoryStore::new(name),
            path: dir.join(format!("{name}.json")),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn container(&self) -> &Container {
        self.inner.container()
    }

    /// Read a container file back
    pub fn load(path: &Path) -> Result<Container, StoreError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn persist(&self) -> Result<(), StoreError> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self.inner.container())?;
        writer.flush()?;
        Ok(())
    }
}

impl AnnotatedStore for JsonFileStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn define_group(&mut self, name: &str, kind: &str) -> Result<GroupRef, ContractError> {
        self.inner.define_group(name, kind)
    }

    fn add_to_group(&mut self, group: GroupRef, array: ArrayRef) -> Result<(), ContractError> {
        self.inner.add_to_group(group, array)
    }

    fn write_array(&mut self, spec: ArraySpec) -> Result<ArrayRef, ContractError> {
        self.inner.write_array(spec)
    }

    fn attach_uniform_time_dimension(
        &mut self,
        array: ArrayRef,
        origin: f64,
        dt: f64,
        unit: &str,
        label: &str,
    ) -> Result<(), ContractError> {
        self.inner.attach_uniform_time_dimension(array, origin, dt, unit, label)
    }

    fn attach_irregular_time_dimension(
        &mut self,
        array: ArrayRef,
        ticks: Vec<f64>,
        unit: &str,
        label: &str,
    ) -> Result<(), ContractError> {
        self.inner
            .attach_irregular_time_dimension(array, ticks, unit, label)
    }

    fn attach_categorical_dimension(
        &mut self,
        array: ArrayRef,
        labels: Vec<String>,
    ) -> Result<(), ContractError> {
        self.inner.attach_categorical_dimension(array, labels)
    }

    fn define_region(
        &mut self,
        name: &str,
        kind: &str,
        placement: RegionPlacement,
    ) -> Result<RegionRef, ContractError> {
        self.inner.define_region(name, kind, placement)
    }

    fn add_reference(&mut self, region: RegionRef, array: ArrayRef) -> Result<(), ContractError> {
        self.inner.add_reference(region, array)
    }

    fn add_feature(&mut self, region: RegionRef, array: ArrayRef) -> Result<(), ContractError> {
        self.inner.add_feature(region, array)
    }

    fn attach_metadata_tree(
        &mut self,
        target: MetadataTarget,
        tree: MetadataNode,
    ) -> Result<(), ContractError> {
        self.inner.attach_metadata_tree(target, tree)
    }

    fn link_metadata(&mut self, array: ArrayRef, path: &[&str]) -> Result<(), ContractError> {
        self.inner.link_metadata(array, path)
    }

    #[instrument(name = "json_store_close", skip(self), fields(container = %self.inner.name()))]
    fn flush_and_close(&mut self) -> Result<(), ContractError> {
        if self.inner.is_closed() {
            return Ok(());
        }
        // Marked closed before writing; a failed write is not retried
        self.inner.flush_and_close()?;
        self.persist().map_err(|e| {
            error!(file = %self.path.display(), error = %e, "Write failed");
            e.into_contract(self.inner.name())
        })?;
        info!(file = %self.path.display(), "container written");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}
