//! AnnotatedStore trait - container output interface
//!
//! Defines the abstract interface of the annotated array store. One store value is
//! one open container; `flush_and_close` ends its lifetime.

use crate::{
    ArrayRef, ArraySpec, ContractError, GroupRef, MetadataNode, MetadataTarget, RegionPlacement,
    RegionRef,
};

/// Annotated array store
///
/// All store implementations must implement this trait.
pub trait AnnotatedStore {
    /// Container name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Define a named group of arrays
    fn define_group(&mut self, name: &str, kind: &str) -> Result<GroupRef, ContractError>;

    /// Add an already-written array to a group
    fn add_to_group(&mut self, group: GroupRef, array: ArrayRef) -> Result<(), ContractError>;

    /// Write an array
    ///
    /// # Errors
    /// Returns a store error if the container is closed or the name is taken
    fn write_array(&mut self, spec: ArraySpec) -> Result<ArrayRef, ContractError>;

    /// Attach a regularly sampled time dimension starting at `origin`
    fn attach_uniform_time_dimension(
        &mut self,
        array: ArrayRef,
        origin: f64,
        dt: f64,
        unit: &str,
        label: &str,
    ) -> Result<(), ContractError>;

    /// Attach an explicit-timestamp time dimension
    fn attach_irregular_time_dimension(
        &mut self,
        array: ArrayRef,
        ticks: Vec<f64>,
        unit: &str,
        label: &str,
    ) -> Result<(), ContractError>;

    /// Attach a categorical dimension naming tuple components
    fn attach_categorical_dimension(
        &mut self,
        array: ArrayRef,
        labels: Vec<String>,
    ) -> Result<(), ContractError>;

    /// Define a region (tag) on the common time axis
    fn define_region(
        &mut self,
        name: &str,
        kind: &str,
        placement: RegionPlacement,
    ) -> Result<RegionRef, ContractError>;

    /// Mark an array as annotated by a region
    fn add_reference(&mut self, region: RegionRef, array: ArrayRef) -> Result<(), ContractError>;

    /// Attach an array as tagged feature of a region
    fn add_feature(&mut self, region: RegionRef, array: ArrayRef) -> Result<(), ContractError>;

    /// Attach a metadata tree to the container or to one array
    fn attach_metadata_tree(
        &mut self,
        target: MetadataTarget,
        tree: MetadataNode,
    ) -> Result<(), ContractError>;

    /// Link an array to a section of the container's metadata tree by path
    fn link_metadata(&mut self, array: ArrayRef, path: &[&str]) -> Result<(), ContractError>;

    /// Flush buffered state and close the container
    ///
    /// Must be idempotent: closing an already closed container is a no-op.
    fn flush_and_close(&mut self) -> Result<(), ContractError>;

    /// Whether `flush_and_close` already ran
    fn is_closed(&self) -> bool;
}
