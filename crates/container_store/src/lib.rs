//! # Container Store
//!
//! `AnnotatedStore` implementations.
//!
//! - [`MemoryStore`]: keeps the container in memory, for inspection and tests
//! - [`JsonFileStore`]: writes the container to `<dir>/<name>.json` when closed

pub mod error;
pub mod json_file;
pub mod memory;
pub mod model;

pub use contracts::AnnotatedStore;
pub use error::StoreError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use model::{Container, StoredArray, StoredGroup, StoredRegion};
