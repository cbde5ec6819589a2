//! # Sync Engine
//!
//! Aligns a biosignal recording and an eye tracker log on one time axis and
//! writes both into an annotated container.
//!
//! Responsibilities:
//! - Sampling strategy of the channel group (uniform vs. explicit times)
//! - Clock offsets from the shared sync pulse train
//! - Corner and experiment-start markers from the trigger channel
//! - Eye tracker property channels from one declarative catalog
//! - Container assembly with region/array cross references
//!
//! ## Usage Example
//!
//! ```ignore
//! use sync_engine::ContainerAssembler;
//!
//! let assembler = ContainerAssembler::new(config).with_overrides(overrides);
//! let assembled = assembler.assemble(&input, |name| Ok(MemoryStore::new(name)))?;
//! println!("{} property samples", assembled.report.property_samples);
//! ```

mod annotation;
mod assembler;
mod edges;
mod hardware;
mod offset;
mod property;
mod session;
mod time_base;

pub use annotation::AnnotationRelation;
pub use assembler::{
    Assembled, ContainerAssembler, InspectionReport, CORNER_REGION, EXPERIMENT_REGION, TRIGGER_NAME,
};
pub use edges::{EdgeEvent, EdgeEventExtractor, EdgeEvents, EventClass};
pub use hardware::{channel_name, hardware_metadata, EEG_SYSTEM_SECTION, HARDWARE_SECTION};
pub use offset::{OffsetResolver, PRIMARY_STREAM, SECONDARY_STREAM};
pub use property::{
    catalog, PropertyChannel, PropertyChannelBuilder, PropertyDescriptor, PROPERTY_KIND,
};
pub use session::ContainerSession;
pub use time_base::sampling_strategy;
