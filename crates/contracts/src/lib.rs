//! # Contracts
//!
//! Shared data structures and traits for the stream aligner.
//! All business crates depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Primary stream (biosignal amplifier): seconds, f64, uniform nominal rate
//! - Secondary stream (eye tracker event log): device-native unit, microseconds by default
//! - A per-stream `ClockOffset` is subtracted from raw timestamps to reach the common axis

mod alignment_config;
mod container;
mod diagnostics;
mod error;
mod metadata;
mod offsets;
mod record;
mod store;
mod stream;
mod units;

pub use alignment_config::*;
pub use container::*;
pub use diagnostics::*;
pub use error::*;
pub use metadata::{MetadataNode, MetadataValue};
pub use offsets::*;
pub use record::*;
pub use store::AnnotatedStore;
pub use stream::*;
pub use units::TimeUnit;
