//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the record types a purchase line passes through (`RecordInput`, `RawRecord`,
//!   `EnrichedRecord`)
//! - material specs and their provenance
//! - the run configuration (`ImportConfig`)
//! - record normalization (`normalize`)

pub mod normalize;
pub mod types;

pub use normalize::normalize;
pub use types::*;
