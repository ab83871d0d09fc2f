//! Inventory submission.
//!
//! The pipeline hands over one `EnrichedRecord` at a time through the
//! `Inventory` trait; `SpoolmanClient` is the real implementation.

pub mod spoolman;

pub use spoolman::*;

use crate::domain::EnrichedRecord;
use crate::error::SubmissionError;

/// Ids created in the inventory for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub vendor_id: i64,
    pub filament_id: i64,
    pub spool_ids: Vec<i64>,
}

/// Something that can store enriched records.
pub trait Inventory {
    /// Create the vendor (if needed), the filament, and one spool per unit bought.
    fn submit(&mut self, record: &EnrichedRecord, vendor_name: &str) -> Result<Submitted, SubmissionError>;
}
