//! File I/O helpers.
//!
//! - JSON record ingest (`ingest`)
//! - PDF text extraction (`pdf`)
//! - dry-run preview export (`export`)

pub mod export;
pub mod ingest;
pub mod pdf;

pub use export::*;
pub use ingest::*;
pub use pdf::*;
