//! Error types.
//!
//! `AppError` is what the binary reports: a message plus the process exit code.
//! The component errors below are recovered locally where the pipeline allows it
//! and only become an `AppError` when a run cannot continue.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code: the run finished but nothing was imported.
pub const EXIT_NOTHING_IMPORTED: u8 = 1;
/// Exit code: bad input file, bad vendor data, bad configuration.
pub const EXIT_INPUT: u8 = 2;
/// Exit code: the input contained no usable filament records.
pub const EXIT_NO_RECORDS: u8 = 3;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// A record that cannot be imported as given. The record is skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("quantity must be at least 1 (got {0})")]
    Quantity(i64),

    #[error("weight must be a positive number of grams (got {0})")]
    Weight(f64),

    #[error("diameter must be a positive number of millimetres (got {0})")]
    Diameter(f64),

    #[error("price must be a finite number (got {0})")]
    Price(f64),
}

/// The vendor database file is missing or malformed.
#[derive(Error, Debug)]
pub enum VendorDataError {
    #[error("failed to read vendor data '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid vendor data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid vendor data: {0}")]
    Schema(String),
}

/// The text-understanding service could not produce records.
///
/// Always recovered inside the extraction chain.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("extraction service request failed: {0}")]
    Request(String),

    #[error("extraction service returned status {0}")]
    Status(u16),

    #[error("extraction service returned an unusable reply: {0}")]
    InvalidResponse(String),
}

/// One record could not be written to the inventory.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("inventory request failed: {0}")]
    Request(String),

    #[error("inventory rejected {what} with status {status}")]
    Rejected { what: &'static str, status: u16 },

    #[error("inventory reply for {0} had no id")]
    MissingId(&'static str),
}

impl From<VendorDataError> for AppError {
    fn from(err: VendorDataError) -> Self {
        AppError::new(EXIT_INPUT, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_data_error_maps_to_input_exit_code() {
        let err = VendorDataError::Schema("missing \"vendors\" object".to_string());
        let app: AppError = err.into();
        assert_eq!(app.exit_code(), EXIT_INPUT);
        assert!(app.message().contains("vendors"));
    }

    #[test]
    fn validation_messages_name_the_field() {
        assert!(ValidationError::Quantity(0).to_string().contains("quantity"));
        assert!(ValidationError::Weight(-1.0).to_string().contains("weight"));
    }
}
