//! JSON record ingest.
//!
//! Accepts either a bare array of record objects or an object wrapping them in a
//! `filaments` array. Items that are not objects are reported and skipped; the
//! rest of the file still loads.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::warn;

use crate::domain::RecordInput;
use crate::error::{AppError, EXIT_INPUT};

/// An item-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordError {
    /// 0-based position of the item in the input.
    pub index: usize,
    pub message: String,
}

/// Ingest output: the readable records plus what was skipped.
#[derive(Debug, Clone, Default)]
pub struct IngestedRecords {
    pub inputs: Vec<RecordInput>,
    pub errors: Vec<RecordError>,
    pub items_read: usize,
}

/// Load records from a JSON file.
pub fn load_records_json(path: &Path) -> Result<IngestedRecords, AppError> {
    let json = fs::read_to_string(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to open JSON '{}': {e}", path.display()),
        )
    })?;
    parse_records_json(&json)
}

/// Parse a JSON document of records.
pub fn parse_records_json(json: &str) -> Result<IngestedRecords, AppError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Invalid JSON format: {e}")))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("filaments") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(AppError::new(
                    EXIT_INPUT,
                    "JSON should be an array of filaments or an object with a \"filaments\" array.",
                ));
            }
        },
        _ => {
            return Err(AppError::new(
                EXIT_INPUT,
                "JSON should be an array of filaments or an object with a \"filaments\" array.",
            ));
        }
    };

    let mut out = IngestedRecords {
        items_read: items.len(),
        ..IngestedRecords::default()
    };

    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            warn!(index, "skipping filament entry that is not an object");
            out.errors.push(RecordError {
                index,
                message: "not a JSON object".to_string(),
            });
            continue;
        }
        match serde_json::from_value::<RecordInput>(item) {
            Ok(input) => out.inputs.push(input),
            Err(e) => {
                warn!(index, error = %e, "skipping unreadable filament entry");
                out.errors.push(RecordError {
                    index,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(out)
}
