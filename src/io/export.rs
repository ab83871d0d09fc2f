//! Preview export: the resolved filaments as JSON.
//!
//! Written for dry runs so the operator can review (or hand-edit and re-import)
//! exactly what would be submitted.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::EnrichedRecord;
use crate::error::{AppError, EXIT_INPUT};

#[derive(Debug, Serialize)]
struct Preview<'a> {
    filaments: &'a [EnrichedRecord],
}

/// Write `{"filaments": [...]}` to `path`.
pub fn write_preview_json(path: &Path, records: &[EnrichedRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to create preview JSON '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, &Preview { filaments: records })
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write preview JSON: {e}")))?;
    writeln!(writer).map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write preview JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write preview JSON: {e}")))?;

    Ok(())
}
