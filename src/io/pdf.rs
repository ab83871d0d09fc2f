//! PDF receipt text.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{AppError, EXIT_INPUT};

/// Extract the text layer of a PDF, pages joined in order.
pub fn read_pdf_text(path: &Path) -> Result<String, AppError> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to open PDF '{}': {e}", path.display())))?;
    pdf_text_from_bytes(&bytes)
        .map_err(|msg| AppError::new(EXIT_INPUT, format!("Failed to read PDF '{}': {msg}", path.display())))
}

fn pdf_text_from_bytes(bytes: &[u8]) -> Result<String, String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| e.to_string())?;
    debug!(pages = pages.len(), "extracted PDF text");
    Ok(pages.join("\n"))
}
