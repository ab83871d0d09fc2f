//! Terminal formatting.
//!
//! All operator-facing text is built here so the pipeline stays presentation-free.

use crate::app::pipeline::{ImportRun, Prepared};
use crate::domain::EnrichedRecord;

/// One preview line per record.
///
/// `Bambu Lab PLA Basic Galaxy Black - 24.99€ (spool: 260g) (ext: 220°C, bed: 55°C) [vendor]`
pub fn format_record_line(record: &EnrichedRecord) -> String {
    let mut line = format!("{} - {:.2}€", record.display_name(), record.price);
    if record.quantity > 1 {
        line.push_str(&format!(" x{}", record.quantity));
    }
    line.push_str(&format!(
        " (spool: {}g) (ext: {}°C, bed: {}°C) [{}]",
        fmt_grams(record.spool_weight),
        record.extruder_temp,
        record.bed_temp,
        record.source
    ));
    line
}

/// The list shown after resolution and before anything is submitted.
pub fn format_preview(prepared: &Prepared) -> String {
    let mut out = String::new();

    out.push_str(&format!("Found {} filament(s):\n", prepared.enriched.len()));
    for (idx, record) in prepared.enriched.iter().enumerate() {
        out.push_str(&format!("{:>3}. {}\n", idx + 1, format_record_line(record)));
    }

    if !prepared.skipped.is_empty() {
        out.push_str(&format!("\nSkipped {} entr(ies):\n", prepared.skipped.len()));
        for err in &prepared.skipped {
            out.push_str(&format!("  - #{}: {}\n", err.index + 1, err.message));
        }
    }

    if let Some(idx) = prepared.stopped_at {
        let dropped = prepared.valid - idx;
        out.push_str(&format!(
            "\nImport stopped at filament {}; {dropped} filament(s) not processed.\n",
            idx + 1
        ));
    }

    out.trim_end().to_string()
}

/// Per-record results plus the `x/y` total.
pub fn format_import_summary(run: &ImportRun) -> String {
    let mut out = String::new();
    for outcome in &run.outcomes {
        match &outcome.result {
            Ok(submitted) => out.push_str(&format!(
                "  ok   {} (filament #{}, {} spool(s))\n",
                outcome.name,
                submitted.filament_id,
                submitted.spool_ids.len()
            )),
            Err(err) => out.push_str(&format!("  FAIL {}: {err}\n", outcome.name)),
        }
    }
    out.push_str(&format!(
        "\nSuccessfully imported {}/{} filament(s)",
        run.succeeded(),
        run.attempted()
    ));
    out
}

fn fmt_grams(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}
