//! Shared import workflow.
//!
//! read inputs -> normalize -> enrich (in order, may stop) -> submit
//!
//! Presentation (preview, summary, prompts) stays in `app` and `report`; the
//! functions here take their collaborators as trait objects so tests can drive
//! the whole flow without a terminal or a network.

use tracing::{info, warn};

use crate::api::{Inventory, Submitted};
use crate::domain::{EnrichedRecord, ImportConfig, InputSource, normalize};
use crate::enrich::{Disambiguator, enrich_all};
use crate::error::{AppError, EXIT_NO_RECORDS, EXIT_NOTHING_IMPORTED, SubmissionError};
use crate::extract::ExtractionChain;
use crate::io::{IngestedRecords, RecordError, load_records_json, read_pdf_text};
use crate::vendor::VendorDb;

/// Everything resolved before submission.
#[derive(Debug, Clone, Default)]
pub struct Prepared {
    /// Records that passed normalization.
    pub valid: usize,
    /// Input items that were unreadable or failed validation.
    pub skipped: Vec<RecordError>,
    pub enriched: Vec<EnrichedRecord>,
    /// Position (among valid records) where the operator stopped.
    pub stopped_at: Option<usize>,
}

/// Result of submitting one record.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub name: String,
    pub result: Result<Submitted, SubmissionError>,
}

#[derive(Debug, Default)]
pub struct ImportRun {
    pub outcomes: Vec<SubmissionOutcome>,
}

impl ImportRun {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }
}

/// Read raw records from the configured input.
pub fn gather_inputs(config: &ImportConfig, db: &VendorDb) -> Result<IngestedRecords, AppError> {
    match &config.input {
        InputSource::Json(path) => load_records_json(path),
        InputSource::Pdf(path) => {
            let text = read_pdf_text(path)?;
            let chain = ExtractionChain::standard(config.llm.as_ref(), db.vendor_names());
            Ok(extract_from_text(&chain, &text))
        }
    }
}

pub fn extract_from_text(chain: &ExtractionChain, text: &str) -> IngestedRecords {
    let inputs = chain.extract(text);
    IngestedRecords {
        items_read: inputs.len(),
        inputs,
        errors: Vec::new(),
    }
}

/// Normalize and enrich every readable record.
pub fn prepare(
    ingested: IngestedRecords,
    db: &mut VendorDb,
    disambiguator: &mut dyn Disambiguator,
) -> Result<Prepared, AppError> {
    let mut skipped = ingested.errors;
    let mut records = Vec::with_capacity(ingested.inputs.len());

    for (index, input) in ingested.inputs.iter().enumerate() {
        match normalize(input) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(index, error = %e, "skipping invalid filament");
                skipped.push(RecordError {
                    index,
                    message: e.to_string(),
                });
            }
        }
    }

    if records.is_empty() {
        return Err(AppError::new(EXIT_NO_RECORDS, "No filaments found in input."));
    }
    info!(valid = records.len(), skipped = skipped.len(), "records normalized");

    let outcome = enrich_all(&records, db, disambiguator)?;
    if let Some(idx) = outcome.stopped_at {
        warn!(
            at = idx + 1,
            kept = outcome.enriched.len(),
            "import stopped by operator"
        );
    }

    Ok(Prepared {
        valid: records.len(),
        skipped,
        enriched: outcome.enriched,
        stopped_at: outcome.stopped_at,
    })
}

/// Submit records one by one; a failure is recorded and the batch continues.
pub fn submit_all(
    records: &[EnrichedRecord],
    inventory: &mut dyn Inventory,
    vendor_override: Option<&str>,
) -> ImportRun {
    let mut run = ImportRun::default();
    for record in records {
        let vendor = vendor_override.unwrap_or(&record.brand);
        let result = inventory.submit(record, vendor);
        match &result {
            Ok(submitted) => info!(
                filament = %record.display_name(),
                spools = submitted.spool_ids.len(),
                "imported"
            ),
            Err(e) => warn!(filament = %record.display_name(), error = %e, "import failed"),
        }
        run.outcomes.push(SubmissionOutcome {
            name: record.display_name(),
            result,
        });
    }
    run
}

/// Map a finished run to the process result.
pub fn check_imported(run: &ImportRun) -> Result<(), AppError> {
    if run.succeeded() == 0 {
        return Err(AppError::new(EXIT_NOTHING_IMPORTED, "No filaments were imported."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs;

    use super::*;
    use crate::domain::{Provenance, RecordInput};
    use crate::enrich::{BatchPolicy, Decision, Scripted};
    use crate::extract::ExtractionStrategy;
    use crate::extract::patterns::PatternExtractor;
    use crate::io::parse_records_json;

    const VENDOR_DATA: &str = r#"{"vendors": {
        "Bambu Lab": {
            "PLA Basic": {"spool_weight": 260, "extruder_temp": 220, "bed_temp": 55, "density": 1.24, "description": "Bambu Lab PLA Basic"}
        }
    }}"#;

    fn vendor_db() -> (tempfile::TempDir, VendorDb) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vendor-data.json");
        fs::write(&path, VENDOR_DATA).unwrap();
        let db = VendorDb::from_file(&path).unwrap();
        (dir, db)
    }

    /// Records every submission; fails for the names it is told to.
    #[derive(Default)]
    struct FakeInventory {
        fail_for: HashSet<String>,
        submitted: Vec<(String, String)>,
    }

    impl Inventory for FakeInventory {
        fn submit(&mut self, record: &EnrichedRecord, vendor_name: &str) -> Result<Submitted, SubmissionError> {
            if self.fail_for.contains(&record.display_name()) {
                return Err(SubmissionError::Rejected {
                    what: "filament",
                    status: 500,
                });
            }
            self.submitted.push((record.display_name(), vendor_name.to_string()));
            let n = self.submitted.len() as i64;
            Ok(Submitted {
                vendor_id: 1,
                filament_id: n,
                spool_ids: (0..record.quantity as i64).map(|i| n * 10 + i).collect(),
            })
        }
    }

    #[test]
    fn known_vendor_material_is_enriched_from_the_database() {
        let (_dir, mut db) = vendor_db();
        let ingested = parse_records_json(
            r#"[{"brand": "Bambu Lab", "material": "PLA Basic", "color": "Galaxy Black", "price": 24.99}]"#,
        )
        .unwrap();
        let mut prompt = Scripted::default();

        let prepared = prepare(ingested, &mut db, &mut prompt).unwrap();
        assert_eq!(prompt.asked(), 0);
        let record = &prepared.enriched[0];
        assert_eq!(record.spool_weight, 260.0);
        assert_eq!(record.extruder_temp, 220);
        assert_eq!(record.bed_temp, 55);
        assert_eq!(record.weight, 1000.0);
        assert_eq!(record.diameter, 1.75);
        assert_eq!(record.quantity, 1);
        assert_eq!(record.source, Provenance::Vendor);
    }

    #[test]
    fn unknown_vendor_in_batch_mode_gets_material_default() {
        let (_dir, mut db) = vendor_db();
        let ingested =
            parse_records_json(r#"[{"brand": "Acme", "material": "PETG", "color": "Blue"}]"#).unwrap();

        let prepared = prepare(ingested, &mut db, &mut BatchPolicy).unwrap();
        let record = &prepared.enriched[0];
        assert_eq!(record.extruder_temp, 240);
        assert_eq!(record.bed_temp, 80);
        assert_eq!(record.source, Provenance::Default);
    }

    #[test]
    fn stop_keeps_earlier_records_for_submission() {
        let (_dir, mut db) = vendor_db();
        let ingested = parse_records_json(
            r#"[
                {"brand": "Bambu Lab", "material": "PLA Basic", "color": "Red"},
                {"brand": "Acme", "material": "PLA", "color": "Blue"},
                {"brand": "Bambu Lab", "material": "PLA Basic", "color": "White"}
            ]"#,
        )
        .unwrap();
        let mut prompt = Scripted::new([Decision::Stop]);

        let prepared = prepare(ingested, &mut db, &mut prompt).unwrap();
        assert_eq!(prepared.stopped_at, Some(1));
        assert_eq!(prepared.enriched.len(), 1);

        let mut inventory = FakeInventory::default();
        let run = submit_all(&prepared.enriched, &mut inventory, None);
        assert_eq!(run.succeeded(), 1);
        assert_eq!(inventory.submitted[0].0, "Bambu Lab PLA Basic Red");
    }

    #[test]
    fn invalid_records_are_skipped_not_fatal() {
        let (_dir, mut db) = vendor_db();
        let ingested = parse_records_json(
            r#"[{"material": "PLA", "quantity": 0}, "junk", {"material": "ABS", "weight": 500}]"#,
        )
        .unwrap();

        let prepared = prepare(ingested, &mut db, &mut BatchPolicy).unwrap();
        assert_eq!(prepared.valid, 1);
        assert_eq!(prepared.skipped.len(), 2);
        assert_eq!(prepared.enriched[0].material, "ABS");
        assert_eq!(prepared.enriched[0].weight, 500.0);
    }

    #[test]
    fn nothing_readable_is_no_records() {
        let (_dir, mut db) = vendor_db();
        let err = prepare(IngestedRecords::default(), &mut db, &mut BatchPolicy).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_NO_RECORDS);
    }

    #[test]
    fn submission_failure_does_not_abort_the_batch() {
        let (_dir, mut db) = vendor_db();
        let ingested = parse_records_json(
            r#"[
                {"brand": "Acme", "material": "PLA", "color": "Red"},
                {"brand": "Acme", "material": "PLA", "color": "Blue", "quantity": 3}
            ]"#,
        )
        .unwrap();
        let prepared = prepare(ingested, &mut db, &mut BatchPolicy).unwrap();

        let mut inventory = FakeInventory {
            fail_for: HashSet::from(["Acme PLA Red".to_string()]),
            ..FakeInventory::default()
        };
        let run = submit_all(&prepared.enriched, &mut inventory, Some("Acme GmbH"));

        assert_eq!(run.attempted(), 2);
        assert_eq!(run.succeeded(), 1);
        assert!(run.outcomes[0].result.is_err());
        assert_eq!(run.outcomes[1].result.as_ref().unwrap().spool_ids.len(), 3);
        assert_eq!(inventory.submitted, vec![("Acme PLA Blue".to_string(), "Acme GmbH".to_string())]);
        assert!(check_imported(&run).is_ok());
    }

    #[test]
    fn all_submissions_failing_is_nothing_imported() {
        let mut inventory = FakeInventory {
            fail_for: HashSet::from(["Acme PLA Red".to_string()]),
            ..FakeInventory::default()
        };
        let record = EnrichedRecord {
            brand: "Acme".to_string(),
            material: "PLA".to_string(),
            color: "Red".to_string(),
            diameter: 1.75,
            weight: 1000.0,
            price: 19.0,
            quantity: 1,
            spool_weight: 250.0,
            extruder_temp: 210,
            bed_temp: 60,
            density: 1.24,
            description: String::new(),
            source: Provenance::Default,
        };
        let run = submit_all(&[record], &mut inventory, None);
        assert_eq!(check_imported(&run).unwrap_err().exit_code(), EXIT_NOTHING_IMPORTED);
    }

    struct Unavailable;

    impl ExtractionStrategy for Unavailable {
        fn name(&self) -> &'static str {
            "unavailable"
        }

        fn extract(&self, _text: &str) -> Result<Vec<RecordInput>, crate::error::ExtractionError> {
            Err(crate::error::ExtractionError::Status(503))
        }
    }

    #[test]
    fn pdf_text_without_filaments_yields_no_records() {
        let (_dir, mut db) = vendor_db();
        let strategies: Vec<Box<dyn ExtractionStrategy>> = vec![
            Box::new(Unavailable),
            Box::new(PatternExtractor::new(db.vendor_names())),
        ];
        let chain = ExtractionChain::new(strategies);

        let ingested = extract_from_text(&chain, "Invoice 2024-117\nShipping 4.99 EUR\nThank you!");
        assert!(ingested.inputs.is_empty());
        let err = prepare(ingested, &mut db, &mut BatchPolicy).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_NO_RECORDS);
    }
}
