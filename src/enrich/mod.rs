//! Enrichment: resolve each record's spool and print settings.
//!
//! Resolution for one record is a small state machine:
//!
//! ```text
//! Resolving --hit--> Enriched
//! Resolving --miss--> AwaitingOperator
//! AwaitingOperator --reload--> Reloading --> Resolving   (once per record)
//! AwaitingOperator --choice/fallback--> Enriched
//! AwaitingOperator --stop--> Stopped
//! ```
//!
//! A vendor hit never reaches the operator, and an explicit spool weight on the
//! record always beats the looked-up one.

use tracing::{debug, info, warn};

use crate::catalog::{self, DefaultMaterial};
use crate::domain::{EnrichedRecord, MaterialSpec, Provenance, RawRecord};
use crate::error::AppError;
use crate::vendor::VendorDb;

pub mod disambiguate;

pub use disambiguate::{BatchPolicy, Decision, Disambiguator, Question, Scripted, parse_decision};

/// Outcome of resolving one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Enriched(EnrichedRecord),
    /// The operator aborted the batch.
    Stopped,
}

/// Outcome of resolving a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Records enriched before the batch finished or stopped, in input order.
    pub enriched: Vec<EnrichedRecord>,
    /// Index of the record at which the operator stopped, if they did.
    pub stopped_at: Option<usize>,
}

impl BatchOutcome {
    pub fn stopped(&self) -> bool {
        self.stopped_at.is_some()
    }
}

enum State {
    Resolving { reloaded: bool },
    AwaitingOperator { reloaded: bool },
    Reloading,
    Enriched(MaterialSpec, Provenance),
    Stopped,
}

/// Resolve one record against the vendor database, asking the disambiguator on a miss.
pub fn enrich(
    record: &RawRecord,
    db: &mut VendorDb,
    disambiguator: &mut dyn Disambiguator,
) -> Result<Resolution, AppError> {
    let candidates = catalog::defaults();
    let mut state = State::Resolving { reloaded: false };

    loop {
        state = match state {
            State::Resolving { reloaded } => match db.lookup(&record.brand, &record.material) {
                Some(spec) => State::Enriched(spec.clone(), Provenance::Vendor),
                None => {
                    debug!(brand = %record.brand, material = %record.material, reloaded, "no vendor data");
                    State::AwaitingOperator { reloaded }
                }
            },

            State::AwaitingOperator { reloaded } => {
                let known_vendors = db.vendor_names();
                let question = Question {
                    brand: &record.brand,
                    material: &record.material,
                    candidates,
                    known_vendors: &known_vendors,
                    allow_reload: !reloaded,
                };
                match disambiguator.ask(&question)? {
                    Decision::Reload if !reloaded => State::Reloading,
                    Decision::Reload => {
                        warn!(
                            brand = %record.brand,
                            material = %record.material,
                            "vendor data was already reloaded for this record, applying material default"
                        );
                        fallback(record)
                    }
                    Decision::Stop => State::Stopped,
                    Decision::Choose(n) => match n.checked_sub(1).and_then(|i| candidates.get(i)) {
                        Some(entry) => {
                            info!(brand = %record.brand, material = %record.material, catalog_entry = entry.name, "using chosen material default");
                            State::Enriched(default_spec(entry, record), Provenance::Interactive)
                        }
                        None => {
                            warn!(choice = n, "material default choice out of range, applying material default");
                            fallback(record)
                        }
                    },
                    Decision::Fallback => fallback(record),
                }
            }

            State::Reloading => {
                if let Err(err) = db.reload() {
                    warn!(error = %err, "vendor data reload failed, keeping the previous data");
                }
                State::Resolving { reloaded: true }
            }

            State::Enriched(spec, source) => {
                return Ok(Resolution::Enriched(EnrichedRecord::from_parts(record, &spec, source)));
            }

            State::Stopped => {
                info!(brand = %record.brand, material = %record.material, "import stopped by operator");
                return Ok(Resolution::Stopped);
            }
        };
    }
}

/// Resolve records strictly in order, stopping at the first operator stop.
pub fn enrich_all(
    records: &[RawRecord],
    db: &mut VendorDb,
    disambiguator: &mut dyn Disambiguator,
) -> Result<BatchOutcome, AppError> {
    let mut outcome = BatchOutcome::default();
    for (idx, record) in records.iter().enumerate() {
        match enrich(record, db, disambiguator)? {
            Resolution::Enriched(enriched) => outcome.enriched.push(enriched),
            Resolution::Stopped => {
                outcome.stopped_at = Some(idx);
                break;
            }
        }
    }
    Ok(outcome)
}

fn fallback(record: &RawRecord) -> State {
    let entry = catalog::by_material(&record.material);
    debug!(brand = %record.brand, material = %record.material, catalog_entry = entry.name, "applying material default");
    State::Enriched(default_spec(entry, record), Provenance::Default)
}

fn default_spec(entry: &DefaultMaterial, record: &RawRecord) -> MaterialSpec {
    let label = if entry.name == catalog::GENERIC.name {
        "generic"
    } else {
        entry.name
    };
    MaterialSpec {
        description: format!("Using {label} defaults for {} {}", record.brand, record.material),
        ..entry.spec()
    }
}
