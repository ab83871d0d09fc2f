//! Shared domain types.
//!
//! The record types follow a record through the pipeline:
//!
//! - `RecordInput`: whatever the JSON file or the receipt extractor produced
//! - `RawRecord`: the same record with every scalar default filled in
//! - `EnrichedRecord`: a `RawRecord` plus resolved spool/print settings

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A purchase line item as read from input, before defaults are applied.
///
/// Numeric fields accept JSON numbers or numeric strings (`"24.99"`, `"24,99"`);
/// anything that does not read as a number is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecordInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub material: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub diameter: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub spool_weight: Option<f64>,
}

/// A normalized purchase line item. Never mutated after normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecord {
    pub brand: String,
    pub material: String,
    pub color: String,
    /// Filament diameter in mm.
    pub diameter: f64,
    /// Net filament weight in grams.
    pub weight: f64,
    /// Unit price.
    pub price: f64,
    pub quantity: u32,
    /// Empty spool weight in grams, when the input states it.
    pub spool_weight: Option<f64>,
}

impl From<RawRecord> for RecordInput {
    fn from(record: RawRecord) -> Self {
        Self {
            brand: Some(record.brand),
            material: Some(record.material),
            color: Some(record.color),
            diameter: Some(record.diameter),
            weight: Some(record.weight),
            price: Some(record.price),
            quantity: Some(i64::from(record.quantity)),
            spool_weight: record.spool_weight,
        }
    }
}

/// Physical and thermal settings for one material.
///
/// Used both for vendor-specific entries and for the built-in material defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    /// Empty spool weight in grams.
    pub spool_weight: u32,
    pub extruder_temp: u32,
    pub bed_temp: u32,
    /// g/cm³
    pub density: f64,
    pub description: String,
}

/// Which strategy supplied a record's enrichment data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Matched in the vendor database.
    Vendor,
    /// Material default applied without asking anyone.
    Default,
    /// Material default picked by the operator.
    Interactive,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Provenance::Vendor => "vendor",
            Provenance::Default => "default",
            Provenance::Interactive => "interactive",
        };
        f.write_str(label)
    }
}

/// A fully specified record, ready for the inventory client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub brand: String,
    pub material: String,
    pub color: String,
    pub diameter: f64,
    pub weight: f64,
    pub price: f64,
    pub quantity: u32,
    pub spool_weight: f64,
    pub extruder_temp: u32,
    pub bed_temp: u32,
    pub density: f64,
    pub description: String,
    pub source: Provenance,
}

impl EnrichedRecord {
    /// Combine a record with a resolved spec. An explicit spool weight on the
    /// record always wins over the spec's.
    pub fn from_parts(record: &RawRecord, spec: &MaterialSpec, source: Provenance) -> Self {
        Self {
            brand: record.brand.clone(),
            material: record.material.clone(),
            color: record.color.clone(),
            diameter: record.diameter,
            weight: record.weight,
            price: record.price,
            quantity: record.quantity,
            spool_weight: record
                .spool_weight
                .unwrap_or_else(|| f64::from(spec.spool_weight)),
            extruder_temp: spec.extruder_temp,
            bed_temp: spec.bed_temp,
            density: spec.density,
            description: spec.description.clone(),
            source,
        }
    }

    /// Inventory display name, e.g. `Bambu Lab PLA Basic Galaxy Black`.
    pub fn display_name(&self) -> String {
        format!("{} {} {}", self.brand, self.material, self.color)
    }
}

/// Where the purchase records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Json(PathBuf),
    Pdf(PathBuf),
}

/// Settings for the structured extraction service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// A full run's configuration as understood by the pipeline.
///
/// Derived from CLI flags and the environment.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub input: InputSource,
    pub vendor_data: PathBuf,
    pub spoolman_url: String,
    /// Inventory vendor name for every record; the record's brand when unset.
    pub vendor_override: Option<String>,
    /// `None` when no API key is configured.
    pub llm: Option<LlmSettings>,
    pub dry_run: bool,
    /// Whether the operator may be asked about unknown filaments.
    pub interactive: bool,
    pub preview_json: Option<PathBuf>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_from_value)
        .map(|v| v.trunc() as i64))
}

fn number_from_value(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_number(s)?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Parse a number that may use a decimal comma (`24,99`).
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .or_else(|| trimmed.replace(',', ".").parse::<f64>().ok())
}
