//! Spoolman REST API client (`/api/v1`).

use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::{Inventory, Submitted};
use crate::domain::EnrichedRecord;
use crate::error::SubmissionError;

pub const DEFAULT_SPOOLMAN_URL: &str = "http://localhost:7912";

/// Body of `POST /api/v1/filament`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilamentPayload {
    pub vendor_id: i64,
    pub name: String,
    pub material: String,
    pub diameter: f64,
    pub weight: f64,
    pub price: f64,
    pub density: f64,
    pub spool_weight: f64,
    pub settings_extruder_temp: u32,
    pub settings_bed_temp: u32,
    pub comment: String,
}

/// Body of `POST /api/v1/spool`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpoolPayload {
    pub filament_id: i64,
    pub remaining_weight: f64,
    pub used_weight: f64,
    pub spool_weight: f64,
    pub comment: String,
}

#[derive(Debug, Serialize)]
struct VendorPayload<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct VendorReply {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct Created {
    id: Option<i64>,
}

pub struct SpoolmanClient {
    client: Client,
    base_url: String,
    import_date: NaiveDate,
    /// Lowercased vendor name → id, filled as vendors are resolved.
    vendor_ids: HashMap<String, i64>,
}

impl SpoolmanClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            import_date: Local::now().date_naive(),
            vendor_ids: HashMap::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{path}", self.base_url)
    }

    /// Find a vendor by name (case-insensitive) or create it.
    pub fn vendor_id(&mut self, name: &str) -> Result<i64, SubmissionError> {
        let key = name.trim().to_lowercase();
        if let Some(id) = self.vendor_ids.get(&key) {
            return Ok(*id);
        }

        let resp = self
            .client
            .get(self.url("vendor"))
            .send()
            .map_err(|e| SubmissionError::Request(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(SubmissionError::Rejected {
                what: "vendor list",
                status: resp.status().as_u16(),
            });
        }
        let vendors: Vec<VendorReply> = resp
            .json()
            .map_err(|e| SubmissionError::Request(format!("failed to parse vendor list: {e}")))?;

        let id = match vendors.iter().find(|v| v.name.trim().to_lowercase() == key) {
            Some(vendor) => {
                debug!(vendor = %vendor.name, id = vendor.id, "found vendor");
                vendor.id
            }
            None => {
                let id = self.post_for_id("vendor", &VendorPayload { name: name.trim() }, "vendor")?;
                info!(vendor = %name.trim(), id, "created vendor");
                id
            }
        };

        self.vendor_ids.insert(key, id);
        Ok(id)
    }

    fn post_for_id<T: Serialize>(&self, path: &str, body: &T, what: &'static str) -> Result<i64, SubmissionError> {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .map_err(|e| SubmissionError::Request(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(SubmissionError::Rejected {
                what,
                status: resp.status().as_u16(),
            });
        }
        let created: Created = resp
            .json()
            .map_err(|e| SubmissionError::Request(format!("failed to parse {what} reply: {e}")))?;
        created.id.ok_or(SubmissionError::MissingId(what))
    }
}

impl Inventory for SpoolmanClient {
    fn submit(&mut self, record: &EnrichedRecord, vendor_name: &str) -> Result<Submitted, SubmissionError> {
        let vendor_id = self.vendor_id(vendor_name)?;

        let filament = filament_payload(record, vendor_id, self.import_date);
        let filament_id = self.post_for_id("filament", &filament, "filament")?;
        debug!(filament = %filament.name, id = filament_id, "created filament");

        let mut spool_ids = Vec::with_capacity(record.quantity as usize);
        for spool in spool_payloads(record, filament_id) {
            let id = self.post_for_id("spool", &spool, "spool")?;
            info!(spool = %spool.comment, filament = %filament.name, id, "created spool");
            spool_ids.push(id);
        }

        Ok(Submitted {
            vendor_id,
            filament_id,
            spool_ids,
        })
    }
}

pub fn filament_payload(record: &EnrichedRecord, vendor_id: i64, date: NaiveDate) -> FilamentPayload {
    FilamentPayload {
        vendor_id,
        name: record.display_name(),
        material: record.material.clone(),
        diameter: record.diameter,
        weight: record.weight,
        price: record.price,
        density: record.density,
        spool_weight: record.spool_weight,
        settings_extruder_temp: record.extruder_temp,
        settings_bed_temp: record.bed_temp,
        comment: build_comment(record, date),
    }
}

/// One spool per unit bought, each starting full.
pub fn spool_payloads(record: &EnrichedRecord, filament_id: i64) -> Vec<SpoolPayload> {
    (1..=record.quantity)
        .map(|i| SpoolPayload {
            filament_id,
            remaining_weight: record.weight,
            used_weight: 0.0,
            spool_weight: record.spool_weight,
            comment: format!("Spool {i} of {}", record.quantity),
        })
        .collect()
}

pub fn build_comment(record: &EnrichedRecord, date: NaiveDate) -> String {
    let mut parts = vec![
        format!("Imported from receipt on {}", date.format("%Y-%m-%d")),
        format!(
            "Recommended temps: {}°C/{}°C",
            record.extruder_temp, record.bed_temp
        ),
    ];
    if !record.description.trim().is_empty() {
        parts.push(record.description.clone());
    }
    parts.join(" | ")
}
