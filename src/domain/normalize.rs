//! Record normalization: fill documented defaults, reject unusable records.

use crate::domain::{RawRecord, RecordInput};
use crate::error::ValidationError;

pub const DEFAULT_BRAND: &str = "Unknown";
pub const DEFAULT_MATERIAL: &str = "PLA";
pub const DEFAULT_COLOR: &str = "Unknown";
pub const DEFAULT_DIAMETER_MM: f64 = 1.75;
pub const DEFAULT_WEIGHT_G: f64 = 1000.0;
pub const DEFAULT_PRICE: f64 = 0.0;
pub const DEFAULT_QUANTITY: i64 = 1;

/// Fill every absent field with its default and validate the result.
///
/// Blank strings count as absent. A non-positive spool weight counts as absent,
/// so the enrichment data supplies it instead.
pub fn normalize(input: &RecordInput) -> Result<RawRecord, ValidationError> {
    let quantity = input.quantity.unwrap_or(DEFAULT_QUANTITY);
    if quantity < 1 {
        return Err(ValidationError::Quantity(quantity));
    }
    let quantity = u32::try_from(quantity).map_err(|_| ValidationError::Quantity(quantity))?;

    let weight = input.weight.unwrap_or(DEFAULT_WEIGHT_G);
    if !(weight.is_finite() && weight > 0.0) {
        return Err(ValidationError::Weight(weight));
    }

    let diameter = input.diameter.unwrap_or(DEFAULT_DIAMETER_MM);
    if !(diameter.is_finite() && diameter > 0.0) {
        return Err(ValidationError::Diameter(diameter));
    }

    let price = input.price.unwrap_or(DEFAULT_PRICE);
    if !price.is_finite() {
        return Err(ValidationError::Price(price));
    }

    let spool_weight = input
        .spool_weight
        .filter(|w| w.is_finite() && *w > 0.0);

    Ok(RawRecord {
        brand: text_or(&input.brand, DEFAULT_BRAND),
        material: text_or(&input.material, DEFAULT_MATERIAL),
        color: text_or(&input.color, DEFAULT_COLOR),
        diameter,
        weight,
        price,
        quantity,
        spool_weight,
    })
}

fn text_or(value: &Option<String>, default: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => default.to_string(),
    }
}
