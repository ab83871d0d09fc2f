//! Pattern-matching extraction for receipts.
//!
//! Works line by line. A line becomes a record when it names a material code
//! and carries a price or a weight; every other field is taken when present
//! and left for normalization otherwise. This path never fails.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{RecordInput, parse_number};
use crate::error::ExtractionError;
use crate::extract::ExtractionStrategy;

static MATERIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(PETG|PLA|ABS|ASA|TPU|WOOD|SILK)\b(\+)?").expect("material pattern"));

static PRICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:(?:€|\$|£|\bEUR|\bUSD|\bGBP)\s*(\d{1,6}(?:[.,]\d{1,2})?)|(\d{1,6}(?:[.,]\d{1,2})?)\s*(?:€|\$|£|EUR\b|USD\b|GBP\b))",
    )
    .expect("price pattern")
});

static WEIGHT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,4}(?:[.,]\d{1,3})?)\s*(kg|g)\b").expect("weight pattern"));

static DIAMETER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(1[.,]75|2[.,]85|3(?:[.,]00?)?)\s*mm\b").expect("diameter pattern"));

static QUANTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\b(?:qty|quantity|menge|anzahl)\s*[:.]?\s*(\d{1,3})\b|(?:^|\s)(\d{1,3})\s*[x×](?:\s|$)|(?:^|\s)[x×]\s*(\d{1,3})\b|\b(\d{1,3})\s*(?:pcs|pieces|stk|stück|rolls|spools)\b)",
    )
    .expect("quantity pattern")
});

/// Line-based receipt scanner.
#[derive(Debug, Clone, Default)]
pub struct PatternExtractor {
    /// Known vendor names, longest first so `Bambu Lab` beats `Bambu`.
    known_brands: Vec<String>,
}

impl PatternExtractor {
    pub fn new(mut known_brands: Vec<String>) -> Self {
        known_brands.retain(|b| !b.trim().is_empty());
        known_brands.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Self { known_brands }
    }

    /// Scan receipt text. Total: returns an empty list when nothing is recognised.
    pub fn scan(&self, text: &str) -> Vec<RecordInput> {
        text.lines().filter_map(|line| self.parse_line(line)).collect()
    }

    fn parse_line(&self, line: &str) -> Option<RecordInput> {
        let material = MATERIAL.captures(line).map(|caps| {
            let code = caps[1].to_uppercase();
            match caps.get(2) {
                Some(_) => format!("{code}+"),
                None => code,
            }
        })?;

        let price = find_price(line);
        let weight = find_weight(line);
        if price.is_none() && weight.is_none() {
            return None;
        }

        Some(RecordInput {
            brand: self.find_brand(line),
            material: Some(material),
            color: None,
            diameter: find_diameter(line),
            weight,
            price,
            quantity: find_quantity(line),
            spool_weight: None,
        })
    }

    fn find_brand(&self, line: &str) -> Option<String> {
        let lower = line.to_lowercase();
        self.known_brands
            .iter()
            .find(|brand| lower.contains(&brand.to_lowercase()))
            .cloned()
    }
}

impl ExtractionStrategy for PatternExtractor {
    fn name(&self) -> &'static str {
        "patterns"
    }

    fn extract(&self, text: &str) -> Result<Vec<RecordInput>, ExtractionError> {
        Ok(self.scan(text))
    }
}

/// Last currency amount on the line; receipts put the line total or unit price last.
fn find_price(line: &str) -> Option<f64> {
    PRICE
        .captures_iter(line)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .filter_map(|m| parse_number(m.as_str()))
        .last()
}

fn find_weight(line: &str) -> Option<f64> {
    let caps = WEIGHT.captures(line)?;
    let value = parse_number(&caps[1])?;
    let grams = if caps[2].eq_ignore_ascii_case("kg") {
        value * 1000.0
    } else {
        value
    };
    (grams > 0.0).then_some(grams)
}

fn find_diameter(line: &str) -> Option<f64> {
    DIAMETER.captures(line).and_then(|caps| parse_number(&caps[1]))
}

fn find_quantity(line: &str) -> Option<i64> {
    let caps = QUANTITY.captures(line)?;
    (1..=4)
        .filter_map(|i| caps.get(i))
        .next()
        .and_then(|m| m.as_str().parse::<i64>().ok())
}
