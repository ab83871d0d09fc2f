//! Receipt text → purchase records.
//!
//! Extraction is an ordered list of strategies. The first one that returns
//! records wins; a strategy that errors or finds nothing hands over to the next.
//! The chain itself never fails: the worst case is an empty list.

use tracing::{debug, info, warn};

use crate::domain::{LlmSettings, RecordInput};
use crate::error::ExtractionError;

pub mod llm;
pub mod patterns;

pub use llm::{LlmExtractor, OpenAiClient, TextService};
pub use patterns::PatternExtractor;

/// One way of turning receipt text into records.
pub trait ExtractionStrategy {
    fn name(&self) -> &'static str;

    fn extract(&self, text: &str) -> Result<Vec<RecordInput>, ExtractionError>;
}

pub struct ExtractionChain {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl ExtractionChain {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// The standard chain: structured extraction when an API key is configured,
    /// then pattern matching.
    ///
    /// `known_brands` lets the pattern matcher recognise vendor names.
    pub fn standard(llm: Option<&LlmSettings>, known_brands: Vec<String>) -> Self {
        let mut strategies: Vec<Box<dyn ExtractionStrategy>> = Vec::new();

        match llm {
            Some(settings) => match OpenAiClient::new(settings.clone()) {
                Ok(client) => strategies.push(Box::new(LlmExtractor::new(client))),
                Err(err) => warn!(error = %err, "structured extraction unavailable"),
            },
            None => info!("no OPENAI_API_KEY configured, using pattern matching only"),
        }

        strategies.push(Box::new(PatternExtractor::new(known_brands)));
        Self::new(strategies)
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the strategies in order and return the first non-empty result.
    pub fn extract(&self, text: &str) -> Vec<RecordInput> {
        for strategy in &self.strategies {
            match strategy.extract(text) {
                Ok(records) if !records.is_empty() => {
                    info!(strategy = strategy.name(), records = records.len(), "extracted filaments");
                    return records;
                }
                Ok(_) => debug!(strategy = strategy.name(), "no filaments found, trying next strategy"),
                Err(err) => warn!(strategy = strategy.name(), error = %err, "extraction failed, trying next strategy"),
            }
        }
        Vec::new()
    }
}
