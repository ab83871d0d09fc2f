//! Structured extraction through an OpenAI-compatible chat completions API.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{LlmSettings, RecordInput};
use crate::error::ExtractionError;
use crate::extract::ExtractionStrategy;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const TEMPERATURE: f32 = 0.1;

const SYSTEM_PROMPT: &str = "You extract structured data from purchase receipts. Reply with valid JSON only.";

const INSTRUCTION: &str = "\
List every 3D printer filament bought on the receipt below as a JSON array.
One object per line item, with these keys:
- brand: manufacturer name (string)
- material: material as printed, e.g. \"PLA Basic\", \"PETG HF\" (string)
- color: color name (string)
- diameter: filament diameter in mm, usually 1.75 (number)
- weight: net filament weight in grams, e.g. 1000 for 1 kg (number)
- price: unit price (number)
- quantity: number of spools (integer)
- spool_weight: empty spool weight in grams (number), only if the receipt states it
Leave out anything that is not filament, such as shipping or tools.
Use null for values the receipt does not give.";

/// A service that answers a prompt with text.
pub trait TextService {
    fn complete(&self, system: &str, user: &str) -> Result<String, ExtractionError>;
}

/// Blocking client for `POST {base_url}/chat/completions`.
pub struct OpenAiClient {
    client: Client,
    settings: LlmSettings,
}

impl OpenAiClient {
    pub fn new(settings: LlmSettings) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ExtractionError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, settings })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl TextService for OpenAiClient {
    fn complete(&self, system: &str, user: &str) -> Result<String, ExtractionError> {
        let url = format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
        };

        debug!(url = %url, model = %self.settings.model, "requesting structured extraction");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .map_err(|e| ExtractionError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ExtractionError::Status(resp.status().as_u16()));
        }

        let reply: ChatResponse = resp
            .json()
            .map_err(|e| ExtractionError::InvalidResponse(format!("failed to parse reply: {e}")))?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ExtractionError::InvalidResponse("reply had no content".to_string()))
    }
}

/// Extraction strategy backed by a `TextService`.
pub struct LlmExtractor<S> {
    service: S,
}

impl<S: TextService> LlmExtractor<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

impl<S: TextService> ExtractionStrategy for LlmExtractor<S> {
    fn name(&self) -> &'static str {
        "llm"
    }

    fn extract(&self, text: &str) -> Result<Vec<RecordInput>, ExtractionError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let prompt = format!("{INSTRUCTION}\n\nReceipt text:\n{text}\n\nJSON array:");
        let reply = self.service.complete(SYSTEM_PROMPT, &prompt)?;
        parse_reply(&reply)
    }
}

/// Parse a model reply into records.
///
/// Accepts a bare array, an object wrapping a `filaments` array, or a single
/// object, optionally inside a markdown code fence. Items that are not objects
/// are skipped.
pub fn parse_reply(reply: &str) -> Result<Vec<RecordInput>, ExtractionError> {
    let json = strip_code_fence(reply);
    let value: Value = serde_json::from_str(json)
        .map_err(|e| ExtractionError::InvalidResponse(format!("JSON parse error: {e}")))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("filaments") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(ExtractionError::InvalidResponse(
                    "\"filaments\" is not an array".to_string(),
                ));
            }
            None => vec![Value::Object(obj)],
        },
        _ => return Err(ExtractionError::InvalidResponse("expected a JSON array".to_string())),
    };

    let mut records = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            warn!(item = idx, "skipping extracted item that is not an object");
            continue;
        }
        match serde_json::from_value::<RecordInput>(item) {
            Ok(record) => records.push(record),
            Err(e) => warn!(item = idx, error = %e, "skipping unreadable extracted item"),
        }
    }
    Ok(records)
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening line and the closing fence.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().trim_end_matches("```").trim()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct Canned {
        reply: Result<String, u16>,
        prompts: RefCell<Vec<String>>,
    }

    impl Canned {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl TextService for Canned {
        fn complete(&self, _system: &str, user: &str) -> Result<String, ExtractionError> {
            self.prompts.borrow_mut().push(user.to_string());
            self.reply.clone().map_err(ExtractionError::Status)
        }
    }

    #[test]
    fn parses_plain_array() {
        let records = parse_reply(
            r#"[{"brand": "Bambu Lab", "material": "PLA Basic", "color": "Galaxy Black",
                 "diameter": 1.75, "weight": 1000, "price": 24.99, "quantity": 2, "spool_weight": null}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].brand.as_deref(), Some("Bambu Lab"));
        assert_eq!(records[0].quantity, Some(2));
        assert_eq!(records[0].spool_weight, None);
    }

    #[test]
    fn parses_fenced_reply() {
        let reply = "```json\n[{\"material\": \"PETG\", \"price\": 19.99}]\n```";
        let records = parse_reply(reply).unwrap();
        assert_eq!(records[0].material.as_deref(), Some("PETG"));
        assert_eq!(records[0].price, Some(19.99));

        let reply = "```\n[]\n```";
        assert!(parse_reply(reply).unwrap().is_empty());
    }

    #[test]
    fn accepts_wrapped_and_single_objects() {
        let wrapped = parse_reply(r#"{"filaments": [{"material": "ABS"}, {"material": "ASA"}]}"#).unwrap();
        assert_eq!(wrapped.len(), 2);

        let single = parse_reply(r#"{"material": "TPU"}"#).unwrap();
        assert_eq!(single[0].material.as_deref(), Some("TPU"));
    }

    #[test]
    fn skips_non_object_items() {
        let records = parse_reply(r#"[{"material": "PLA"}, "PETG", 3]"#).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn rejects_prose() {
        assert!(matches!(
            parse_reply("Sorry, I could not find any filaments."),
            Err(ExtractionError::InvalidResponse(_))
        ));
        assert!(parse_reply("42").is_err());
    }

    #[test]
    fn extractor_sends_receipt_text_and_parses_reply() {
        let extractor = LlmExtractor::new(Canned::ok(r#"[{"material": "PLA"}]"#));
        let records = extractor.extract("1x Sunlu PLA 1kg 12.99 EUR").unwrap();
        assert_eq!(records.len(), 1);

        let prompts = extractor.service.prompts.borrow();
        assert!(prompts[0].contains("1x Sunlu PLA 1kg 12.99 EUR"));
        assert!(prompts[0].contains("spool_weight"));
    }

    #[test]
    fn extractor_skips_service_for_blank_text() {
        let extractor = LlmExtractor::new(Canned::ok("not json"));
        assert!(extractor.extract("  \n").unwrap().is_empty());
        assert!(extractor.service.prompts.borrow().is_empty());
    }

    #[test]
    fn service_errors_propagate_to_the_chain() {
        let extractor = LlmExtractor::new(Canned {
            reply: Err(429),
            prompts: RefCell::new(Vec::new()),
        });
        assert!(matches!(
            extractor.extract("PLA 19.99 €"),
            Err(ExtractionError::Status(429))
        ));
    }
}
