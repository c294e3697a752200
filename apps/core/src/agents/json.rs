use crate::models::{Intent, JsonValidationResult, ValidationIssues};
use crate::schemas::IntentSchema;
use serde_json::Value;
use tracing::{debug, warn};

/// Validates JSON documents against the schema of their intent.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAgent;

impl JsonAgent {
    pub fn new() -> Self {
        Self
    }

    /// Parses and validates `raw`. Never fails: problems come back as an invalid result.
    pub fn process(&self, raw: &str, intent: Intent) -> JsonValidationResult {
        if raw.trim().is_empty() {
            return JsonValidationResult::invalid(
                None,
                ValidationIssues::Message("Empty JSON string provided".to_string()),
            );
        }

        let payload: Value = match serde_json::from_str(raw) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("JSON decode error: {}", e);
                return JsonValidationResult::invalid(
                    None,
                    ValidationIssues::Message(format!("JSON decode error: {}", e)),
                );
            }
        };

        let schema = IntentSchema::for_intent(intent);
        match schema.validate(&payload) {
            Ok(data) => {
                debug!("Document valid against {}", schema.name());
                JsonValidationResult {
                    valid: true,
                    data: Some(data),
                    errors: None,
                }
            }
            Err(errors) => {
                warn!(
                    "Document failed {} validation with {} error(s)",
                    schema.name(),
                    errors.len()
                );
                JsonValidationResult::invalid(Some(payload), ValidationIssues::Fields(errors))
            }
        }
    }
}
