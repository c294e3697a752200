use crate::actors::traits::LlmActor;
use crate::models::{EmailExtraction, Urgency};
use crate::prompts;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::{Arc, LazyLock};
use tracing::{error, instrument, warn};

/// Characters of an unstructured reply kept as its summary.
const SUMMARY_PREVIEW_CHARS: usize = 200;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\n?(.*?)\s*```\s*$")
        .expect("Invalid regex: code fence pattern")
});

/// Pulls sender, urgency, summary and requested action out of an email body.
pub struct EmailAgent<L: LlmActor> {
    llm: Arc<L>,
}

impl<L: LlmActor> EmailAgent<L> {
    pub fn new(llm: Arc<L>) -> Self {
        Self { llm }
    }

    /// Extracts the email fields. Never fails: problems are reported in `error`.
    #[instrument(skip_all, fields(len = text.len()))]
    pub async fn parse_email(&self, text: &str) -> EmailExtraction {
        if text.trim().is_empty() {
            return EmailExtraction::failed("Empty email content provided", Urgency::Low);
        }

        let reply = match self.llm.generate(prompts::email_prompt(text)).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Email parsing failed: {}", e);
                return EmailExtraction::failed(format!("Email parsing failed: {}", e), Urgency::Low);
            }
        };

        match parse_reply(&reply) {
            Some(fields) => extraction_from_fields(&fields),
            None => {
                warn!("Email extraction reply was not a JSON object");
                let mut extraction =
                    EmailExtraction::failed("LLM returned unstructured output", Urgency::Medium);
                extraction.summary = reply.chars().take(SUMMARY_PREVIEW_CHARS).collect();
                extraction.raw_response = Some(reply);
                extraction
            }
        }
    }
}

/// Parses the reply as a JSON object, unwrapping a surrounding code fence.
fn parse_reply(reply: &str) -> Option<Map<String, Value>> {
    let body = CODE_FENCE
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map_or(reply, |m| m.as_str());

    match serde_json::from_str::<Value>(body.trim()) {
        Ok(Value::Object(fields)) => Some(fields),
        _ => None,
    }
}

fn field_text(fields: &Map<String, Value>, name: &str) -> String {
    match fields.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn extraction_from_fields(fields: &Map<String, Value>) -> EmailExtraction {
    EmailExtraction {
        error: None,
        raw_response: None,
        sender_name: field_text(fields, "sender_name"),
        sender_email: field_text(fields, "sender_email"),
        urgency: Urgency::from_reply(&field_text(fields, "urgency")),
        summary: field_text(fields, "summary"),
        action: field_text(fields, "action"),
    }
}
