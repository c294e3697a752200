use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::fmt;

/// Label used in envelopes and log rows when no format or intent could be determined.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// A document's container type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    #[serde(rename = "PDF")]
    Pdf,
    #[serde(rename = "JSON")]
    Json,
    #[serde(rename = "EMAIL")]
    Email,
}

impl Format {
    /// All formats, in the order the classifier's substring rules try them.
    pub const ALL: [Format; 3] = [Format::Pdf, Format::Email, Format::Json];

    pub fn label(&self) -> &'static str {
        match self {
            Format::Pdf => "PDF",
            Format::Json => "JSON",
            Format::Email => "EMAIL",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Business purpose of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    Invoice,
    #[serde(rename = "RFQ")]
    Rfq,
    Complaint,
    Regulation,
    #[serde(rename = "General Enquiry")]
    GeneralEnquiry,
}

impl Intent {
    /// All intents, in the order the classifier's substring rules try them.
    pub const ALL: [Intent; 5] = [
        Intent::Invoice,
        Intent::Rfq,
        Intent::Complaint,
        Intent::Regulation,
        Intent::GeneralEnquiry,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Intent::Invoice => "Invoice",
            Intent::Rfq => "RFQ",
            Intent::Complaint => "Complaint",
            Intent::Regulation => "Regulation",
            Intent::GeneralEnquiry => "General Enquiry",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Format and intent of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub format: Format,
    pub intent: Intent,
}

impl Default for ClassificationResult {
    fn default() -> Self {
        Self {
            format: Format::Email,
            intent: Intent::GeneralEnquiry,
        }
    }
}

/// Urgency reported by the email extraction prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    Medium,
    High,
    /// The reply carried no usable urgency.
    #[serde(rename = "")]
    Unspecified,
}

impl Urgency {
    /// Maps a free-form reply value onto the urgency scale.
    ///
    /// An exact label wins. Otherwise the first keyword that is not negated
    /// ("not urgent", "no high priority") decides.
    pub fn from_reply(value: &str) -> Self {
        let value = value.trim().to_lowercase();
        match value.as_str() {
            "high" => return Urgency::High,
            "medium" => return Urgency::Medium,
            "low" => return Urgency::Low,
            _ => {}
        }

        let mut negated = false;
        for word in value.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let urgency = match word {
                "high" | "urgent" => Some(Urgency::High),
                "medium" | "moderate" | "normal" => Some(Urgency::Medium),
                "low" => Some(Urgency::Low),
                _ => None,
            };
            match urgency {
                Some(urgency) if !negated => return urgency,
                _ => negated = matches!(word, "not" | "no" | "non"),
            }
        }
        Urgency::Unspecified
    }
}

/// Fields pulled out of an email body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailExtraction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    pub sender_name: String,
    pub sender_email: String,
    pub urgency: Urgency,
    pub summary: String,
    pub action: String,
}

impl EmailExtraction {
    /// Empty field set tagged with `error`.
    pub fn failed(error: impl Into<String>, urgency: Urgency) -> Self {
        Self {
            error: Some(error.into()),
            raw_response: None,
            sender_name: String::new(),
            sender_email: String::new(),
            urgency,
            summary: String::new(),
            action: String::new(),
        }
    }
}

/// One schema violation, addressed by a dotted path (`line_items.0.quantity`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub kind: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Either a single message or the field-level error list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationIssues {
    Message(String),
    Fields(Vec<FieldError>),
}

/// Outcome of validating a JSON document against its intent schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonValidationResult {
    pub valid: bool,
    pub data: Option<serde_json::Value>,
    pub errors: Option<ValidationIssues>,
}

impl JsonValidationResult {
    pub fn invalid(data: Option<serde_json::Value>, errors: ValidationIssues) -> Self {
        Self {
            valid: false,
            data,
            errors: Some(errors),
        }
    }
}

/// Raw text of a PDF, tagged with the intent it was routed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfExtraction {
    pub raw_text: String,
    pub intent: Option<Intent>,
}

/// Result carried in a route envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentResult {
    Json(JsonValidationResult),
    Pdf(PdfExtraction),
    Email(EmailExtraction),
    Error { error: String },
}

impl AgentResult {
    pub fn error(message: impl Into<String>) -> Self {
        AgentResult::Error {
            error: message.into(),
        }
    }

    /// The error attached to this result, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            AgentResult::Error { error } => Some(error),
            AgentResult::Email(email) => email.error.as_deref(),
            _ => None,
        }
    }
}

/// The uniform object the router returns for any input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub source: String,
    pub format: String,
    pub intent: String,
    pub result: AgentResult,
}

/// A persisted routing record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LogEntry {
    /// The unique identifier for the entry (UUID).
    pub id: String,
    /// The source name the document was submitted under.
    pub source: String,
    pub format: String,
    pub intent: String,
    /// JSON text of `{classification, result}`.
    pub payload: String,
    /// Write time (UTC).
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    /// Decodes the payload, falling back to the raw text when it is not JSON.
    pub fn payload_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.payload)
            .unwrap_or_else(|_| serde_json::Value::String(self.payload.clone()))
    }
}

/// Entry counts, overall and per distinct format and intent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_entries: u64,
    pub format_counts: BTreeMap<String, u64>,
    pub intent_counts: BTreeMap<String, u64>,
}

impl MemoryStats {
    /// Tallies a set of entries.
    pub fn from_entries(entries: &[LogEntry]) -> Self {
        let mut stats = MemoryStats {
            total_entries: entries.len() as u64,
            ..Default::default()
        };
        for entry in entries {
            *stats.format_counts.entry(entry.format.clone()).or_default() += 1;
            *stats.intent_counts.entry(entry.intent.clone()).or_default() += 1;
        }
        stats
    }
}

/// Statistics, or the reason they could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsReport {
    Stats(MemoryStats),
    Error { error: String },
}
