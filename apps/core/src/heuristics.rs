//! Label normalization and content sniffing.
//!
//! Both are ordered rule tables evaluated first-match-wins. They are
//! best-effort: a reply such as "General Enquiry about an invoice" resolves to
//! `Invoice` because that rule comes first.

use crate::models::{Format, Intent};
use tracing::warn;

/// Keywords that identify each intent inside a free-form reply, in match order.
const INTENT_KEYWORDS: [(Intent, &[&str]); 5] = [
    (Intent::Invoice, &["invoice"]),
    (Intent::Rfq, &["rfq", "request for quotation"]),
    (Intent::Complaint, &["complaint"]),
    (Intent::Regulation, &["regulation"]),
    (Intent::GeneralEnquiry, &["general enquiry", "general inquiry"]),
];

/// Resolves a classifier reply to a format, if any rule matches.
///
/// Exact case-insensitive label match first, then substring match in
/// `PDF`, `EMAIL`, `JSON` order.
pub fn match_format(reply: &str) -> Option<Format> {
    let reply = reply.trim().to_uppercase();
    Format::ALL
        .iter()
        .find(|format| reply == format.label())
        .or_else(|| Format::ALL.iter().find(|format| reply.contains(format.label())))
        .copied()
}

/// Like [`match_format`], defaulting to `EMAIL`.
pub fn normalize_format(reply: &str) -> Format {
    match_format(reply).unwrap_or_else(|| {
        warn!("Unknown format response: {:?}, defaulting to EMAIL", reply.trim());
        Format::Email
    })
}

/// Resolves a classifier reply to an intent, if any rule matches.
pub fn match_intent(reply: &str) -> Option<Intent> {
    let reply = reply.trim().to_lowercase();
    Intent::ALL
        .iter()
        .find(|intent| reply == intent.label().to_lowercase())
        .copied()
        .or_else(|| {
            INTENT_KEYWORDS
                .iter()
                .find(|(_, keywords)| keywords.iter().any(|k| reply.contains(*k)))
                .map(|(intent, _)| *intent)
        })
}

/// Like [`match_intent`], defaulting to `General Enquiry`.
pub fn normalize_intent(reply: &str) -> Intent {
    match_intent(reply).unwrap_or_else(|| {
        warn!(
            "Unknown intent response: {:?}, defaulting to General Enquiry",
            reply.trim()
        );
        Intent::GeneralEnquiry
    })
}

/// One content-sniffing test.
enum SniffRule {
    /// Text is empty or whitespace.
    Blank,
    /// Trimmed text starts with the first char and ends with the second.
    Wrapped(char, char),
    /// Lowercased text contains any of the indicators.
    Contains(&'static [&'static str]),
    /// Lowercased source name ends with any of the extensions.
    Extension(&'static [&'static str]),
}

const EMAIL_INDICATORS: &[&str] = &[
    "from:", "to:", "subject:", "@", "dear", "sincerely", "regards",
];

/// Router fallback rules, in evaluation order.
const SNIFF_RULES: [(SniffRule, Format); 7] = [
    (SniffRule::Blank, Format::Email),
    (SniffRule::Wrapped('{', '}'), Format::Json),
    (SniffRule::Wrapped('[', ']'), Format::Json),
    (SniffRule::Contains(EMAIL_INDICATORS), Format::Email),
    (SniffRule::Extension(&[".json"]), Format::Json),
    (SniffRule::Extension(&[".pdf"]), Format::Pdf),
    (SniffRule::Extension(&[".txt", ".eml"]), Format::Email),
];

impl SniffRule {
    fn matches(&self, text: &str, lowered: &str, source_name: &str) -> bool {
        match self {
            SniffRule::Blank => text.trim().is_empty(),
            SniffRule::Wrapped(open, close) => {
                let trimmed = text.trim();
                trimmed.starts_with(*open) && trimmed.ends_with(*close)
            }
            SniffRule::Contains(needles) => needles.iter().any(|n| lowered.contains(*n)),
            SniffRule::Extension(exts) => {
                let source = source_name.to_lowercase();
                exts.iter().any(|ext| source.ends_with(*ext))
            }
        }
    }
}

/// Guesses a format from the content itself and the source name. Falls back
/// to `EMAIL` when no rule matches.
pub fn detect_format_from_content(text: &str, source_name: &str) -> Format {
    let lowered = text.to_lowercase();
    SNIFF_RULES
        .iter()
        .find(|(rule, _)| rule.matches(text, &lowered, source_name))
        .map(|(_, format)| *format)
        .unwrap_or(Format::Email)
}
