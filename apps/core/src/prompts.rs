//! Prompt templates for the remote LLM calls.
//!
//! Each template carries exactly one placeholder, replaced verbatim by
//! [`render`]. Callers bound the size of the inserted content.

/// Placeholder for the document body in the classification templates.
pub const INPUT_PLACEHOLDER: &str = "{input_content}";

/// Placeholder for the email body in the extraction template.
pub const EMAIL_PLACEHOLDER: &str = "{email_content}";

pub const FORMAT_CLASSIFICATION_PROMPT: &str = r#"
You are a file format classifier.
Given the content of a file, determine whether it is a
- PDF
- JSON
- EMAIL

Respond only with one of: "PDF", "JSON", "EMAIL".

Content:
{input_content}
"#;

pub const INTENT_CLASSIFICATION_PROMPT: &str = r#"
You are an intent classifier.
Given the following content, classify the sender's intent.

Possible intents include:
- Invoice
- RFQ (Request for Quotation)
- Complaint
- Regulation
- General Enquiry

Respond only with the intent label.

Content:
{input_content}
"#;

pub const EMAIL_EXTRACTION_PROMPT: &str = r#"
You are an email parsing assistant. Given the email body below extract:
 - Sender's name and email
 - Urgency level (High, Medium, Low)
 - Summary in 1-2 sentences
 - Any action requested

Respond in JSON only:
{
  "sender_name": "...",
  "sender_email": "...",
  "urgency": "...",
  "summary": "...",
  "action": "..."
}

Email:
{email_content}
"#;

/// Substitutes `content` for the first `placeholder` in `template`.
///
/// Only one substitution is made, so braces or placeholder-like text inside
/// the content are left untouched.
pub fn render(template: &str, placeholder: &str, content: &str) -> String {
    template.replacen(placeholder, content, 1)
}

pub fn format_prompt(content: &str) -> String {
    render(FORMAT_CLASSIFICATION_PROMPT, INPUT_PLACEHOLDER, content)
}

pub fn intent_prompt(content: &str) -> String {
    render(INTENT_CLASSIFICATION_PROMPT, INPUT_PLACEHOLDER, content)
}

pub fn email_prompt(content: &str) -> String {
    render(EMAIL_EXTRACTION_PROMPT, EMAIL_PLACEHOLDER, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_inserted_verbatim() {
        let body = "{\"invoice_id\": \"INV1\"}";
        let prompt = format_prompt(body);
        assert!(prompt.contains(body));
        assert!(!prompt.contains(INPUT_PLACEHOLDER));
    }

    #[test]
    fn test_placeholder_in_content_not_expanded() {
        let prompt = intent_prompt("literal {input_content} text");
        assert!(prompt.contains("literal {input_content} text"));
    }

    #[test]
    fn test_email_template_keeps_json_shape() {
        let prompt = email_prompt("Hi, send the report. Bob");
        assert!(prompt.contains("\"sender_email\""));
        assert!(prompt.ends_with("Hi, send the report. Bob\n"));
    }
}
