use crate::actors::messages::AppError;
use crate::actors::traits::{DocumentClassifier, LlmActor};
use crate::heuristics::{normalize_format, normalize_intent};
use crate::models::{ClassificationResult, Format, Intent};
use crate::prompts;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Labels a document's format and intent with two remote calls.
pub struct ClassifierAgent<L: LlmActor> {
    llm: Arc<L>,
}

impl<L: LlmActor> ClassifierAgent<L> {
    pub fn new(llm: Arc<L>) -> Self {
        Self { llm }
    }

    /// Asks for the format label. A failed call yields `EMAIL`.
    pub async fn classify_format(&self, text: &str) -> Format {
        match self.llm.generate(prompts::format_prompt(text)).await {
            Ok(reply) => normalize_format(&reply),
            Err(e) => {
                warn!("Format classification failed: {}", e);
                Format::Email
            }
        }
    }

    /// Asks for the intent label. A failed call yields `General Enquiry`.
    pub async fn classify_intent(&self, text: &str) -> Intent {
        match self.llm.generate(prompts::intent_prompt(text)).await {
            Ok(reply) => normalize_intent(&reply),
            Err(e) => {
                warn!("Intent classification failed: {}", e);
                Intent::GeneralEnquiry
            }
        }
    }

    /// Classifies `text`. Never fails; blank input is answered without a remote call.
    #[instrument(skip_all, fields(len = text.len()))]
    pub async fn classify(&self, text: &str) -> ClassificationResult {
        if text.trim().is_empty() {
            return ClassificationResult::default();
        }

        let format = self.classify_format(text).await;
        let intent = self.classify_intent(text).await;
        ClassificationResult { format, intent }
    }
}

#[async_trait]
impl<L: LlmActor> DocumentClassifier for ClassifierAgent<L> {
    async fn try_classify(&self, text: &str) -> Result<ClassificationResult, AppError> {
        Ok(self.classify(text).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::messages::ActorError;
    use crate::tests::ScriptedLlm;

    #[tokio::test]
    async fn test_blank_input_skips_remote_calls() {
        let llm = Arc::new(ScriptedLlm::replying("PDF"));
        let agent = ClassifierAgent::new(llm.clone());

        let result = agent.classify("   \n").await;

        assert_eq!(result, ClassificationResult::default());
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_format_then_intent_calls() {
        let llm = Arc::new(ScriptedLlm::new(|prompt| {
            if prompt.contains("file format classifier") {
                Ok("It's a PDF document".to_string())
            } else {
                Ok("RFQ".to_string())
            }
        }));
        let agent = ClassifierAgent::new(llm.clone());

        let result = agent.classify("Please quote 10 widgets").await;

        assert_eq!(result.format, Format::Pdf);
        assert_eq!(result.intent, Intent::Rfq);
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_unmatched_replies_default() {
        let agent = ClassifierAgent::new(Arc::new(ScriptedLlm::replying("no idea")));
        let result = agent.classify("some text").await;
        assert_eq!(result, ClassificationResult::default());
    }

    #[tokio::test]
    async fn test_transport_failure_degrades_to_defaults() {
        let agent = ClassifierAgent::new(Arc::new(ScriptedLlm::new(|_| {
            Err(ActorError::LlmError("connection refused".to_string()).into())
        })));

        let result = agent.try_classify("{\"a\": 1}").await.unwrap();

        assert_eq!(result.format, Format::Email);
        assert_eq!(result.intent, Intent::GeneralEnquiry);
    }
}
