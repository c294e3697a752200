use crate::actors::llm::LlmActorHandle;
use crate::actors::messages::AppError;
use crate::actors::traits::{DocumentClassifier, LlmActor};
use crate::agents::{ClassifierAgent, EmailAgent, JsonAgent, PdfAgent};
use crate::config::AppConfig;
use crate::heuristics::detect_format_from_content;
use crate::memory::MemoryLogger;
use crate::models::{
    AgentResult, ClassificationResult, Format, Intent, MemoryStats, PdfExtraction, RouteResult,
    StatsReport, UNKNOWN_LABEL,
};
use serde::Serialize;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// How many recent entries [`AgentRouter::get_memory_stats`] looks at.
pub const RECENT_STATS_WINDOW: u32 = 100;

/// The router wired to the hosted LLM.
pub type DefaultRouter = AgentRouter<LlmActorHandle, ClassifierAgent<LlmActorHandle>>;

/// What gets persisted for every routed document.
#[derive(Serialize)]
struct LoggedOutcome<'a> {
    classification: Option<ClassificationResult>,
    result: &'a AgentResult,
}

/// Classifies a document, hands it to the matching agent and logs the outcome.
///
/// Holds no per-call state; one router serves concurrent requests.
pub struct AgentRouter<L, C>
where
    L: LlmActor,
    C: DocumentClassifier,
{
    classifier: Arc<C>,
    email_agent: EmailAgent<L>,
    json_agent: JsonAgent,
    pdf_agent: PdfAgent,
    memory: MemoryLogger,
}

impl DefaultRouter {
    /// Builds the production router: one shared LLM actor and the configured memory log.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let llm = Arc::new(LlmActorHandle::new(config.llm.clone())?);
        let classifier = Arc::new(ClassifierAgent::new(llm.clone()));
        let memory = MemoryLogger::connect(&config.database_url).await?;
        info!("All agents initialized successfully");
        Ok(Self::new(llm, classifier, memory))
    }
}

impl<L, C> AgentRouter<L, C>
where
    L: LlmActor,
    C: DocumentClassifier,
{
    pub fn new(llm: Arc<L>, classifier: Arc<C>, memory: MemoryLogger) -> Self {
        Self {
            classifier,
            email_agent: EmailAgent::new(llm),
            json_agent: JsonAgent::new(),
            pdf_agent: PdfAgent::new(),
            memory,
        }
    }

    pub fn memory(&self) -> &MemoryLogger {
        &self.memory
    }

    /// Routes one document and returns its envelope.
    ///
    /// Bytes are treated as a PDF and take precedence over text. Empty inputs
    /// count as absent. Never fails: every problem ends up in `result.error`,
    /// and exactly one log write is attempted per call.
    #[instrument(skip(self, raw_bytes, raw_text), fields(has_bytes = raw_bytes.is_some(), has_text = raw_text.is_some()))]
    pub async fn route(
        &self,
        source_name: &str,
        raw_bytes: Option<&[u8]>,
        raw_text: Option<&str>,
    ) -> RouteResult {
        let (envelope, classification) = match self.dispatch(source_name, raw_bytes, raw_text).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Routing failed: {}", e);
                let envelope = RouteResult {
                    source: source_name.to_string(),
                    format: UNKNOWN_LABEL.to_string(),
                    intent: UNKNOWN_LABEL.to_string(),
                    result: AgentResult::error(format!("Routing failed: {}", e)),
                };
                (envelope, None)
            }
        };

        let outcome = LoggedOutcome {
            classification,
            result: &envelope.result,
        };
        if let Err(e) = self
            .memory
            .log_entry(&envelope.source, &envelope.format, &envelope.intent, &outcome)
            .await
        {
            warn!("Memory logging failed: {}", e);
        }

        envelope
    }

    async fn dispatch(
        &self,
        source_name: &str,
        raw_bytes: Option<&[u8]>,
        raw_text: Option<&str>,
    ) -> Result<(RouteResult, Option<ClassificationResult>), AppError> {
        let raw_bytes = raw_bytes.filter(|bytes| !bytes.is_empty());
        let raw_text = raw_text.filter(|text| !text.is_empty());

        let text: Cow<'_, str> = match (raw_bytes, raw_text) {
            (Some(bytes), _) => match self.pdf_agent.extract_text(bytes).await {
                Ok(text) => Cow::Owned(text),
                Err(e) => {
                    error!("PDF text extraction failed: {}", e);
                    let envelope = RouteResult {
                        source: source_name.to_string(),
                        format: Format::Pdf.to_string(),
                        intent: UNKNOWN_LABEL.to_string(),
                        result: AgentResult::error(format!("PDF processing failed: {}", e)),
                    };
                    return Ok((envelope, None));
                }
            },
            (None, Some(text)) => Cow::Borrowed(text),
            (None, None) => {
                return Err(AppError::Validation(
                    "Either raw_bytes or raw_text must be provided".to_string(),
                ))
            }
        };

        let classification = match self.classifier.try_classify(&text).await {
            Ok(classification) => classification,
            Err(e) => {
                warn!("Classification failed, using fallback: {}", e);
                ClassificationResult {
                    format: detect_format_from_content(&text, source_name),
                    intent: Intent::GeneralEnquiry,
                }
            }
        };

        let pdf_text: Option<&str> = raw_bytes.map(|_| &*text);
        let result = match self.run_agent(classification, &text, pdf_text).await {
            Ok(result) => result,
            Err(e) => {
                error!("Agent processing failed: {}", e);
                AgentResult::error(format!("Processing failed: {}", e))
            }
        };

        let envelope = RouteResult {
            source: source_name.to_string(),
            format: classification.format.to_string(),
            intent: classification.intent.to_string(),
            result,
        };
        Ok((envelope, Some(classification)))
    }

    /// Runs the agent for `classification`. `pdf_text` is the text already
    /// extracted from PDF bytes, if the document arrived as a PDF.
    async fn run_agent(
        &self,
        classification: ClassificationResult,
        text: &str,
        pdf_text: Option<&str>,
    ) -> Result<AgentResult, AppError> {
        match classification.format {
            Format::Json => Ok(AgentResult::Json(
                self.json_agent.process(text, classification.intent),
            )),
            Format::Email => Ok(AgentResult::Email(self.email_agent.parse_email(text).await)),
            Format::Pdf => {
                let raw_text = pdf_text.ok_or_else(|| {
                    AppError::Validation("PDF classification requires raw PDF bytes".to_string())
                })?;
                Ok(AgentResult::Pdf(PdfExtraction {
                    raw_text: raw_text.to_string(),
                    intent: Some(classification.intent),
                }))
            }
        }
    }

    /// Format and intent counts over the most recent log entries.
    pub async fn get_memory_stats(&self) -> StatsReport {
        let recent = self.memory.fetch_all(RECENT_STATS_WINDOW).await;
        StatsReport::Stats(MemoryStats::from_entries(&recent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{temp_memory, ScriptedLlm};

    #[tokio::test]
    async fn test_pdf_branch_reuses_extracted_text() {
        let (memory, _dir) = temp_memory().await;
        let llm = Arc::new(ScriptedLlm::replying("{}"));
        let router = AgentRouter::new(llm.clone(), Arc::new(ClassifierAgent::new(llm)), memory);
        let classification = ClassificationResult {
            format: Format::Pdf,
            intent: Intent::Invoice,
        };

        let result = router
            .run_agent(classification, "ignored", Some("Invoice INV9 total 40"))
            .await
            .unwrap();

        assert_eq!(
            result,
            AgentResult::Pdf(PdfExtraction {
                raw_text: "Invoice INV9 total 40".to_string(),
                intent: Some(Intent::Invoice),
            })
        );
    }
}
