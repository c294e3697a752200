use crate::actors::messages::AppError;
use crate::models::ClassificationResult;
use async_trait::async_trait;

/// Defines the public interface for an LLM (Large Language Model) actor.
///
/// This trait abstracts the specific implementation of the LLM, allowing the hosted
/// chat-completions backend to be swapped for a scripted stub in tests.
#[async_trait]
pub trait LlmActor: Send + Sync + 'static {
    /// Generates a complete text response based on a prompt and optional parameters.
    async fn generate_with_params(
        &self,
        prompt: String,
        system_prompt: Option<String>,
        temperature: Option<f32>,
    ) -> Result<String, AppError>;

    /// A convenience method for generating text with default parameters.
    async fn generate(&self, prompt: String) -> Result<String, AppError> {
        self.generate_with_params(prompt, None, None).await
    }
}

/// Defines the classification step used by the router.
///
/// Unlike the classifier agent's own `classify`, this seam may fail; the router
/// answers a failure with its content sniffer.
#[async_trait]
pub trait DocumentClassifier: Send + Sync + 'static {
    /// Classifies a document's format and intent.
    async fn try_classify(&self, text: &str) -> Result<ClassificationResult, AppError>;
}
