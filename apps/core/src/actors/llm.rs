use crate::actors::messages::{ActorError, AppError, LlmMessage};
use crate::actors::traits::LlmActor;
use crate::config::LlmConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info};
use url::Url;

/// Extra time the handle waits on top of the transport timeout, so a slow
/// reply surfaces as the runner's HTTP error rather than a mailbox timeout.
const REPLY_SLACK: Duration = Duration::from_secs(5);

/// A handle to the `LlmActor`.
///
/// This struct provides a public, cloneable interface for sending messages to the
/// running LLM actor. It abstracts away the `mpsc::Sender`.
#[derive(Clone)]
pub struct LlmActorHandle {
    sender: mpsc::Sender<LlmMessage>,
    reply_timeout: Duration,
}

impl LlmActorHandle {
    /// Creates a new `LlmActor` and returns a handle to it.
    ///
    /// This will spawn the `LlmActorRunner` in a new Tokio task. Fails when the
    /// endpoint URL is malformed or the HTTP client cannot be built.
    pub fn new(config: LlmConfig) -> Result<Self, AppError> {
        let request_timeout = Duration::from_secs(config.request_timeout_secs);
        let client = Client::builder().timeout(request_timeout).build()?;
        let (sender, receiver) = mpsc::channel(32);
        let actor = LlmActorRunner::new(receiver, client, config)?;
        tokio::spawn(async move { actor.run().await });
        Ok(Self {
            sender,
            reply_timeout: request_timeout + REPLY_SLACK,
        })
    }
}

#[async_trait]
impl LlmActor for LlmActorHandle {
    async fn generate_with_params(
        &self,
        prompt: String,
        system_prompt: Option<String>,
        temperature: Option<f32>,
    ) -> Result<String, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = LlmMessage::Complete {
            prompt,
            system_prompt,
            temperature,
            responder: send,
        };

        self.sender
            .send(msg)
            .await
            .map_err(|e| ActorError::Internal(e.to_string()))?;
        timeout(self.reply_timeout, recv)
            .await
            .map_err(ActorError::from)?
            .map_err(|e| ActorError::Internal(e.to_string()))?
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

// --- Actor Runner (Internal Logic) ---
struct LlmActorRunner {
    receiver: mpsc::Receiver<LlmMessage>,
    completer: Arc<ChatCompleter>,
}

/// Everything a single completion call needs; shared by the per-call tasks.
struct ChatCompleter {
    client: Client,
    endpoint: Url,
    config: LlmConfig,
}

impl LlmActorRunner {
    fn new(
        receiver: mpsc::Receiver<LlmMessage>,
        client: Client,
        config: LlmConfig,
    ) -> Result<Self, AppError> {
        let endpoint = config.completions_url()?;
        Ok(Self {
            receiver,
            completer: Arc::new(ChatCompleter {
                client,
                endpoint,
                config,
            }),
        })
    }

    async fn run(mut self) {
        info!(
            "LlmActor started (model: {}, endpoint: {})",
            self.completer.config.model, self.completer.endpoint
        );

        // One task per call: a slow completion must not delay the next one.
        while let Some(msg) = self.receiver.recv().await {
            let completer = Arc::clone(&self.completer);
            tokio::spawn(async move { completer.handle_message(msg).await });
        }

        info!("LlmActor stopped");
    }
}

impl ChatCompleter {
    async fn handle_message(&self, msg: LlmMessage) {
        match msg {
            LlmMessage::Complete {
                prompt,
                system_prompt,
                temperature,
                responder,
            } => {
                let result = self.complete(&prompt, system_prompt.as_deref(), temperature).await;
                let _ = responder.send(result);
            }
        }
    }

    async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        temperature: Option<f32>,
    ) -> Result<String, AppError> {
        debug!("LLM completion request ({} chars)", prompt.len());

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: temperature.unwrap_or(self.config.temperature),
        };

        let res = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ActorError::LlmError(format!(
                "Completion request failed with status {}: {}",
                status, body
            ))
            .into());
        }

        let reply: ChatResponse = res
            .json()
            .await
            .map_err(|e| ActorError::LlmError(format!("Malformed completion response: {}", e)))?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ActorError::LlmError("Completion response carried no message content".to_string())
                    .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_handle(server_url: &str) -> LlmActorHandle {
        let mut config = LlmConfig::new("gsk_test");
        config.base_url = format!("{}/openai/v1", server_url);
        config.request_timeout_secs = 5;
        LlmActorHandle::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_llm_completion_success() {
        // 1. Arrange
        let mock_server = MockServer::start().await;
        let handle = test_handle(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(header("authorization", "Bearer gsk_test"))
            .and(body_partial_json(json!({
                "model": crate::config::DEFAULT_MODEL,
                "messages": [{"role": "user", "content": "Hello"}],
                "temperature": 0.0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-1",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "JSON"}}]
            })))
            .mount(&mock_server)
            .await;

        // 2. Act
        let result = handle.generate("Hello".to_string()).await;

        // 3. Assert
        assert_eq!(result.unwrap(), "JSON");
    }

    #[tokio::test]
    async fn test_llm_system_prompt_and_temperature_forwarded() {
        let mock_server = MockServer::start().await;
        let handle = test_handle(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "system", "content": "Be terse."},
                    {"role": "user", "content": "Hi"}
                ],
                "temperature": 0.5
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "ok"}}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = handle
            .generate_with_params("Hi".to_string(), Some("Be terse.".to_string()), Some(0.5))
            .await;
        assert_eq!(result.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_llm_completion_server_error() {
        // 1. Arrange
        let mock_server = MockServer::start().await;
        let handle = test_handle(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        // 2. Act
        let result = handle.generate("Hello".to_string()).await;

        // 3. Assert
        match result {
            Err(AppError::Actor(ActorError::LlmError(msg))) => {
                assert!(msg.contains("Completion request failed with status 500"));
                assert!(msg.contains("Internal Server Error"));
            }
            other => panic!("Expected LlmError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_llm_reply_without_choices_is_error() {
        let mock_server = MockServer::start().await;
        let handle = test_handle(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&mock_server)
            .await;

        let result = handle.generate("Hello".to_string()).await;
        assert!(matches!(result, Err(AppError::Actor(ActorError::LlmError(_)))));
    }

    #[tokio::test]
    async fn test_bad_base_url_rejected() {
        let mut config = LlmConfig::new("key");
        config.base_url = "not a url".to_string();
        assert!(matches!(LlmActorHandle::new(config), Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_concurrent_calls_do_not_queue() {
        let mock_server = MockServer::start().await;
        let mut config = LlmConfig::new("gsk_test");
        config.base_url = format!("{}/openai/v1", mock_server.uri());
        config.request_timeout_secs = 3;
        let handle = LlmActorHandle::new(config).unwrap();

        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": [{"message": {"content": "JSON"}}]}))
                    .set_delay(Duration::from_secs(2)),
            )
            .expect(4)
            .mount(&mock_server)
            .await;

        let started = std::time::Instant::now();
        let mut calls = tokio::task::JoinSet::new();
        for i in 0..4 {
            let handle = handle.clone();
            calls.spawn(async move { handle.generate(format!("prompt {}", i)).await });
        }

        while let Some(joined) = calls.join_next().await {
            assert_eq!(joined.unwrap().unwrap(), "JSON");
        }
        // Serialized calls would need at least 8 seconds.
        assert!(started.elapsed() < Duration::from_secs(6), "took {:?}", started.elapsed());
    }
}
