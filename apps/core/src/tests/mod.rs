//! Test Module
//!
//! Shared fixtures and the cross-module test suite.
//!
//! ## Test Categories
//! - `memory_tests`: Memory logger writes, filtered reads and statistics
//! - `router_tests`: Routing flow with scripted LLM and classifier doubles
//! - `server_tests`: HTTP surface driven through `tower::ServiceExt::oneshot`

mod server_tests;

use crate::actors::messages::AppError;
use crate::actors::traits::LlmActor;
use crate::memory::MemoryLogger;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

type ReplyFn = Box<dyn Fn(&str) -> Result<String, AppError> + Send + Sync>;

/// LLM double answering every prompt through a closure and counting calls.
pub(crate) struct ScriptedLlm {
    reply_fn: ReplyFn,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<String, AppError> + Send + Sync + 'static,
    {
        Self {
            reply_fn: Box::new(f),
            calls: AtomicUsize::new(0),
        }
    }

    /// Answers every prompt with `reply`.
    pub(crate) fn replying(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self::new(move |_| Ok(reply.clone()))
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmActor for ScriptedLlm {
    async fn generate_with_params(
        &self,
        prompt: String,
        _system_prompt: Option<String>,
        _temperature: Option<f32>,
    ) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.reply_fn)(&prompt)
    }
}

/// A memory logger over a fresh database file. Keep the `TempDir` alive for the test.
pub(crate) async fn temp_memory() -> (MemoryLogger, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_url = format!("sqlite://{}", dir.path().join("memory_logs.db").display());
    let memory = MemoryLogger::connect(&db_url)
        .await
        .expect("Failed to open test database");
    (memory, dir)
}
