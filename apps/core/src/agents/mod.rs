//! Per-format document agents.
//!
//! The classifier and email agent talk to the LLM through [`LlmActor`]; the
//! JSON and PDF agents are purely local.
//!
//! [`LlmActor`]: crate::actors::traits::LlmActor

pub mod classifier;
pub mod email;
pub mod json;
pub mod pdf;

pub use classifier::ClassifierAgent;
pub use email::EmailAgent;
pub use json::JsonAgent;
pub use pdf::PdfAgent;
