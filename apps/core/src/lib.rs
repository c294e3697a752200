//! Document intake router.
//!
//! Classifies incoming documents (PDF, JSON, email) by format and intent with a
//! hosted LLM, hands each to a format-specific agent, and records every outcome
//! in a SQLite memory log.

pub mod actors;
pub mod agents;
pub mod config;
pub mod database;
pub mod error;
pub mod fs_manager;
pub mod heuristics;
pub mod memory;
pub mod models;
pub mod prompts;
pub mod router;
pub mod schemas;
pub mod server;

pub use error::AppError;
pub use router::{AgentRouter, DefaultRouter};

#[cfg(test)]
mod tests;
