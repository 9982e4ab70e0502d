//! Email triage agent. Classifies unread mail and turns the actionable
//! messages into Google Workspace entries.

pub mod config;
pub mod error;
pub mod google;
pub mod llm;
pub mod pipeline;
