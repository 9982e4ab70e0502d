//! Email triage pipeline.
//!
//! Every unread message flows through:
//! 1. `IntentClassifier::classify()`: one label per message
//! 2. `FieldExtractor::extract()`: structured fields for actionable intents
//! 3. `ActionDispatcher::dispatch()`: at most one side effect
//! 4. `MailSource::mark_read()`
//!
//! `TriagePipeline` drives the steps; `render_summary` prints the outcome.

pub mod classifier;
pub mod dispatcher;
pub mod extractor;
pub mod processor;
pub mod summary;
pub mod traits;
pub mod types;

pub use classifier::IntentClassifier;
pub use dispatcher::{ActionDispatcher, DispatchOutcome, DispatchSettings, SkipReason};
pub use extractor::{FieldExtractor, normalize_json_response};
pub use processor::TriagePipeline;
pub use summary::{NO_EMAILS_PROCESSED, render_summary};
pub use traits::{CalendarService, MailSource, SpreadsheetService, TaskService};
pub use types::*;
