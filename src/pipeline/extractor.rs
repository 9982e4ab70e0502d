//! Field extractor: per-intent prompt, JSON object back.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::llm::provider::{CompletionRequest, LlmProvider};
use crate::pipeline::types::{ActionKind, ExtractedRecord, Intent};

/// Pulls structured fields out of actionable messages.
pub struct FieldExtractor {
    llm: Arc<dyn LlmProvider>,
}

impl FieldExtractor {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Extract the fields for `intent`.
    ///
    /// Non-actionable intents return `None` without calling the model.
    /// Failures are logged and also return `None`.
    pub async fn extract(&self, body: &str, intent: &Intent) -> Option<ExtractedRecord> {
        let kind = intent.action_kind()?;

        match self.try_extract(body, kind).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(intent = %intent, error = %e, "Error extracting information");
                None
            }
        }
    }

    async fn try_extract(&self, body: &str, kind: ActionKind) -> Result<ExtractedRecord, ExtractError> {
        let request = CompletionRequest::prompt(build_extraction_prompt(kind, body));
        let response = self.llm.complete(request).await?;
        debug!(raw_response = %response.content, "Extractor response");

        let fields = normalize_json_response(&response.content)?;
        Ok(ExtractedRecord::new(kind, fields))
    }
}

/// Build the extraction prompt for one action kind.
fn build_extraction_prompt(kind: ActionKind, body: &str) -> String {
    let (subject, keys) = match kind {
        ActionKind::CreateTask => (
            "task details",
            r#""task_description", "due_date" (YYYY-MM-DD or null), "priority" ("High", "Medium", "Low")"#,
        ),
        ActionKind::CreateEvent => (
            "event details",
            r#""event_title", "attendees" (list of emails), "proposed_time" (YYYY-MM-DDTHH:MM:SS or null)"#,
        ),
        ActionKind::LogExpense => (
            "expense details",
            r#""vendor_name", "total_amount" (number), "purchase_date" (YYYY-MM-DD)"#,
        ),
    };

    format!(
        "From the email below, extract the {subject}.\n\
         Return a JSON object with keys: {keys}.\n\
         Return only the JSON object.\n\
         Email Content: --- {body} ---"
    )
}

/// Strip whitespace and markdown code fences, then parse a JSON object.
///
/// Accepts ```` ```json ```` and bare ```` ``` ```` fences. Anything that is
/// not a JSON object after cleaning is an error.
pub fn normalize_json_response(raw: &str) -> Result<Map<String, Value>, ExtractError> {
    let cleaned = strip_code_fences(raw);
    match serde_json::from_str::<Value>(cleaned)? {
        Value::Object(map) => Ok(map),
        _ => Err(ExtractError::NotAnObject),
    }
}

fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop an optional language tag on the opening fence line.
        text = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest);
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}
