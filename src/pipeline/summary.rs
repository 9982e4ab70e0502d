//! Final run summary.

use comfy_table::{Table, presets::UTF8_FULL};
use serde_json::Value;

use crate::pipeline::types::ProcessingResult;

/// Printed instead of a table when nothing was processed.
pub const NO_EMAILS_PROCESSED: &str = "no emails processed";

/// Render results as a table of subject, intent, action and details.
pub fn render_summary(results: &[ProcessingResult]) -> String {
    if results.is_empty() {
        return NO_EMAILS_PROCESSED.to_string();
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["subject", "intent", "action", "details"]);

    for result in results {
        let details = serde_json::to_string_pretty(&Value::Object(result.details.clone()))
            .unwrap_or_else(|_| "{}".to_string());
        table.add_row([
            result.subject.as_str(),
            result.intent.label(),
            result.action_label(),
            details.as_str(),
        ]);
    }

    table.to_string()
}
