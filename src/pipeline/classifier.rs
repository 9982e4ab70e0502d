//! Intent classifier: one LLM call per message, one label back.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm::provider::{CompletionRequest, LlmProvider};
use crate::pipeline::types::Intent;

/// Classifies message bodies into the intent taxonomy.
pub struct IntentClassifier {
    llm: Arc<dyn LlmProvider>,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Classify a non-empty body.
    ///
    /// Returns the trimmed model output as an `Intent`. A failed LLM call
    /// yields `Intent::Error`.
    pub async fn classify(&self, body: &str) -> Intent {
        let request = CompletionRequest::prompt(build_classification_prompt(body));

        match self.llm.complete(request).await {
            Ok(response) => {
                let label = response.content.trim();
                debug!(label = %label, "Classifier response");
                Intent::from_label(label)
            }
            Err(e) => {
                warn!(error = %e, "Error classifying intent");
                Intent::Error
            }
        }
    }
}

/// Build the classification prompt for a message body.
fn build_classification_prompt(body: &str) -> String {
    let categories: String = Intent::TAXONOMY
        .iter()
        .map(|label| format!("- {label}\n"))
        .collect();

    format!(
        "Analyze the following email content and classify its primary intent.\n\
         Choose from one of these categories:\n\
         {categories}\n\
         Email Content:\n\
         ---\n\
         {body}\n\
         ---\n\
         Return only the single intent category name."
    )
}
