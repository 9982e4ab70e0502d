//! Pipeline orchestrator. Drives each unread message through
//! classify → extract → act → mark-read and collects summary rows.
//!
//! Strictly sequential: one message is finished before the next starts.
//! Only the initial fetch can fail the run.

use std::sync::Arc;

use serde_json::Map;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::pipeline::classifier::IntentClassifier;
use crate::pipeline::dispatcher::ActionDispatcher;
use crate::pipeline::extractor::FieldExtractor;
use crate::pipeline::traits::MailSource;
use crate::pipeline::types::{EmailMessage, ProcessingResult};

/// The triage pipeline with all its collaborators wired in.
pub struct TriagePipeline {
    mail: Arc<dyn MailSource>,
    classifier: IntentClassifier,
    extractor: FieldExtractor,
    dispatcher: ActionDispatcher,
    max_results: u32,
}

impl TriagePipeline {
    pub fn new(
        mail: Arc<dyn MailSource>,
        classifier: IntentClassifier,
        extractor: FieldExtractor,
        dispatcher: ActionDispatcher,
        max_results: u32,
    ) -> Self {
        Self {
            mail,
            classifier,
            extractor,
            dispatcher,
            max_results,
        }
    }

    /// Fetch unread messages and process each in mailbox order.
    pub async fn run(&self) -> Result<Vec<ProcessingResult>, PipelineError> {
        let messages = self
            .mail
            .list_unread(self.max_results)
            .await
            .map_err(PipelineError::Fetch)?;

        if messages.is_empty() {
            info!("No unread messages found");
            return Ok(Vec::new());
        }

        info!(count = messages.len(), "Starting email processing pipeline");

        let mut results = Vec::with_capacity(messages.len());
        for message in &messages {
            if let Some(result) = self.process_message(message).await {
                results.push(result);
            }
        }

        info!(
            processed = results.len(),
            total = messages.len(),
            "Pipeline complete"
        );
        Ok(results)
    }

    /// Process one message.
    ///
    /// Returns `None` for an empty body. Such a message is neither classified
    /// nor marked read; it stays unread and gets no summary row.
    pub async fn process_message(&self, message: &EmailMessage) -> Option<ProcessingResult> {
        info!(
            id = %message.short_id(),
            from = %message.sender,
            subject = %message.subject,
            "Processing email"
        );

        if !message.has_body() {
            info!(id = %message.short_id(), "Skipping: email body is empty");
            return None;
        }

        let intent = self.classifier.classify(&message.body).await;
        info!(intent = %intent, "Identified intent");

        let mut action_taken = None;
        let mut details = Map::new();

        if intent.is_actionable()
            && let Some(record) = self.extractor.extract(&message.body, &intent).await
        {
            info!(fields = %serde_json::Value::Object(record.fields.clone()), "Extracted data");
            action_taken = self.dispatcher.dispatch(&record).await.completed();
            details = record.fields;
        }

        match self.mail.mark_read(&message.id).await {
            Ok(()) => info!(id = %message.short_id(), "Marked email as read"),
            Err(e) => warn!(id = %message.short_id(), error = %e, "Error marking email as read"),
        }

        Some(ProcessingResult {
            subject: message.subject.clone(),
            intent,
            action_taken,
            details,
        })
    }
}
