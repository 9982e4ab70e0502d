//! Collaborator traits: the mailbox and the three action targets.
//!
//! Pure I/O seams, no triage logic. The Google adapters in `crate::google`
//! implement them; tests use in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::GoogleError;
use crate::pipeline::types::{CreatedEvent, CreatedTask, EmailMessage, EventRequest};

/// Source of unread messages.
#[async_trait]
pub trait MailSource: Send + Sync {
    /// Fetch at most `max_results` unread messages, in mailbox order.
    async fn list_unread(&self, max_results: u32) -> Result<Vec<EmailMessage>, GoogleError>;

    /// Mark one message as read.
    async fn mark_read(&self, id: &str) -> Result<(), GoogleError>;
}

/// Task-management collaborator.
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn create_task(
        &self,
        title: &str,
        due: Option<DateTime<Utc>>,
    ) -> Result<CreatedTask, GoogleError>;
}

/// Calendar collaborator.
#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn create_event(&self, event: &EventRequest) -> Result<CreatedEvent, GoogleError>;
}

/// Spreadsheet collaborator.
#[async_trait]
pub trait SpreadsheetService: Send + Sync {
    /// Append one row of cells after the table found at `range`.
    async fn append_row(&self, sheet_id: &str, range: &str, row: Vec<Value>)
    -> Result<(), GoogleError>;
}
