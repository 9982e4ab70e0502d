//! Google Sheets: append one row after the table at a range.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use super::{GoogleClient, build_url, normalize_base_url};
use crate::error::GoogleError;
use crate::pipeline::traits::SpreadsheetService;

const SERVICE: &str = "sheets";
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";

pub struct GoogleSheets {
    client: GoogleClient,
    base_url: String,
}

impl GoogleSheets {
    pub fn new(client: GoogleClient) -> Self {
        Self::with_base_url(client, DEFAULT_SHEETS_BASE_URL)
    }

    pub fn with_base_url(client: GoogleClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }
}

#[async_trait]
impl SpreadsheetService for GoogleSheets {
    async fn append_row(
        &self,
        sheet_id: &str,
        range: &str,
        row: Vec<Value>,
    ) -> Result<(), GoogleError> {
        let append = format!("{range}:append");
        let url = build_url(
            SERVICE,
            &self.base_url,
            &["spreadsheets", sheet_id, "values", &append],
        )?;
        let body = json!({ "values": [row] });
        let response: Value = self
            .client
            .post_json(SERVICE, url, &[("valueInputOption", "USER_ENTERED")], &body)
            .await?;

        if let Some(updated) = response.pointer("/updates/updatedRange").and_then(Value::as_str) {
            debug!(range = %updated, "Sheet row appended");
        }
        Ok(())
    }
}
