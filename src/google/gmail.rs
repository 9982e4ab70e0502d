//! Gmail mailbox: list unread, fetch full messages, remove the UNREAD label.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::{GoogleClient, build_url, html_to_text, normalize_base_url};
use crate::error::GoogleError;
use crate::pipeline::traits::MailSource;
use crate::pipeline::types::EmailMessage;

const SERVICE: &str = "gmail";
pub const DEFAULT_GMAIL_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

const DEFAULT_SUBJECT: &str = "No Subject";
const DEFAULT_SENDER: &str = "Unknown Sender";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMessagesResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailMessage {
    id: String,
    #[serde(default)]
    payload: MessagePart,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagePart {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    headers: Vec<Header>,
    #[serde(default)]
    body: PartBody,
    #[serde(default)]
    parts: Vec<MessagePart>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct PartBody {
    #[serde(default)]
    data: Option<String>,
}

/// Gmail-backed `MailSource` for the authenticated user's mailbox.
pub struct GmailMailbox {
    client: GoogleClient,
    base_url: String,
}

impl GmailMailbox {
    pub fn new(client: GoogleClient) -> Self {
        Self::with_base_url(client, DEFAULT_GMAIL_BASE_URL)
    }

    pub fn with_base_url(client: GoogleClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }

    async fn get_message(&self, id: &str) -> Result<EmailMessage, GoogleError> {
        let url = build_url(SERVICE, &self.base_url, &["users", "me", "messages", id])?;
        let message: GmailMessage = self
            .client
            .get_json(SERVICE, url, &[("format", "full")])
            .await?;
        Ok(message.into_email())
    }
}

#[async_trait]
impl MailSource for GmailMailbox {
    async fn list_unread(&self, max_results: u32) -> Result<Vec<EmailMessage>, GoogleError> {
        let url = build_url(SERVICE, &self.base_url, &["users", "me", "messages"])?;
        let max = max_results.to_string();
        let listing: ListMessagesResponse = self
            .client
            .get_json(SERVICE, url, &[("q", "is:unread"), ("maxResults", max.as_str())])
            .await?;

        info!(count = listing.messages.len(), "Fetched unread message list");

        let mut emails = Vec::with_capacity(listing.messages.len());
        for message in &listing.messages {
            let email = self.get_message(&message.id).await?;
            debug!(id = %email.short_id(), subject = %email.subject, "Fetched message");
            emails.push(email);
        }
        Ok(emails)
    }

    async fn mark_read(&self, id: &str) -> Result<(), GoogleError> {
        let url = build_url(SERVICE, &self.base_url, &["users", "me", "messages", id, "modify"])?;
        let body = json!({ "removeLabelIds": ["UNREAD"] });
        let _: Value = self.client.post_json(SERVICE, url, &[], &body).await?;
        Ok(())
    }
}

impl GmailMessage {
    fn into_email(self) -> EmailMessage {
        let header = |name: &str| {
            self.payload
                .headers
                .iter()
                .find(|h| h.name.eq_ignore_ascii_case(name))
                .map(|h| h.value.clone())
        };
        let subject = header("Subject").unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
        let sender = header("From").unwrap_or_else(|| DEFAULT_SENDER.to_string());
        let body = resolve_body(&self.payload);

        EmailMessage {
            id: self.id,
            sender,
            subject,
            body,
        }
    }
}

/// Plain text wins; HTML-only bodies are converted, single-part or not.
/// A single-part body of any other type is taken as-is.
fn resolve_body(payload: &MessagePart) -> String {
    if payload.parts.is_empty() {
        let data = payload.body.data.as_deref().and_then(decode_body);
        return match data {
            Some(html) if payload.mime_type.eq_ignore_ascii_case("text/html") => html_to_text(&html),
            Some(text) => text,
            None => String::new(),
        };
    }
    if let Some(text) = find_part(payload, "text/plain") {
        return text;
    }
    find_part(payload, "text/html")
        .map(|html| html_to_text(&html))
        .unwrap_or_default()
}

/// Depth-first search for the first decodable part of `mime_type`.
fn find_part(part: &MessagePart, mime_type: &str) -> Option<String> {
    if part.mime_type.eq_ignore_ascii_case(mime_type)
        && let Some(data) = &part.body.data
        && let Some(text) = decode_body(data)
    {
        return Some(text);
    }
    part.parts.iter().find_map(|child| find_part(child, mime_type))
}

/// Gmail body data is URL-safe base64, sometimes with padding.
fn decode_body(data: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(data.trim().trim_end_matches('=')).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}
