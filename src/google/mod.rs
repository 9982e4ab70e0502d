//! Google Workspace REST collaborators: Gmail, Tasks, Calendar, Sheets.
//!
//! All four share one authenticated `GoogleClient`. Base URLs are
//! overridable so tests can point them at a mock server.

pub mod auth;
pub mod calendar;
pub mod gmail;
mod html;
pub mod sheets;
pub mod tasks;

pub use calendar::GoogleCalendar;
pub use gmail::GmailMailbox;
pub use html::html_to_text;
pub use sheets::GoogleSheets;
pub use tasks::GoogleTasks;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::GoogleError;

/// Authenticated HTTP client for Google APIs.
#[derive(Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    access_token: SecretString,
}

impl GoogleClient {
    pub fn new(access_token: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token,
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        service: &str,
        url: reqwest::Url,
        query: &[(&str, &str)],
    ) -> Result<T, GoogleError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(self.access_token.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| request_error(service, e))?;

        handle_response(service, response).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        service: &str,
        url: reqwest::Url,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T, GoogleError> {
        let response = self
            .http
            .post(url)
            .query(query)
            .json(body)
            .bearer_auth(self.access_token.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| request_error(service, e))?;

        handle_response(service, response).await
    }
}

fn request_error(service: &str, e: reqwest::Error) -> GoogleError {
    GoogleError::Request {
        service: service.to_string(),
        reason: e.to_string(),
    }
}

async fn handle_response<T: DeserializeOwned>(
    service: &str,
    response: reqwest::Response,
) -> Result<T, GoogleError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(GoogleError::Unauthorized {
            service: service.to_string(),
        });
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GoogleError::Api {
            service: service.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    response.json::<T>().await.map_err(|e| GoogleError::Decode {
        service: service.to_string(),
        reason: e.to_string(),
    })
}

/// Trim whitespace and trailing slashes from a base URL.
pub(crate) fn normalize_base_url(endpoint: &str) -> String {
    endpoint.trim().trim_end_matches('/').to_string()
}

/// Append path segments to a base URL, percent-encoding each segment.
pub(crate) fn build_url(service: &str, base_url: &str, segments: &[&str]) -> Result<reqwest::Url, GoogleError> {
    let invalid = |reason: String| GoogleError::Request {
        service: service.to_string(),
        reason,
    };

    let mut url = reqwest::Url::parse(base_url).map_err(|e| invalid(format!("invalid base URL: {e}")))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| invalid("base URL must be an absolute URL".to_string()))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}
