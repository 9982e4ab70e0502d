//! Google Calendar: insert into the primary calendar.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GoogleClient, build_url, normalize_base_url};
use crate::error::GoogleError;
use crate::pipeline::traits::CalendarService;
use crate::pipeline::types::{CreatedEvent, EventRequest};

const SERVICE: &str = "calendar";
pub const DEFAULT_CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTimeBody<'a> {
    date_time: String,
    time_zone: &'a str,
}

#[derive(Debug, Serialize)]
struct Attendee<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct NewEvent<'a> {
    summary: &'a str,
    start: EventTimeBody<'a>,
    end: EventTimeBody<'a>,
    attendees: Vec<Attendee<'a>>,
}

impl<'a> From<&'a EventRequest> for NewEvent<'a> {
    fn from(event: &'a EventRequest) -> Self {
        Self {
            summary: &event.title,
            start: EventTimeBody {
                date_time: event.start.to_api_string(),
                time_zone: &event.time_zone,
            },
            end: EventTimeBody {
                date_time: event.end.to_api_string(),
                time_zone: &event.time_zone,
            },
            attendees: event
                .attendees
                .iter()
                .map(|email| Attendee { email })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventResource {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

pub struct GoogleCalendar {
    client: GoogleClient,
    base_url: String,
}

impl GoogleCalendar {
    pub fn new(client: GoogleClient) -> Self {
        Self::with_base_url(client, DEFAULT_CALENDAR_BASE_URL)
    }

    pub fn with_base_url(client: GoogleClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }
}

#[async_trait]
impl CalendarService for GoogleCalendar {
    async fn create_event(&self, event: &EventRequest) -> Result<CreatedEvent, GoogleError> {
        let url = build_url(SERVICE, &self.base_url, &["calendars", "primary", "events"])?;
        let body = NewEvent::from(event);
        let created: EventResource = self.client.post_json(SERVICE, url, &[], &body).await?;

        Ok(CreatedEvent {
            id: created.id,
            summary: created.summary.unwrap_or_else(|| event.title.clone()),
        })
    }
}
