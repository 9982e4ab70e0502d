//! Google Tasks: insert into the default task list.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GoogleClient, build_url, normalize_base_url};
use crate::error::GoogleError;
use crate::pipeline::traits::TaskService;
use crate::pipeline::types::CreatedTask;

const SERVICE: &str = "tasks";
pub const DEFAULT_TASKS_BASE_URL: &str = "https://tasks.googleapis.com/tasks/v1";

#[derive(Debug, Serialize)]
struct NewTask<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    due: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskResource {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

pub struct GoogleTasks {
    client: GoogleClient,
    base_url: String,
}

impl GoogleTasks {
    pub fn new(client: GoogleClient) -> Self {
        Self::with_base_url(client, DEFAULT_TASKS_BASE_URL)
    }

    pub fn with_base_url(client: GoogleClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }
}

/// RFC 3339 with millisecond precision, as the Tasks API echoes it back.
fn format_due(due: DateTime<Utc>) -> String {
    due.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[async_trait]
impl TaskService for GoogleTasks {
    async fn create_task(
        &self,
        title: &str,
        due: Option<DateTime<Utc>>,
    ) -> Result<CreatedTask, GoogleError> {
        let url = build_url(SERVICE, &self.base_url, &["lists", "@default", "tasks"])?;
        let body = NewTask {
            title,
            due: due.map(format_due),
        };
        let created: TaskResource = self.client.post_json(SERVICE, url, &[], &body).await?;

        Ok(CreatedTask {
            id: created.id,
            title: created.title.unwrap_or_else(|| title.to_string()),
        })
    }
}
