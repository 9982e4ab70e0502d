//! Action dispatcher: validates an extracted record and performs at most
//! one side effect.
//!
//! Each handler converts the loosely-typed record into a typed request
//! first. A record that fails validation is skipped; a collaborator failure
//! is logged. Neither propagates.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::GoogleError;
use crate::pipeline::traits::{CalendarService, SpreadsheetService, TaskService};
use crate::pipeline::types::{
    ActionKind, EventRequest, EventTime, ExpenseRow, ExtractedRecord, TaskRequest,
};

/// Events span exactly one hour from the proposed start.
const EVENT_DURATION_HOURS: i64 = 1;

/// Where and how actions land.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub sheet_id: String,
    pub sheet_range: String,
    pub time_zone: String,
}

/// Why an action was not attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("No description found")]
    MissingTaskDescription,

    #[error("Missing title or time")]
    MissingEventFields,

    #[error("Unparseable proposed time '{0}'")]
    InvalidProposedTime(String),

    #[error("Missing details")]
    MissingExpenseFields,

    #[error("Unparseable total amount '{0}'")]
    InvalidAmount(String),
}

/// Result of dispatching one record.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The side effect happened.
    Completed(ActionKind),
    /// Validation failed, nothing was attempted.
    Skipped(ActionKind, SkipReason),
    /// The collaborator call failed.
    Failed(ActionKind, GoogleError),
}

impl DispatchOutcome {
    pub fn completed(&self) -> Option<ActionKind> {
        match self {
            Self::Completed(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Routes records to the task, calendar, or spreadsheet collaborator.
pub struct ActionDispatcher {
    tasks: Arc<dyn TaskService>,
    calendar: Arc<dyn CalendarService>,
    sheets: Arc<dyn SpreadsheetService>,
    settings: DispatchSettings,
}

impl ActionDispatcher {
    pub fn new(
        tasks: Arc<dyn TaskService>,
        calendar: Arc<dyn CalendarService>,
        sheets: Arc<dyn SpreadsheetService>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            tasks,
            calendar,
            sheets,
            settings,
        }
    }

    /// Perform the single action this record's intent calls for.
    pub async fn dispatch(&self, record: &ExtractedRecord) -> DispatchOutcome {
        let kind = record.kind;
        let attempt = match kind {
            ActionKind::CreateTask => self.create_task(record).await,
            ActionKind::CreateEvent => self.create_event(record).await,
            ActionKind::LogExpense => self.log_expense(record).await,
        };

        match attempt {
            Ok(Ok(())) => DispatchOutcome::Completed(kind),
            Ok(Err(e)) => {
                warn!(action = ?kind, error = %e, "Action failed");
                DispatchOutcome::Failed(kind, e)
            }
            Err(reason) => {
                warn!(action = ?kind, reason = %reason, "Skipping action");
                DispatchOutcome::Skipped(kind, reason)
            }
        }
    }

    async fn create_task(
        &self,
        record: &ExtractedRecord,
    ) -> Result<Result<(), GoogleError>, SkipReason> {
        let request = TaskRequest::from_record(record)?;
        Ok(self
            .tasks
            .create_task(&request.title, request.due)
            .await
            .map(|task| info!(title = %task.title, "Successfully created task")))
    }

    async fn create_event(
        &self,
        record: &ExtractedRecord,
    ) -> Result<Result<(), GoogleError>, SkipReason> {
        let request = EventRequest::from_record(record, &self.settings.time_zone)?;
        Ok(self
            .calendar
            .create_event(&request)
            .await
            .map(|event| info!(summary = %event.summary, "Successfully created event")))
    }

    async fn log_expense(
        &self,
        record: &ExtractedRecord,
    ) -> Result<Result<(), GoogleError>, SkipReason> {
        let row = ExpenseRow::from_record(record)?;
        Ok(self
            .sheets
            .append_row(&self.settings.sheet_id, &self.settings.sheet_range, row.cells())
            .await
            .map(|()| info!(vendor = %row.vendor_name, "Successfully logged expense")))
    }
}

// ── Validation ──────────────────────────────────────────────────────

impl TaskRequest {
    /// Requires a non-empty `task_description`. An unparseable `due_date`
    /// is dropped, not fatal.
    pub fn from_record(record: &ExtractedRecord) -> Result<Self, SkipReason> {
        let title = record
            .text("task_description")
            .ok_or(SkipReason::MissingTaskDescription)?;

        let due = record.text("due_date").and_then(|raw| {
            match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
                Err(_) => {
                    warn!(due_date = %raw, "Ignoring unparseable due date");
                    None
                }
            }
        });

        Ok(Self {
            title: title.to_string(),
            due,
        })
    }
}

impl EventRequest {
    /// Requires `event_title` and a parseable `proposed_time`.
    pub fn from_record(record: &ExtractedRecord, time_zone: &str) -> Result<Self, SkipReason> {
        let (Some(title), Some(raw_time)) =
            (record.text("event_title"), record.text("proposed_time"))
        else {
            return Err(SkipReason::MissingEventFields);
        };

        let invalid = || SkipReason::InvalidProposedTime(raw_time.to_string());
        let start = EventTime::parse(raw_time).ok_or_else(invalid)?;
        let end = start
            .plus(Duration::hours(EVENT_DURATION_HOURS))
            .ok_or_else(invalid)?;

        let attendees = match record.value("attendees") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            Some(Value::String(single)) if !single.trim().is_empty() => {
                vec![single.trim().to_string()]
            }
            _ => Vec::new(),
        };

        Ok(Self {
            title: title.to_string(),
            start,
            end,
            time_zone: time_zone.to_string(),
            attendees,
        })
    }
}

impl ExpenseRow {
    /// Requires `purchase_date`, `vendor_name` and a numeric `total_amount`.
    pub fn from_record(record: &ExtractedRecord) -> Result<Self, SkipReason> {
        let (Some(purchase_date), Some(vendor_name), Some(amount)) = (
            record.text("purchase_date"),
            record.text("vendor_name"),
            record.value("total_amount"),
        ) else {
            return Err(SkipReason::MissingExpenseFields);
        };

        Ok(Self {
            purchase_date: purchase_date.to_string(),
            vendor_name: vendor_name.to_string(),
            total_amount: parse_amount(amount)?,
        })
    }
}

/// Accepts JSON numbers and numeric strings (`"42.50"`, `"$1,200.00"`).
fn parse_amount(value: &Value) -> Result<Decimal, SkipReason> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s
            .trim()
            .trim_start_matches('$')
            .chars()
            .filter(|c| *c != ',')
            .collect(),
        _ => return Err(SkipReason::InvalidAmount(value.to_string())),
    };
    // Large floats may print in exponent form ("1e20").
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| SkipReason::InvalidAmount(value.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;
    use crate::pipeline::types::{CreatedEvent, CreatedTask};

    #[derive(Default)]
    struct Recorder {
        tasks: Mutex<Vec<(String, Option<DateTime<Utc>>)>>,
        events: Mutex<Vec<EventRequest>>,
        rows: Mutex<Vec<(String, String, Vec<Value>)>>,
        fail: bool,
    }

    impl Recorder {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn error(&self, service: &str) -> GoogleError {
            GoogleError::Api {
                service: service.into(),
                status: 500,
                body: "backend error".into(),
            }
        }
    }

    #[async_trait]
    impl TaskService for Recorder {
        async fn create_task(
            &self,
            title: &str,
            due: Option<DateTime<Utc>>,
        ) -> Result<CreatedTask, GoogleError> {
            if self.fail {
                return Err(self.error("tasks"));
            }
            self.tasks.lock().unwrap().push((title.to_string(), due));
            Ok(CreatedTask {
                id: Some("t1".into()),
                title: title.to_string(),
            })
        }
    }

    #[async_trait]
    impl CalendarService for Recorder {
        async fn create_event(&self, event: &EventRequest) -> Result<CreatedEvent, GoogleError> {
            if self.fail {
                return Err(self.error("calendar"));
            }
            self.events.lock().unwrap().push(event.clone());
            Ok(CreatedEvent {
                id: Some("e1".into()),
                summary: event.title.clone(),
            })
        }
    }

    #[async_trait]
    impl SpreadsheetService for Recorder {
        async fn append_row(
            &self,
            sheet_id: &str,
            range: &str,
            row: Vec<Value>,
        ) -> Result<(), GoogleError> {
            if self.fail {
                return Err(self.error("sheets"));
            }
            self.rows
                .lock()
                .unwrap()
                .push((sheet_id.to_string(), range.to_string(), row));
            Ok(())
        }
    }

    fn dispatcher(recorder: Arc<Recorder>) -> ActionDispatcher {
        ActionDispatcher::new(
            recorder.clone(),
            recorder.clone(),
            recorder,
            DispatchSettings {
                sheet_id: "sheet-123".into(),
                sheet_range: "Sheet1!A1".into(),
                time_zone: "America/Chicago".into(),
            },
        )
    }

    fn record(kind: ActionKind, fields: Value) -> ExtractedRecord {
        ExtractedRecord::new(kind, fields.as_object().cloned().unwrap())
    }

    // ── Tasks ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn task_created_with_midnight_utc_due() {
        let recorder = Arc::new(Recorder::default());
        let outcome = dispatcher(recorder.clone())
            .dispatch(&record(
                ActionKind::CreateTask,
                json!({"task_description": "Send Q3 report", "due_date": "2024-03-15", "priority": "High"}),
            ))
            .await;

        assert_eq!(outcome.completed(), Some(ActionKind::CreateTask));
        let tasks = recorder.tasks.lock().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].0, "Send Q3 report");
        assert_eq!(
            tasks[0].1,
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn empty_task_description_creates_nothing() {
        let recorder = Arc::new(Recorder::default());
        let outcome = dispatcher(recorder.clone())
            .dispatch(&record(
                ActionKind::CreateTask,
                json!({"task_description": "", "due_date": null, "priority": "Low"}),
            ))
            .await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Skipped(ActionKind::CreateTask, SkipReason::MissingTaskDescription)
        ));
        assert!(outcome.completed().is_none());
        assert!(recorder.tasks.lock().unwrap().is_empty());
    }

    #[test]
    fn bad_due_date_is_dropped() {
        let request = TaskRequest::from_record(&record(
            ActionKind::CreateTask,
            json!({"task_description": "Call Bob", "due_date": "next Friday"}),
        ))
        .unwrap();
        assert_eq!(request.title, "Call Bob");
        assert!(request.due.is_none());
    }

    // ── Events ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn event_spans_one_hour_in_configured_zone() {
        let recorder = Arc::new(Recorder::default());
        let outcome = dispatcher(recorder.clone())
            .dispatch(&record(
                ActionKind::CreateEvent,
                json!({
                    "event_title": "Project kickoff",
                    "attendees": ["ana@example.com", "raj@example.com"],
                    "proposed_time": "2024-04-02T15:00:00"
                }),
            ))
            .await;

        assert_eq!(outcome.completed(), Some(ActionKind::CreateEvent));
        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.title, "Project kickoff");
        assert_eq!(event.start.to_api_string(), "2024-04-02T15:00:00");
        assert_eq!(event.end.to_api_string(), "2024-04-02T16:00:00");
        assert_eq!(event.time_zone, "America/Chicago");
        assert_eq!(event.attendees, vec!["ana@example.com", "raj@example.com"]);
    }

    #[tokio::test]
    async fn missing_proposed_time_creates_no_event() {
        let recorder = Arc::new(Recorder::default());
        let outcome = dispatcher(recorder.clone())
            .dispatch(&record(
                ActionKind::CreateEvent,
                json!({"event_title": "Lunch", "attendees": []}),
            ))
            .await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Skipped(ActionKind::CreateEvent, SkipReason::MissingEventFields)
        ));
        assert!(recorder.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn null_proposed_time_creates_no_event() {
        let recorder = Arc::new(Recorder::default());
        let outcome = dispatcher(recorder.clone())
            .dispatch(&record(
                ActionKind::CreateEvent,
                json!({"event_title": "Lunch", "proposed_time": null}),
            ))
            .await;
        assert!(outcome.completed().is_none());
        assert!(recorder.events.lock().unwrap().is_empty());
    }

    #[test]
    fn unparseable_proposed_time_is_skipped() {
        let err = EventRequest::from_record(
            &record(
                ActionKind::CreateEvent,
                json!({"event_title": "Sync", "proposed_time": "sometime next week"}),
            ),
            "America/Chicago",
        )
        .unwrap_err();
        assert_eq!(err, SkipReason::InvalidProposedTime("sometime next week".into()));
    }

    #[test]
    fn absent_attendees_are_valid() {
        let request = EventRequest::from_record(
            &record(
                ActionKind::CreateEvent,
                json!({"event_title": "Focus time", "proposed_time": "2024-04-02T09:00:00"}),
            ),
            "America/Chicago",
        )
        .unwrap();
        assert!(request.attendees.is_empty());
    }

    #[test]
    fn non_string_attendees_ignored() {
        let request = EventRequest::from_record(
            &record(
                ActionKind::CreateEvent,
                json!({
                    "event_title": "Sync",
                    "proposed_time": "2024-04-02T09:00:00",
                    "attendees": ["a@x.com", 7, null, " "]
                }),
            ),
            "America/Chicago",
        )
        .unwrap();
        assert_eq!(request.attendees, vec!["a@x.com"]);
    }

    // ── Expenses ────────────────────────────────────────────────────

    #[tokio::test]
    async fn receipt_appends_exactly_one_row() {
        let recorder = Arc::new(Recorder::default());
        let outcome = dispatcher(recorder.clone())
            .dispatch(&record(
                ActionKind::LogExpense,
                json!({"vendor_name": "Acme", "total_amount": 42.50, "purchase_date": "2024-03-01"}),
            ))
            .await;

        assert_eq!(outcome.completed(), Some(ActionKind::LogExpense));
        assert_eq!(ActionKind::LogExpense.label(), "Logged Expense to Sheet");

        let rows = recorder.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        let (sheet_id, range, row) = &rows[0];
        assert_eq!(sheet_id, "sheet-123");
        assert_eq!(range, "Sheet1!A1");
        assert_eq!(Value::Array(row.clone()), json!(["2024-03-01", "Acme", 42.50]));
    }

    #[tokio::test]
    async fn expense_missing_field_skipped() {
        let recorder = Arc::new(Recorder::default());
        let outcome = dispatcher(recorder.clone())
            .dispatch(&record(
                ActionKind::LogExpense,
                json!({"vendor_name": "Acme", "total_amount": 10}),
            ))
            .await;
        assert!(matches!(
            outcome,
            DispatchOutcome::Skipped(ActionKind::LogExpense, SkipReason::MissingExpenseFields)
        ));
        assert!(recorder.rows.lock().unwrap().is_empty());
    }

    #[test]
    fn amount_accepts_numeric_strings() {
        assert_eq!(parse_amount(&json!("42.50")).unwrap(), dec!(42.50));
        assert_eq!(parse_amount(&json!("$1,200.00")).unwrap(), dec!(1200.00));
        assert_eq!(parse_amount(&json!(7)).unwrap(), dec!(7));
        assert!(matches!(
            parse_amount(&json!("forty")),
            Err(SkipReason::InvalidAmount(_))
        ));
        assert!(parse_amount(&json!(true)).is_err());
    }

    #[test]
    fn large_amounts_parse_or_skip() {
        assert_eq!(
            parse_amount(&json!(1e20)).unwrap(),
            dec!(100000000000000000000)
        );
        assert_eq!(parse_amount(&json!("2.5e3")).unwrap(), dec!(2500));
        // Beyond Decimal's range: skipped, not a crash.
        assert!(matches!(
            parse_amount(&json!(1e30)),
            Err(SkipReason::InvalidAmount(_))
        ));
        assert!(matches!(
            parse_amount(&json!("9e99")),
            Err(SkipReason::InvalidAmount(_))
        ));
    }

    #[test]
    fn far_future_proposed_time_is_skipped() {
        let raw = "+262142-12-31T23:30:00";
        let err = EventRequest::from_record(
            &record(
                ActionKind::CreateEvent,
                json!({"event_title": "Sync", "proposed_time": raw}),
            ),
            "America/Chicago",
        )
        .unwrap_err();
        assert_eq!(err, SkipReason::InvalidProposedTime(raw.into()));
    }

    #[tokio::test]
    async fn far_future_proposed_time_dispatches_nothing() {
        let recorder = Arc::new(Recorder::default());
        let outcome = dispatcher(recorder.clone())
            .dispatch(&record(
                ActionKind::CreateEvent,
                json!({"event_title": "Sync", "proposed_time": "+262142-12-31T23:30:00"}),
            ))
            .await;
        assert!(matches!(
            outcome,
            DispatchOutcome::Skipped(ActionKind::CreateEvent, SkipReason::InvalidProposedTime(_))
        ));
        assert!(recorder.events.lock().unwrap().is_empty());
    }

    // ── Collaborator failures ───────────────────────────────────────

    #[tokio::test]
    async fn collaborator_failure_is_reported_not_raised() {
        let recorder = Arc::new(Recorder::failing());
        let dispatcher = dispatcher(recorder);

        let task = dispatcher
            .dispatch(&record(ActionKind::CreateTask, json!({"task_description": "x"})))
            .await;
        assert!(matches!(task, DispatchOutcome::Failed(ActionKind::CreateTask, _)));

        let event = dispatcher
            .dispatch(&record(
                ActionKind::CreateEvent,
                json!({"event_title": "x", "proposed_time": "2024-01-01T10:00:00"}),
            ))
            .await;
        assert!(matches!(event, DispatchOutcome::Failed(ActionKind::CreateEvent, _)));

        let expense = dispatcher
            .dispatch(&record(
                ActionKind::LogExpense,
                json!({"vendor_name": "x", "total_amount": 1, "purchase_date": "2024-01-01"}),
            ))
            .await;
        assert!(expense.completed().is_none());
    }
}
