//! Shared types for the triage pipeline.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

// ── Message ─────────────────────────────────────────────────────────

/// An unread message as fetched from the mailbox.
///
/// Immutable once fetched. The only thing that happens to it afterwards is
/// being marked read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Mailbox-assigned opaque ID.
    pub id: String,
    pub sender: String,
    pub subject: String,
    /// Plain-text body (HTML-only messages are already converted).
    pub body: String,
}

impl EmailMessage {
    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }

    /// Shortened ID for log lines.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(10) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }
}

// ── Intent ──────────────────────────────────────────────────────────

/// Classified purpose of an email.
///
/// `Error` is the sentinel for a failed classification. Any label outside
/// the taxonomy is carried verbatim in `Unrecognized` and treated as
/// non-actionable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Intent {
    TaskDelegation,
    SchedulingRequest,
    ReceiptInvoice,
    InformationQuery,
    NoActionNeeded,
    Error,
    Unrecognized(String),
}

impl Intent {
    /// The five labels the classifier may legitimately return.
    pub const TAXONOMY: [&'static str; 5] = [
        "task_delegation",
        "scheduling_request",
        "receipt_invoice",
        "information_query",
        "no_action_needed",
    ];

    /// Map a label onto the enum. Exact match only.
    pub fn from_label(label: &str) -> Self {
        match label {
            "task_delegation" => Self::TaskDelegation,
            "scheduling_request" => Self::SchedulingRequest,
            "receipt_invoice" => Self::ReceiptInvoice,
            "information_query" => Self::InformationQuery,
            "no_action_needed" => Self::NoActionNeeded,
            "error" => Self::Error,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::TaskDelegation => "task_delegation",
            Self::SchedulingRequest => "scheduling_request",
            Self::ReceiptInvoice => "receipt_invoice",
            Self::InformationQuery => "information_query",
            Self::NoActionNeeded => "no_action_needed",
            Self::Error => "error",
            Self::Unrecognized(label) => label,
        }
    }

    /// The action this intent can trigger, if any.
    pub fn action_kind(&self) -> Option<ActionKind> {
        match self {
            Self::TaskDelegation => Some(ActionKind::CreateTask),
            Self::SchedulingRequest => Some(ActionKind::CreateEvent),
            Self::ReceiptInvoice => Some(ActionKind::LogExpense),
            _ => None,
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.action_kind().is_some()
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Intent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

// ── Actions ─────────────────────────────────────────────────────────

/// One of the three side-effecting actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateTask,
    CreateEvent,
    LogExpense,
}

impl ActionKind {
    /// Human-readable label used in the summary.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreateTask => "Created Google Task",
            Self::CreateEvent => "Created Calendar Event",
            Self::LogExpense => "Logged Expense to Sheet",
        }
    }
}

// ── Extracted record ────────────────────────────────────────────────

/// Structured fields pulled from a message for one actionable intent.
///
/// Fields are kept exactly as the model returned them. Typed validation
/// happens in the dispatcher, right before acting.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRecord {
    pub kind: ActionKind,
    pub fields: Map<String, Value>,
}

impl ExtractedRecord {
    pub fn new(kind: ActionKind, fields: Map<String, Value>) -> Self {
        Self { kind, fields }
    }

    /// A field's value, treating JSON `null` as absent.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// A string field, trimmed. Empty strings count as absent.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.value(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

// ── Processing result ───────────────────────────────────────────────

/// One summary row per processed message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingResult {
    pub subject: String,
    pub intent: Intent,
    /// The action whose side effect succeeded, if any.
    pub action_taken: Option<ActionKind>,
    /// Extracted fields, or empty.
    pub details: Map<String, Value>,
}

impl ProcessingResult {
    pub fn action_label(&self) -> &'static str {
        self.action_taken.map(|a| a.label()).unwrap_or("None")
    }
}

// ── Action requests ─────────────────────────────────────────────────

/// A validated task ready to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    pub title: String,
    pub due: Option<DateTime<Utc>>,
}

/// Event start/end as given by the model: either wall-clock time in the
/// event's timezone, or a timestamp with an explicit offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    Local(NaiveDateTime),
    Offset(DateTime<FixedOffset>),
}

impl EventTime {
    /// Parse an ISO-8601 timestamp, with or without an offset.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self::Offset(dt));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(Self::Local)
    }

    /// `None` when the result falls outside chrono's representable range.
    pub fn plus(self, duration: Duration) -> Option<Self> {
        match self {
            Self::Local(dt) => dt.checked_add_signed(duration).map(Self::Local),
            Self::Offset(dt) => dt.checked_add_signed(duration).map(Self::Offset),
        }
    }

    /// Wire format for the calendar `dateTime` field.
    pub fn to_api_string(&self) -> String {
        match self {
            Self::Local(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            Self::Offset(dt) => dt.to_rfc3339(),
        }
    }
}

/// A validated calendar event ready to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRequest {
    pub title: String,
    pub start: EventTime,
    pub end: EventTime,
    pub time_zone: String,
    pub attendees: Vec<String>,
}

/// A validated expense row: `[purchase_date, vendor_name, total_amount]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRow {
    pub purchase_date: String,
    pub vendor_name: String,
    pub total_amount: Decimal,
}

impl ExpenseRow {
    /// Cell values in sheet column order. The amount is sent as a number.
    pub fn cells(&self) -> Vec<Value> {
        let amount = rust_decimal::prelude::ToPrimitive::to_f64(&self.total_amount)
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(self.total_amount.to_string()));
        vec![
            Value::String(self.purchase_date.clone()),
            Value::String(self.vendor_name.clone()),
            amount,
        ]
    }
}

/// Task returned by the task service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTask {
    pub id: Option<String>,
    pub title: String,
}

/// Event returned by the calendar service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEvent {
    pub id: Option<String>,
    pub summary: String,
}
