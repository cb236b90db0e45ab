use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// One unprocessed event object from the remote dataset
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawEventRecord {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub uid: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Remaining keys are language-code to summary pairs
    #[serde(flatten)]
    pub summaries: HashMap<String, Value>,
}

/// Validated, localized event ready for calendar queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub uid: String,
    pub summary: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub description: Option<String>,
    pub location: Option<String>,
}

/// State published by the coordinator after every refresh attempt
#[derive(Debug, Clone, Default)]
pub struct CoordinatorSnapshot {
    /// Raw dataset from the last successful fetch, replaced wholesale
    pub raw_events: Arc<Vec<Value>>,
    /// Whether the most recent refresh attempt succeeded
    pub last_update_success: bool,
}
