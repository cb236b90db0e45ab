use super::localize::{resolve_summary, Language};
use super::models::{NormalizedEvent, RawEventRecord};
use chrono::NaiveDate;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, error, warn};

/// Derive a deterministic identifier for an event with no upstream uid.
///
/// Hashing the summary together with the raw date strings means the same
/// logical event yields the same uid on every refresh, so consumers can
/// diff events across fetches.
fn derive_uid(summary: &str, start_raw: &str, end_raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(summary.as_bytes());
    hasher.update(start_raw.as_bytes());
    hasher.update(end_raw.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Normalize a single raw record. `None` means the record was skipped and
/// the reason already logged.
pub fn normalize_record(record: &RawEventRecord, preferred: Language) -> Option<NormalizedEvent> {
    let summary = resolve_summary(&record.summaries, preferred);

    let (Some(start_raw), Some(end_raw)) =
        (record.start_date.as_deref(), record.end_date.as_deref())
    else {
        warn!(
            "Skipping malformed event (missing start or end date): {:?}",
            record
        );
        return None;
    };

    if summary.is_empty() || start_raw.is_empty() || end_raw.is_empty() {
        warn!(
            "Skipping malformed event (empty summary, start, or end): {:?}",
            record
        );
        return None;
    }

    // Dates are date-only ISO 8601, no time component
    let start = match NaiveDate::parse_from_str(start_raw, "%Y-%m-%d") {
        Ok(date) => date,
        Err(e) => {
            error!("Date parsing failed for event {}: {}", summary, e);
            return None;
        }
    };
    let end = match NaiveDate::parse_from_str(end_raw, "%Y-%m-%d") {
        Ok(date) => date,
        Err(e) => {
            error!("Date parsing failed for event {}: {}", summary, e);
            return None;
        }
    };

    let uid = match record.uid.as_deref().filter(|uid| !uid.is_empty()) {
        Some(uid) => uid.to_string(),
        None => {
            let uid = derive_uid(&summary, start_raw, end_raw);
            debug!("Generated uid for event '{}': {}...", summary, &uid[..8]);
            uid
        }
    };

    Some(NormalizedEvent {
        uid,
        summary,
        start,
        end,
        description: record.description.clone(),
        location: record.location.clone(),
    })
}

/// Normalize a whole raw dataset. Each record is processed independently;
/// a malformed record never aborts the batch.
pub fn normalize_batch(raw_events: &[Value], preferred: Language) -> Vec<NormalizedEvent> {
    let mut events = Vec::with_capacity(raw_events.len());

    for raw in raw_events {
        let record: RawEventRecord = match serde_json::from_value(raw.clone()) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping undecodable event record: {}", e);
                continue;
            }
        };

        if let Some(event) = normalize_record(&record, preferred) {
            events.push(event);
        }
    }

    debug!(
        "Normalized {} of {} raw records",
        events.len(),
        raw_events.len()
    );
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawEventRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_round_trip_summer_break() {
        let raw = record(json!({
            "EN": "Summer Break",
            "start_date": "2025-07-01",
            "end_date": "2025-09-01"
        }));

        let event = normalize_record(&raw, Language::En).unwrap();
        assert_eq!(event.summary, "Summer Break");
        assert_eq!(event.start, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        assert_eq!(event.end, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
        assert_eq!(event.uid.len(), 64);
        assert!(event.uid.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(event.description, None);
        assert_eq!(event.location, None);
    }

    #[test]
    fn test_uid_is_deterministic() {
        let raw = record(json!({
            "EN": "Summer Break",
            "start_date": "2025-07-01",
            "end_date": "2025-09-01"
        }));

        let first = normalize_record(&raw, Language::En).unwrap();
        let second = normalize_record(&raw, Language::En).unwrap();
        assert_eq!(first.uid, second.uid);
    }

    #[test]
    fn test_upstream_uid_is_used_verbatim() {
        let raw = record(json!({
            "EN": "All Saints",
            "start_date": "2025-10-25",
            "end_date": "2025-11-02",
            "uid": "upstream-42"
        }));

        let event = normalize_record(&raw, Language::En).unwrap();
        assert_eq!(event.uid, "upstream-42");
    }

    #[test]
    fn test_description_and_location_pass_through() {
        let raw = record(json!({
            "EN": "Christmas Break",
            "start_date": "2025-12-20",
            "end_date": "2026-01-04",
            "description": "National school holiday",
            "location": "Luxembourg"
        }));

        let event = normalize_record(&raw, Language::En).unwrap();
        assert_eq!(event.description.as_deref(), Some("National school holiday"));
        assert_eq!(event.location.as_deref(), Some("Luxembourg"));
    }

    #[test]
    fn test_bad_date_is_skipped() {
        let raw = record(json!({
            "EN": "Broken",
            "start_date": "not-a-date",
            "end_date": "2025-09-01"
        }));

        assert!(normalize_record(&raw, Language::En).is_none());
    }

    #[test]
    fn test_missing_summary_yields_sentinel_not_skip() {
        // Exhausted fallback is not an error; the record survives with the
        // sentinel summary
        let raw = record(json!({
            "start_date": "2025-07-01",
            "end_date": "2025-09-01"
        }));

        let event = normalize_record(&raw, Language::En).unwrap();
        assert_eq!(event.summary, "Unknown Event");
    }

    #[test]
    fn test_malformed_record_does_not_abort_batch() {
        let raw_events = vec![
            json!({"EN": "First", "start_date": "2025-02-15", "end_date": "2025-02-23"}),
            json!({"EN": "Broken", "start_date": "2025-02-30x", "end_date": "2025-04-06"}),
            json!({"EN": "Third", "start_date": "2025-05-24", "end_date": "2025-06-01"}),
        ];

        let events = normalize_batch(&raw_events, Language::En);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].summary, "First");
        assert_eq!(events[1].summary, "Third");
    }

    #[test]
    fn test_non_object_element_is_skipped() {
        let raw_events = vec![
            json!("not an object"),
            json!({"EN": "Kept", "start_date": "2025-07-01", "end_date": "2025-09-01"}),
        ];

        let events = normalize_batch(&raw_events, Language::En);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Kept");
    }
}
