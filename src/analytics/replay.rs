use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::db::models::{ActivityEvent, EventKind};

/// Idle gap after which an open page session is considered abandoned.
pub const SESSION_TIMEOUT_SECS: i64 = 1800;

/// Reconstruct bounded time-on-page totals from a user's raw event log.
///
/// `events` must already be sorted ascending by timestamp (the storage layer
/// queries with an explicit ORDER BY); out-of-order input is the caller's
/// responsibility. Pages that never see a view-start do not appear in the
/// result. Empty input yields an empty map.
pub fn reconstruct(events: &[ActivityEvent], timeout_secs: i64) -> HashMap<String, i64> {
    let mut totals = HashMap::new();

    for event in events {
        if event.kind == EventKind::ViewStart && !totals.contains_key(&event.page_id) {
            let seconds = time_on_page(events, &event.page_id, timeout_secs);
            totals.insert(event.page_id.clone(), seconds);
        }
    }

    totals
}

/// Single-page scan: replay the full log and total the segments spent on
/// `page_id`, each capped at `timeout_secs`.
///
/// Any event refreshes `last_seen` while a segment is open, regardless of its
/// kind or page — any logged activity means the user is still at the
/// keyboard. Only a view-start for this page opens (or reopens) a segment.
fn time_on_page(events: &[ActivityEvent], page_id: &str, timeout_secs: i64) -> i64 {
    let mut total: i64 = 0;
    let mut segment_start: Option<DateTime<Utc>> = None;
    let mut last_seen: Option<DateTime<Utc>> = None;

    for event in events {
        if let (Some(start), Some(seen)) = (segment_start, last_seen) {
            let idle = (event.timestamp - seen).num_seconds();
            if idle >= timeout_secs {
                // Close at the last activity time: the idle gap itself is
                // never attributed to page time.
                total += (seen - start).num_seconds().min(timeout_secs);
                segment_start = None;
            }
        }

        if event.kind == EventKind::ViewStart && event.page_id == page_id {
            if let Some(start) = segment_start {
                // Re-entry without a timeout (e.g. a refresh): close the
                // previous segment at this event's timestamp.
                total += (event.timestamp - start).num_seconds().min(timeout_secs);
            }
            segment_start = Some(event.timestamp);
        }

        if segment_start.is_some() {
            last_seen = Some(event.timestamp);
        }
    }

    // Flush a trailing open segment at the last observed activity, not "now".
    if let (Some(start), Some(seen)) = (segment_start, last_seen) {
        total += (seen - start).num_seconds().min(timeout_secs);
    }

    total
}
