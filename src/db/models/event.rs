use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a logged interaction event.
///
/// The string forms are the wire/storage values emitted by the web client.
/// `ViewEndUnload` is the `sendBeacon` variant fired when the page unloads
/// before a regular view-end could be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "click")]
    Click,
    #[serde(rename = "tab_view_start")]
    ViewStart,
    #[serde(rename = "tab_view_end")]
    ViewEnd,
    #[serde(rename = "tab_view_end_unload")]
    ViewEndUnload,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::ViewStart => "tab_view_start",
            EventKind::ViewEnd => "tab_view_end",
            EventKind::ViewEndUnload => "tab_view_end_unload",
        }
    }

    /// Both regular and unload-flavored end events count as "view end"
    /// for client-reported duration summation.
    pub fn is_view_end(&self) -> bool {
        matches!(self, EventKind::ViewEnd | EventKind::ViewEndUnload)
    }
}

/// One row of the append-only activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub id: Option<i64>,
    pub user_id: String,
    pub kind: EventKind,
    /// Opaque identifier of the logical page/tab (or clicked element).
    pub page_id: String,
    pub timestamp: DateTime<Utc>,
    /// Client-measured seconds on the page, present on view-end events.
    pub reported_secs: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_wire_strings() {
        for kind in [
            EventKind::Click,
            EventKind::ViewStart,
            EventKind::ViewEnd,
            EventKind::ViewEndUnload,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            let back: EventKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn view_end_covers_unload_variant() {
        assert!(EventKind::ViewEnd.is_view_end());
        assert!(EventKind::ViewEndUnload.is_view_end());
        assert!(!EventKind::ViewStart.is_view_end());
        assert!(!EventKind::Click.is_view_end());
    }
}
