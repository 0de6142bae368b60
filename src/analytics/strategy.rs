use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analytics::replay::{reconstruct, SESSION_TIMEOUT_SECS};
use crate::db::models::ActivityEvent;

/// A method for turning a user's event log into per-page second totals.
///
/// Two implementations coexist because the client instrumentation evolved:
/// the original replay of raw events, and the newer model where the client
/// measures its own view durations and the server just sums them. Callers
/// pick one; both feed the same formatting.
pub trait DurationStrategy {
    fn page_totals(&self, events: &[ActivityEvent]) -> HashMap<String, i64>;
}

/// Timestamp replay with server-side timeout bounding.
#[derive(Debug, Clone)]
pub struct EventReplay {
    pub timeout_secs: i64,
}

impl Default for EventReplay {
    fn default() -> Self {
        Self {
            timeout_secs: SESSION_TIMEOUT_SECS,
        }
    }
}

impl DurationStrategy for EventReplay {
    fn page_totals(&self, events: &[ActivityEvent]) -> HashMap<String, i64> {
        reconstruct(events, self.timeout_secs)
    }
}

/// Sum of client-reported durations on view-end events, grouped by page.
///
/// No timeout is applied server-side; the client is trusted to bound its own
/// measurement. Events without a usable duration are skipped.
#[derive(Debug, Clone, Default)]
pub struct ClientReported;

impl DurationStrategy for ClientReported {
    fn page_totals(&self, events: &[ActivityEvent]) -> HashMap<String, i64> {
        let mut totals = HashMap::new();

        for event in events {
            if !event.kind.is_view_end() {
                continue;
            }
            let Some(secs) = event.reported_secs else {
                continue;
            };
            *totals.entry(event.page_id.clone()).or_insert(0) += secs;
        }

        totals
    }
}

/// Config-level strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    EventReplay,
    ClientReported,
}

impl StrategyKind {
    pub fn build(&self, timeout_secs: i64) -> Box<dyn DurationStrategy + Send + Sync> {
        match self {
            StrategyKind::EventReplay => Box::new(EventReplay { timeout_secs }),
            StrategyKind::ClientReported => Box::new(ClientReported),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::EventKind;
    use chrono::{TimeZone, Utc};

    fn event(
        secs: i64,
        kind: EventKind,
        page_id: &str,
        reported_secs: Option<i64>,
    ) -> ActivityEvent {
        ActivityEvent {
            id: None,
            user_id: "s1".into(),
            kind,
            page_id: page_id.into(),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            reported_secs,
        }
    }

    #[test]
    fn client_reported_sums_per_page() {
        let events = vec![
            event(0, EventKind::ViewStart, "p1", None),
            event(30, EventKind::ViewEnd, "p1", Some(30)),
            event(40, EventKind::ViewStart, "p2", None),
            event(100, EventKind::ViewEndUnload, "p2", Some(60)),
            event(120, EventKind::ViewEnd, "p1", Some(15)),
        ];
        let totals = ClientReported.page_totals(&events);
        assert_eq!(totals.get("p1"), Some(&45));
        assert_eq!(totals.get("p2"), Some(&60));
    }

    #[test]
    fn client_reported_skips_missing_durations() {
        let events = vec![
            event(0, EventKind::ViewEnd, "p1", None),
            event(10, EventKind::Click, "p1", Some(99)),
        ];
        assert!(ClientReported.page_totals(&events).is_empty());
    }

    #[test]
    fn strategies_are_interchangeable_behind_the_trait() {
        let events = vec![
            event(0, EventKind::ViewStart, "p1", None),
            event(100, EventKind::ViewEnd, "p1", Some(100)),
        ];
        for kind in [StrategyKind::EventReplay, StrategyKind::ClientReported] {
            let strategy = kind.build(1800);
            assert_eq!(strategy.page_totals(&events).get("p1"), Some(&100));
        }
    }
}
