use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use crate::db::models::EventKind;

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_event_kind(value: &str) -> Result<EventKind> {
    match value {
        "click" => Ok(EventKind::Click),
        "tab_view_start" => Ok(EventKind::ViewStart),
        "tab_view_end" => Ok(EventKind::ViewEnd),
        "tab_view_end_unload" => Ok(EventKind::ViewEndUnload),
        other => Err(anyhow!("unknown event kind {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_strings_round_trip() {
        for kind in [
            EventKind::Click,
            EventKind::ViewStart,
            EventKind::ViewEnd,
            EventKind::ViewEndUnload,
        ] {
            assert_eq!(parse_event_kind(kind.as_str()).unwrap(), kind);
        }
        assert!(parse_event_kind("scroll").is_err());
    }
}
