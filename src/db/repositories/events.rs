use anyhow::{Context, Result};
use rusqlite::params;

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_event_kind},
    models::ActivityEvent,
};

impl Database {
    /// Append one event to the activity log.
    pub async fn insert_event(&self, event: &ActivityEvent) -> Result<()> {
        let record = event.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO activity_events (user_id, event_kind, page_id, timestamp, reported_secs)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.user_id,
                    record.kind.as_str(),
                    record.page_id,
                    record.timestamp.to_rfc3339(),
                    record.reported_secs,
                ],
            )
            .with_context(|| "failed to insert activity event")?;
            Ok(())
        })
        .await
    }

    /// Full event log for one user, ascending by timestamp.
    ///
    /// The reconstructor relies on this ordering; RFC3339 UTC strings sort
    /// lexicographically in chronological order.
    pub async fn events_for_user(&self, user_id: &str) -> Result<Vec<ActivityEvent>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, event_kind, page_id, timestamp, reported_secs
                 FROM activity_events
                 WHERE user_id = ?1
                 ORDER BY timestamp ASC, id ASC",
            )?;

            let mut rows = stmt.query(params![user_id])?;
            let mut events = Vec::new();
            while let Some(row) = rows.next()? {
                events.push(ActivityEvent {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    kind: parse_event_kind(&row.get::<_, String>(2)?)?,
                    page_id: row.get(3)?,
                    timestamp: parse_datetime(&row.get::<_, String>(4)?, "timestamp")?,
                    reported_secs: row.get(5)?,
                });
            }

            Ok(events)
        })
        .await
    }

    /// Number of generic click events logged for one user.
    pub async fn count_clicks(&self, user_id: &str) -> Result<i64> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM activity_events
                 WHERE user_id = ?1 AND event_kind = 'click'",
                params![user_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
    }

    /// Every user id seen in the event log. There is no user table here;
    /// authentication lives outside this service.
    pub async fn list_user_ids(&self) -> Result<Vec<String>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT user_id FROM activity_events ORDER BY user_id ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut user_ids = Vec::new();
            while let Some(row) = rows.next()? {
                user_ids.push(row.get(0)?);
            }

            Ok(user_ids)
        })
        .await
    }
}
