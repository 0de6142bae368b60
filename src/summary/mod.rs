use std::collections::HashMap;

use anyhow::Result;
use log::warn;
use serde::Serialize;

use crate::analytics::{format_duration, DurationStrategy};
use crate::config::AppConfig;
use crate::db::Database;
use crate::reports::{ReportDigest, ReportStore};

/// One row of the teacher dashboard: web-interaction totals plus the digest
/// of the student's latest behavior report.
#[derive(Debug, Clone, Serialize)]
pub struct StudentActivitySummary {
    pub student_id: String,
    pub total_general_clicks: i64,
    /// Tab display label → formatted bounded duration.
    pub time_spent_on_tabs_details: HashMap<String, String>,
    pub report_summary: ReportDigest,
}

/// Build the combined summary for every student seen in the event log.
pub async fn class_activity_summary(
    db: &Database,
    reports: &ReportStore,
    config: &AppConfig,
) -> Result<Vec<StudentActivitySummary>> {
    let strategy = config.summary_strategy.build(config.session_timeout_secs);

    let mut rows = Vec::new();
    for student_id in db.list_user_ids().await? {
        rows.push(student_summary(db, reports, config, strategy.as_ref(), &student_id).await?);
    }

    Ok(rows)
}

async fn student_summary(
    db: &Database,
    reports: &ReportStore,
    config: &AppConfig,
    strategy: &(dyn DurationStrategy + Send + Sync),
    student_id: &str,
) -> Result<StudentActivitySummary> {
    let total_general_clicks = db.count_clicks(student_id).await?;

    let events = db.events_for_user(student_id).await?;
    let time_spent_on_tabs_details = strategy
        .page_totals(&events)
        .into_iter()
        .map(|(page_id, secs)| (config.tab_label(&page_id), format_duration(secs as f64)))
        .collect();

    // A broken or unreadable report never takes the whole summary down.
    let report_summary = match reports.latest_report(student_id) {
        Ok(Some(report)) => ReportDigest::from_report(&report),
        Ok(None) => ReportDigest::default(),
        Err(err) => {
            warn!("Failed to read latest report for {student_id}: {err:#}");
            ReportDigest::default()
        }
    };

    Ok(StudentActivitySummary {
        student_id: student_id.to_string(),
        total_general_clicks,
        time_spent_on_tabs_details,
        report_summary,
    })
}
