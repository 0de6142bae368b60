use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use log::warn;
use serde::Serialize;

use crate::reports::schema::BehaviorReport;

/// Behavior categories that count as off-task for the teacher digest.
const NON_TASK_BEHAVIORS: [&str; 6] = [
    "玩弄物品",
    "目視同學",
    "目視他處",
    "喝水/飲食",
    "整理個人物品",
    "趴睡",
];

/// Sort key used for reports whose metadata could not be read, so they sink
/// to the end of a newest-first listing.
const FALLBACK_SORT_KEY: &str = "00000000000000";

/// One row of a student's report listing.
#[derive(Debug, Clone, Serialize)]
pub struct ReportListing {
    pub filename: String,
    pub display_name: String,
    pub timestamp_sort_key: String,
}

/// Condensed view of one report for the teacher dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDigest {
    pub top_behavior: String,
    pub top_behavior_percent: f64,
    pub non_task_percent: f64,
    pub report_date: String,
}

impl Default for ReportDigest {
    fn default() -> Self {
        Self {
            top_behavior: "N/A".into(),
            top_behavior_percent: 0.0,
            non_task_percent: 0.0,
            report_date: "無報告".into(),
        }
    }
}

impl ReportDigest {
    pub fn from_report(report: &BehaviorReport) -> Self {
        let report_date = report
            .report_metadata
            .report_generation_time
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_string();

        let mut digest = Self {
            report_date,
            ..Self::default()
        };

        let stats = &report.overall_summary.behavior_statistics;
        if let Some(top) = stats.first() {
            digest.top_behavior = top.behavior_category.clone();
            digest.top_behavior_percent = top.percentage;

            let non_task_total: f64 = stats
                .iter()
                .filter(|s| NON_TASK_BEHAVIORS.contains(&s.behavior_category.as_str()))
                .map(|s| s.percentage)
                .sum();
            digest.non_task_percent = (non_task_total * 10.0).round() / 10.0;
        }

        digest
    }
}

/// Read-only store of pre-computed behavior reports, one directory per
/// student under a configured root. The report documents are produced by an
/// external pipeline; this store only lists, validates, and digests them.
#[derive(Debug, Clone)]
pub struct ReportStore {
    root: PathBuf,
}

impl ReportStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Reject names that could escape the report root.
    pub fn is_safe_name(name: &str) -> bool {
        !name.is_empty() && !name.contains("..") && !name.contains('/') && !name.contains('\\')
    }

    /// All of a student's reports, newest first. Display name and sort key
    /// come from `report_generation_time` inside each document; files that
    /// fail to load fall back to a filename-only entry rather than erroring
    /// the whole listing. A missing student directory is an empty listing.
    pub fn list_reports(&self, student_id: &str) -> Result<Vec<ReportListing>> {
        if !Self::is_safe_name(student_id) {
            bail!("invalid student id");
        }

        let dir = self.root.join(student_id);
        if !dir.is_dir() {
            warn!("No report folder for student {student_id}");
            return Ok(Vec::new());
        }

        let mut listings = Vec::new();
        for entry in fs::read_dir(&dir)
            .with_context(|| format!("failed to read report folder {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            listings.push(match read_report(&path) {
                Ok(report) => listing_from_metadata(filename, &report),
                Err(err) => {
                    warn!("Skipping metadata of report {filename}: {err:#}");
                    ReportListing {
                        filename: filename.to_string(),
                        display_name: filename.to_string(),
                        timestamp_sort_key: FALLBACK_SORT_KEY.to_string(),
                    }
                }
            });
        }

        listings.sort_by(|a, b| b.timestamp_sort_key.cmp(&a.timestamp_sort_key));
        Ok(listings)
    }

    pub fn report_exists(&self, student_id: &str, filename: &str) -> bool {
        Self::is_safe_name(student_id)
            && Self::is_safe_name(filename)
            && self.root.join(student_id).join(filename).is_file()
    }

    /// Load and validate one report document.
    pub fn load_report(&self, student_id: &str, filename: &str) -> Result<BehaviorReport> {
        if !Self::is_safe_name(student_id) || !Self::is_safe_name(filename) {
            bail!("invalid report file name");
        }
        read_report(&self.root.join(student_id).join(filename))
    }

    /// The student's newest report, if any.
    pub fn latest_report(&self, student_id: &str) -> Result<Option<BehaviorReport>> {
        let listings = self.list_reports(student_id)?;
        match listings.first() {
            Some(listing) => self.load_report(student_id, &listing.filename).map(Some),
            None => Ok(None),
        }
    }
}

fn read_report(path: &std::path::Path) -> Result<BehaviorReport> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read report {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("report {} is not valid JSON", path.display()))
}

fn listing_from_metadata(filename: &str, report: &BehaviorReport) -> ReportListing {
    let raw_time = &report.report_metadata.report_generation_time;
    match NaiveDateTime::parse_from_str(raw_time, "%Y-%m-%d %H:%M:%S") {
        Ok(generated_at) => ReportListing {
            filename: filename.to_string(),
            display_name: format!("報告 - {}", generated_at.format("%Y年%m月%d日 %H:%M")),
            timestamp_sort_key: generated_at.format("%Y%m%d%H%M%S").to_string(),
        },
        Err(_) => ReportListing {
            filename: filename.to_string(),
            display_name: filename.to_string(),
            timestamp_sort_key: FALLBACK_SORT_KEY.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn report_json(student_id: &str, generated_at: &str) -> String {
        format!(
            r#"{{
                "report_metadata": {{
                    "student_id": "{student_id}",
                    "report_generation_time": "{generated_at}"
                }},
                "overall_summary": {{
                    "behavior_statistics": [
                        {{ "behavior_category": "書寫/做筆記", "count": 40, "percentage": 55.0 }},
                        {{ "behavior_category": "目視他處", "count": 12, "percentage": 20.25 }},
                        {{ "behavior_category": "趴睡", "count": 5, "percentage": 10.0 }}
                    ]
                }}
            }}"#
        )
    }

    fn store_with_student(dir: &tempfile::TempDir, student_id: &str) -> ReportStore {
        fs::create_dir_all(dir.path().join(student_id)).unwrap();
        ReportStore::new(dir.path().to_path_buf())
    }

    #[test]
    fn listing_is_newest_first_with_display_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_student(&dir, "a123");
        fs::write(
            dir.path().join("a123/older.json"),
            report_json("a123", "2026-05-01 09:00:00"),
        )
        .unwrap();
        fs::write(
            dir.path().join("a123/newer.json"),
            report_json("a123", "2026-06-12 14:30:00"),
        )
        .unwrap();

        let listings = store.list_reports("a123").unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].filename, "newer.json");
        assert_eq!(listings[0].display_name, "報告 - 2026年06月12日 14:30");
        assert_eq!(listings[0].timestamp_sort_key, "20260612143000");
    }

    #[test]
    fn malformed_report_degrades_to_filename_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_student(&dir, "a123");
        fs::write(dir.path().join("a123/broken.json"), "{ not json").unwrap();
        fs::write(
            dir.path().join("a123/good.json"),
            report_json("a123", "2026-06-12 14:30:00"),
        )
        .unwrap();
        fs::write(dir.path().join("a123/notes.txt"), "ignored").unwrap();

        let listings = store.list_reports("a123").unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].filename, "good.json");
        assert_eq!(listings[1].filename, "broken.json");
        assert_eq!(listings[1].display_name, "broken.json");
        assert_eq!(listings[1].timestamp_sort_key, FALLBACK_SORT_KEY);
    }

    #[test]
    fn missing_student_folder_is_an_empty_listing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(dir.path().to_path_buf());
        assert!(store.list_reports("nobody").unwrap().is_empty());
    }

    #[test]
    fn traversal_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(dir.path().to_path_buf());
        assert!(store.list_reports("../etc").is_err());
        assert!(store.load_report("a123", "../../secrets.json").is_err());
        assert!(!store.report_exists("a123", "a/b.json"));
        assert!(!ReportStore::is_safe_name(""));
    }

    #[test]
    fn latest_report_follows_embedded_time() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_student(&dir, "a123");
        fs::write(
            dir.path().join("a123/r1.json"),
            report_json("a123", "2026-05-01 09:00:00"),
        )
        .unwrap();
        fs::write(
            dir.path().join("a123/r2.json"),
            report_json("a123", "2026-06-12 14:30:00"),
        )
        .unwrap();

        let latest = store.latest_report("a123").unwrap().unwrap();
        assert_eq!(
            latest.report_metadata.report_generation_time,
            "2026-06-12 14:30:00"
        );
        assert!(store.latest_report("ghost").unwrap().is_none());
    }

    #[test]
    fn digest_takes_top_behavior_and_sums_non_task() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_student(&dir, "a123");
        fs::write(
            dir.path().join("a123/r.json"),
            report_json("a123", "2026-06-12 14:30:00"),
        )
        .unwrap();

        let report = store.load_report("a123", "r.json").unwrap();
        let digest = ReportDigest::from_report(&report);
        assert_eq!(digest.report_date, "2026-06-12");
        assert_eq!(digest.top_behavior, "書寫/做筆記");
        assert_eq!(digest.top_behavior_percent, 55.0);
        // 目視他處 20.25 + 趴睡 10.0, rounded to one decimal.
        assert_eq!(digest.non_task_percent, 30.3);
    }

    #[test]
    fn digest_default_marks_absent_report() {
        let digest = ReportDigest::default();
        assert_eq!(digest.top_behavior, "N/A");
        assert_eq!(digest.report_date, "無報告");
        assert_eq!(digest.non_task_percent, 0.0);
    }
}
