use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analytics::{StrategyKind, SESSION_TIMEOUT_SECS};

/// Service configuration, loaded from a JSON file and passed explicitly into
/// each collaborator. A missing file means defaults; unknown or partial
/// documents fall back field by field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub report_root: PathBuf,
    pub host: String,
    pub port: u16,
    /// Idle gap (seconds) before an open page session is closed.
    pub session_timeout_secs: i64,
    /// Strategy the teacher summary uses for time-on-tab totals.
    pub summary_strategy: StrategyKind,
    /// Tab id → display label for the teacher dashboard.
    pub tab_labels: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut tab_labels = HashMap::new();
        tab_labels.insert("summaryNotesTab".into(), "AI觀察與建議".into());
        tab_labels.insert("overallStatsTab".into(), "整體行為統計".into());
        tab_labels.insert("timelineTab".into(), "行為趨勢圖".into());

        Self {
            db_path: PathBuf::from("classpulse.sqlite3"),
            report_root: PathBuf::from("json_behavior"),
            host: "127.0.0.1".into(),
            port: 8080,
            session_timeout_secs: SESSION_TIMEOUT_SECS,
            summary_strategy: StrategyKind::ClientReported,
            tab_labels,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Ok(serde_json::from_str(&contents).unwrap_or_default())
    }

    /// Display label for a tab id, falling back to the raw id.
    pub fn tab_label(&self, page_id: &str) -> String {
        self.tab_labels
            .get(page_id)
            .cloned()
            .unwrap_or_else(|| page_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_timeout_secs, SESSION_TIMEOUT_SECS);
        assert_eq!(config.summary_strategy, StrategyKind::ClientReported);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "port": 9000, "summary_strategy": "event_replay" }"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.summary_strategy, StrategyKind::EventReplay);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.tab_label("summaryNotesTab"), "AI觀察與建議");
    }

    #[test]
    fn unknown_tab_ids_fall_back_to_raw_id() {
        let config = AppConfig::default();
        assert_eq!(config.tab_label("mysteryTab"), "mysteryTab");
    }
}
