use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use log::{error, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::AppConfig;
use crate::db::{
    models::{ActivityEvent, EventKind},
    Database,
};
use crate::reports::ReportStore;
use crate::summary;

/// Shared handler state.
pub struct AppState {
    pub db: Database,
    pub reports: ReportStore,
    pub config: AppConfig,
}

/// Event payload from the web client. The user id travels in the payload;
/// authentication is handled in front of this service.
#[derive(Debug, Deserialize)]
pub struct LogEventRequest {
    pub user_id: String,
    pub event_type: EventKind,
    pub element_or_page_id: String,
    /// Client-measured seconds. Lenient: numbers and numeric strings are
    /// truncated to whole seconds, anything else is treated as absent.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub duration_seconds: Option<i64>,
}

impl LogEventRequest {
    fn into_event(self) -> ActivityEvent {
        ActivityEvent {
            id: None,
            user_id: self.user_id,
            kind: self.event_type,
            page_id: self.element_or_page_id,
            timestamp: Utc::now(),
            reported_secs: self.duration_seconds,
        }
    }
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(coerce_seconds))
}

fn coerce_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_f64().map(|secs| secs as i64),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|secs| secs as i64),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct AckResponse {
    success: bool,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_body(message: impl Into<String>) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: message.into(),
    })
}

pub async fn log_event(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LogEventRequest>,
) -> Response {
    let event = request.into_event();
    let kind = event.kind;

    match state.db.insert_event(&event).await {
        Ok(()) => (
            StatusCode::OK,
            Json(AckResponse {
                success: true,
                message: format!("事件 {} 已記錄", kind.as_str()),
            }),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to log {} event: {err:#}", kind.as_str());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AckResponse {
                    success: false,
                    message: "記錄事件時發生內部錯誤。".into(),
                }),
            )
                .into_response()
        }
    }
}

/// `navigator.sendBeacon` variant: the body may arrive as text/plain and the
/// browser never reads the response, so this always answers 204, even for
/// payloads that cannot be used.
pub async fn log_event_beacon(State(state): State<Arc<AppState>>, body: String) -> StatusCode {
    if body.is_empty() {
        return StatusCode::NO_CONTENT;
    }

    let request = match serde_json::from_str::<LogEventRequest>(&body) {
        Ok(request) => request,
        Err(err) => {
            warn!("Discarding beacon payload: {err}");
            return StatusCode::NO_CONTENT;
        }
    };

    if let Err(err) = state.db.insert_event(&request.into_event()).await {
        warn!("Failed to log beacon event: {err:#}");
    }

    StatusCode::NO_CONTENT
}

pub async fn list_student_reports(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
) -> Response {
    if !ReportStore::is_safe_name(&student_id) {
        return (StatusCode::BAD_REQUEST, error_body("無效的學生識別碼。")).into_response();
    }

    match state.reports.list_reports(&student_id) {
        Ok(listings) => (StatusCode::OK, Json(listings)).into_response(),
        Err(err) => {
            error!("Failed to list reports for {student_id}: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("讀取報告列表時發生內部錯誤。"),
            )
                .into_response()
        }
    }
}

pub async fn get_student_report(
    State(state): State<Arc<AppState>>,
    Path((student_id, filename)): Path<(String, String)>,
) -> Response {
    if !ReportStore::is_safe_name(&student_id) || !ReportStore::is_safe_name(&filename) {
        return (StatusCode::BAD_REQUEST, error_body("無效的報告文件名。")).into_response();
    }

    if !state.reports.report_exists(&student_id, &filename) {
        return (
            StatusCode::NOT_FOUND,
            error_body(format!("指定的報告文件 {filename} 未找到。")),
        )
            .into_response();
    }

    match state.reports.load_report(&student_id, &filename) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => {
            error!("Failed to load report {filename} for {student_id}: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body(format!("報告文件 {filename} 格式錯誤。")),
            )
                .into_response()
        }
    }
}

pub async fn teacher_activity_summary(State(state): State<Arc<AppState>>) -> Response {
    match summary::class_activity_summary(&state.db, &state.reports, &state.config).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(err) => {
            error!("Failed to build class activity summary: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("產生班級摘要時發生內部錯誤。"),
            )
                .into_response()
        }
    }
}

pub async fn health_check() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_coercion_accepts_numbers_and_numeric_strings() {
        let parse = |raw: &str| -> Option<i64> {
            serde_json::from_str::<LogEventRequest>(raw)
                .unwrap()
                .duration_seconds
        };

        let base = |duration: &str| {
            format!(
                r#"{{
                    "user_id": "amy",
                    "event_type": "tab_view_end",
                    "element_or_page_id": "summaryNotesTab",
                    "duration_seconds": {duration}
                }}"#
            )
        };

        assert_eq!(parse(&base("42")), Some(42));
        assert_eq!(parse(&base("12.7")), Some(12));
        assert_eq!(parse(&base("\"12.7\"")), Some(12));
        assert_eq!(parse(&base("\"abc\"")), None);
        assert_eq!(parse(&base("null")), None);
        assert_eq!(parse(&base("[1]")), None);
    }

    #[test]
    fn duration_is_optional() {
        let raw = r#"{
            "user_id": "amy",
            "event_type": "click",
            "element_or_page_id": "loginButton"
        }"#;
        let request: LogEventRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.duration_seconds, None);
        assert_eq!(request.event_type, EventKind::Click);
    }

    #[test]
    fn unknown_event_type_is_rejected_at_the_boundary() {
        let raw = r#"{
            "user_id": "amy",
            "event_type": "scroll",
            "element_or_page_id": "p1"
        }"#;
        assert!(serde_json::from_str::<LogEventRequest>(raw).is_err());
    }
}
