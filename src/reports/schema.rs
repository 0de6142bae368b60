use serde::{Deserialize, Serialize};

/// A pre-computed behavior-analysis report, produced by the offline imaging
/// pipeline and dropped on disk as JSON. Every field is optional-with-default
/// so partial documents from older pipeline versions still load; validation
/// happens once, when the file is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorReport {
    #[serde(default)]
    pub report_metadata: ReportMetadata,
    #[serde(default)]
    pub overall_summary: OverallSummary,
    #[serde(default)]
    pub detailed_sequence_analysis: Vec<SequenceAnalysis>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportMetadata {
    #[serde(default)]
    pub student_id: String,
    /// `%Y-%m-%d %H:%M:%S`, local pipeline time.
    #[serde(default)]
    pub report_generation_time: String,
    #[serde(default)]
    pub student_image_source_folder: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverallSummary {
    #[serde(default)]
    pub total_images_found: i64,
    #[serde(default)]
    pub total_batches: i64,
    #[serde(default)]
    pub total_images_analyzed: i64,
    #[serde(default)]
    pub ai_summary_notes: Option<AiSummaryNotes>,
    /// Sorted most-frequent first by the pipeline.
    #[serde(default)]
    pub behavior_statistics: Vec<BehaviorStat>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiSummaryNotes {
    #[serde(default)]
    pub greeting: Option<String>,
    #[serde(default)]
    pub positive_feedback: Option<String>,
    #[serde(default)]
    pub observation_points_summary: Option<String>,
    #[serde(default)]
    pub reflection_points: Option<String>,
    #[serde(default)]
    pub suggestions: Option<String>,
    #[serde(default)]
    pub encouragement: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorStat {
    #[serde(default)]
    pub behavior_category: String,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub average_confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequenceAnalysis {
    #[serde(default)]
    pub batch_index: i64,
    #[serde(default)]
    pub image_filenames_in_batch: Vec<String>,
    #[serde(default)]
    pub analysis: Option<SequenceBatchAnalysis>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequenceBatchAnalysis {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub sequence_analysis_confidence: f64,
    #[serde(default)]
    pub sequence_summary: Option<String>,
    #[serde(default)]
    pub dominant_sustained_behaviors: Vec<DominantBehavior>,
    #[serde(default)]
    pub per_image_highlights: Vec<ImageHighlight>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DominantBehavior {
    #[serde(default)]
    pub behavior_category: String,
    #[serde(default)]
    pub estimated_duration_ratio: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageHighlight {
    #[serde(default)]
    pub image_index_in_sequence: i64,
    #[serde(default)]
    pub behavior_category: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub head_pose_analysis: Option<HeadPoseAnalysis>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeadPoseAnalysis {
    #[serde(default)]
    pub angle_description: String,
    #[serde(default)]
    pub estimated_head_angle_degrees: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_loads_with_defaults() {
        let raw = r#"{
            "report_metadata": { "student_id": "a123" },
            "overall_summary": {
                "behavior_statistics": [
                    { "behavior_category": "書寫/做筆記", "percentage": 61.5 }
                ]
            }
        }"#;

        let report: BehaviorReport = serde_json::from_str(raw).unwrap();
        assert_eq!(report.report_metadata.student_id, "a123");
        assert_eq!(report.report_metadata.report_generation_time, "");
        assert_eq!(report.overall_summary.total_images_found, 0);
        assert!(report.overall_summary.ai_summary_notes.is_none());
        assert!(report.detailed_sequence_analysis.is_empty());

        let stat = &report.overall_summary.behavior_statistics[0];
        assert_eq!(stat.behavior_category, "書寫/做筆記");
        assert_eq!(stat.count, 0);
        assert!(stat.average_confidence.is_none());
    }

    #[test]
    fn empty_object_is_a_valid_report() {
        let report: BehaviorReport = serde_json::from_str("{}").unwrap();
        assert!(report.overall_summary.behavior_statistics.is_empty());
    }
}
