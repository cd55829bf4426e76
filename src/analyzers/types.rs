//! Data types used by the scoring pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single comment row, already mapped onto the canonical schema.
///
/// Numeric cells that were empty in the source are `None`; cells that failed
/// to parse never get this far (the loader drops the row).
#[derive(Debug, Clone, Default)]
pub struct CommentRow {
    pub video_id: String,
    pub comment_id: String,
    pub sentiment: Option<f64>,
    pub relevance: Option<f64>,
    pub view_count: Option<f64>,
    pub like_count: Option<f64>,
    pub favorite_count: Option<f64>,
    pub title: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub content_type: Option<String>,
}

/// One row of a classification side table.
#[derive(Debug, Clone)]
pub struct LabelRow {
    pub video_id: String,
    pub label: Option<String>,
}

/// Per-video aggregate straight out of the group-by, before missing values
/// are filled.
#[derive(Debug, Clone)]
pub struct RawAggregate {
    pub video_id: String,
    pub mean_sentiment: Option<f64>,
    pub mean_relevance: Option<f64>,
    pub comment_count: usize,
    pub view_count: Option<f64>,
    pub like_count: Option<f64>,
    pub favorite_count: Option<f64>,
    pub title: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub content_type: Option<String>,
}

/// Per-video aggregate with every field filled; the only input the scorer
/// accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoAggregate {
    pub video_id: String,
    pub mean_sentiment: f64,
    pub mean_relevance: f64,
    pub comment_count: usize,
    pub view_count: f64,
    pub like_count: f64,
    pub favorite_count: f64,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub category: String,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredVideo {
    pub video: VideoAggregate,
    pub engagement_score: f64,
    pub cqs: f64,
}

/// Row of the per-video score table written by the `score` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub video_id: String,
    pub cqs: f64,
    pub engagement_score: f64,
    pub avg_sentiment: f64,
    pub avg_relevance: f64,
    pub comment_count: usize,
    pub view_count: f64,
}

/// A fabricated history sample. Not measured data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub t: DateTime<Utc>,
    pub cqs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoCqs {
    pub id: String,
    pub title: String,
    pub cqs: f64,
    pub timestamp: DateTime<Utc>,
}

/// One bar/slice of a category chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusItem {
    pub title: String,
    pub metric: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextMonthFocus {
    pub top_quality_comment_video: FocusItem,
    pub most_discussed_product: FocusItem,
}

/// The document the dashboard front end reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub video_cqs_data: Vec<VideoCqs>,
    pub video_cqs_history: BTreeMap<String, Vec<TrendPoint>>,
    pub product_discussion_data: Vec<NamedCount>,
    pub video_type_data: Vec<NamedCount>,
    pub next_month_focus_data: NextMonthFocus,
}

/// Histogram-only document produced from the side tables alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub product_discussion_data: Vec<NamedCount>,
    pub video_type_data: Vec<NamedCount>,
    pub most_discussed_product: FocusItem,
}
