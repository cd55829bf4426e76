//! Pipeline configuration: input/output paths, column mappings, weight tables
//! and the trend-history generator settings.
//!
//! Stored as a JSON object on disk; every key is optional and falls back to
//! the defaults below:
//! ```json
//! {
//!   "comments_path": "data/merged.csv",
//!   "engagement_weights": { "like": 1.0, "favorite": 2.0, "comment": 3.0 },
//!   "history": { "seed": 7, "perturbation": { "additive": { "low": -0.05, "high": 0.05 } } }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PipelineError, Result};

/// Largest `precision` accepted; beyond this `10^precision` stops being exact.
pub const MAX_PRECISION: u32 = 12;

/// Number of synthetic points each video's trend line carries.
pub const HISTORY_POINTS: usize = 3;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub comments_path: PathBuf,
    /// Product classification side table (`cluster_label` per video).
    pub products_path: Option<PathBuf>,
    /// Video type classification side table (`video_type` per video).
    pub video_types_path: Option<PathBuf>,
    pub output_path: PathBuf,
    pub scores_path: PathBuf,
    pub summary_path: PathBuf,
    pub columns: ColumnConfig,
    pub engagement_weights: EngagementWeights,
    pub cqs_weights: CqsWeights,
    /// Display multiplier applied to the signed score.
    pub scale: f64,
    /// Decimal places kept for scores in the written outputs.
    pub precision: u32,
    pub history: HistoryConfig,
    /// Substituted for missing category labels and titles.
    pub placeholder_label: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            comments_path: PathBuf::from("data/merged.csv"),
            products_path: Some(PathBuf::from("data/product_type_classified.csv")),
            video_types_path: Some(PathBuf::from("data/video_type_classified.csv")),
            output_path: PathBuf::from("output.json"),
            scores_path: PathBuf::from("cqs.csv"),
            summary_path: PathBuf::from("output_partial.json"),
            columns: ColumnConfig::default(),
            engagement_weights: EngagementWeights::default(),
            cqs_weights: CqsWeights::default(),
            scale: 1.0,
            precision: 4,
            history: HistoryConfig::default(),
            placeholder_label: "Unknown".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PipelineError::missing_input(path));
        }
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(PipelineError::Config(format!(
                "scale must be a positive number, got {}",
                self.scale
            )));
        }
        if self.precision > MAX_PRECISION {
            return Err(PipelineError::Config(format!(
                "precision must be at most {MAX_PRECISION}, got {}",
                self.precision
            )));
        }
        self.engagement_weights.validate()?;
        self.cqs_weights.validate()?;
        self.history.validate()
    }
}

fn check_weight(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PipelineError::Config(format!(
            "{name} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

/// Per-source column name mappings onto the canonical schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub comments: CommentColumns,
    pub products: LabelColumns,
    pub video_types: LabelColumns,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            comments: CommentColumns::default(),
            products: LabelColumns {
                video_id: "videoId".to_string(),
                label: "cluster_label".to_string(),
            },
            video_types: LabelColumns {
                video_id: "videoId".to_string(),
                label: "video_type".to_string(),
            },
        }
    }
}

/// Header names for the comment table. Optional fields are skipped when the
/// mapped header is absent; required ones raise a schema mismatch.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommentColumns {
    pub video_id: String,
    pub comment_id: String,
    pub sentiment: String,
    pub relevance: String,
    pub view_count: String,
    pub like_count: String,
    pub favorite_count: String,
    pub title: Option<String>,
    pub published_at: Option<String>,
    pub category: Option<String>,
    pub content_type: Option<String>,
}

impl Default for CommentColumns {
    fn default() -> Self {
        Self {
            video_id: "video_id".to_string(),
            comment_id: "comment_id".to_string(),
            sentiment: "sentiment_score".to_string(),
            relevance: "relevance_score".to_string(),
            view_count: "view_count".to_string(),
            like_count: "like_count".to_string(),
            favorite_count: "favorite_count".to_string(),
            title: Some("title".to_string()),
            published_at: Some("published_at".to_string()),
            category: Some("cluster_label".to_string()),
            content_type: Some("video_type".to_string()),
        }
    }
}

/// Header names for a classification side table.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelColumns {
    pub video_id: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct EngagementWeights {
    pub like: f64,
    pub favorite: f64,
    pub comment: f64,
}

impl EngagementWeights {
    fn validate(&self) -> Result<()> {
        check_weight("engagement_weights.like", self.like)?;
        check_weight("engagement_weights.favorite", self.favorite)?;
        check_weight("engagement_weights.comment", self.comment)
    }
}

impl Default for EngagementWeights {
    fn default() -> Self {
        Self {
            like: 1.0,
            favorite: 2.0,
            comment: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CqsWeights {
    pub sentiment: f64,
    pub relevance: f64,
    pub engagement: f64,
}

impl CqsWeights {
    fn validate(&self) -> Result<()> {
        check_weight("cqs_weights.sentiment", self.sentiment)?;
        check_weight("cqs_weights.relevance", self.relevance)?;
        check_weight("cqs_weights.engagement", self.engagement)
    }
}

impl Default for CqsWeights {
    fn default() -> Self {
        Self {
            sentiment: 0.5,
            relevance: 0.3,
            engagement: 0.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Days before the publish timestamp, one synthetic point each.
    pub offsets_days: Vec<i64>,
    pub perturbation: Perturbation,
    /// `None` draws from OS entropy, so runs differ.
    pub seed: Option<u64>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            offsets_days: vec![21, 14, 7],
            perturbation: Perturbation::default(),
            seed: Some(42),
        }
    }
}

impl HistoryConfig {
    fn validate(&self) -> Result<()> {
        let mut offsets = self.offsets_days.clone();
        offsets.sort_unstable();
        offsets.dedup();
        if offsets.len() != HISTORY_POINTS || offsets.iter().any(|&d| d <= 0) {
            return Err(PipelineError::Config(format!(
                "history.offsets_days needs {HISTORY_POINTS} distinct positive days, got {:?}",
                self.offsets_days
            )));
        }
        self.perturbation.validate()
    }
}

/// How a synthetic history point is derived from the current score.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perturbation {
    /// `cqs + U(low, high)`
    Additive { low: f64, high: f64 },
    /// `cqs * U(low, high)`
    Multiplicative { low: f64, high: f64 },
}

impl Default for Perturbation {
    fn default() -> Self {
        Perturbation::Multiplicative {
            low: 0.9,
            high: 1.1,
        }
    }
}

impl Perturbation {
    fn validate(&self) -> Result<()> {
        let (low, high) = match *self {
            Perturbation::Additive { low, high } => (low, high),
            Perturbation::Multiplicative { low, high } => {
                if low < 0.0 {
                    return Err(PipelineError::Config(
                        "multiplicative perturbation must not go below zero".to_string(),
                    ));
                }
                (low, high)
            }
        };
        if !(low.is_finite() && high.is_finite()) || low > high {
            return Err(PipelineError::Config(format!(
                "invalid perturbation range [{low}, {high}]"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{ "scale": 10.0, "cqs_weights": { "sentiment": 0.6 } }"#,
        )
        .unwrap();

        assert_eq!(config.scale, 10.0);
        assert_eq!(config.cqs_weights.sentiment, 0.6);
        assert_eq!(config.cqs_weights.relevance, 0.3);
        assert_eq!(config.engagement_weights.favorite, 2.0);
        assert_eq!(config.history.seed, Some(42));
        assert_eq!(config.columns.comments.video_id, "video_id");
    }

    #[test]
    fn test_perturbation_from_json() {
        let config: HistoryConfig = serde_json::from_str(
            r#"{ "perturbation": { "additive": { "low": -1.5, "high": 1.5 } }, "seed": null }"#,
        )
        .unwrap();

        assert_eq!(
            config.perturbation,
            Perturbation::Additive {
                low: -1.5,
                high: 1.5
            }
        );
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut config = PipelineConfig::default();
        config.history.perturbation = Perturbation::Additive {
            low: 1.0,
            high: -1.0,
        };
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_scale() {
        let config = PipelineConfig {
            scale: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_offsets() {
        for offsets in [
            vec![21, 14],
            vec![21, 14, 7, 3],
            vec![21, 14, 0],
            vec![14, -7, 21],
            vec![7, 7, 14],
        ] {
            let mut config = PipelineConfig::default();
            config.history.offsets_days = offsets.clone();
            assert!(
                matches!(config.validate(), Err(PipelineError::Config(_))),
                "accepted offsets {offsets:?}"
            );
        }

        let mut config = PipelineConfig::default();
        config.history.offsets_days = vec![7, 21, 14];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_weights() {
        let mut config = PipelineConfig::default();
        config.engagement_weights.like = -1.0;
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));

        let mut config = PipelineConfig::default();
        config.cqs_weights.relevance = f64::NAN;
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_validate_caps_precision() {
        let mut config = PipelineConfig::default();
        config.precision = MAX_PRECISION;
        assert!(config.validate().is_ok());
        config.precision = 400;
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("cqs_dashboard_no_such_config.json");
        let _ = std::fs::remove_file(&path);
        let result = PipelineConfig::load(&path);
        assert!(matches!(result, Err(PipelineError::MissingInput { .. })));
    }
}
