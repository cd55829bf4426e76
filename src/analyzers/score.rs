//! Engagement score and Comment Quality Score (CQS).
//!
//! ```text
//! engagement = (w_like*likes + w_favorite*favorites + w_comment*comments) / views
//! qms        = w_sentiment*|sentiment| + w_relevance*|relevance| + w_engagement*engagement
//! cqs        = sign(sentiment) * qms * scale      (sign is + for sentiment >= 0)
//! ```

use crate::analyzers::types::{ScoreRecord, ScoredVideo, VideoAggregate};
use crate::analyzers::utility::round_to;
use crate::config::{CqsWeights, EngagementWeights};

/// Weighted, view-normalised engagement rate. 0.0 when there are no views.
/// Unbounded above: a low-view video with many likes can exceed 1.
pub fn engagement_score(video: &VideoAggregate, weights: &EngagementWeights) -> f64 {
    if video.view_count <= 0.0 {
        return 0.0;
    }

    let weighted_sum = weights.like * video.like_count
        + weights.favorite * video.favorite_count
        + weights.comment * video.comment_count as f64;

    weighted_sum / video.view_count
}

/// Quality Magnitude Score: the unsigned part of the CQS.
pub fn quality_magnitude(
    mean_sentiment: f64,
    mean_relevance: f64,
    engagement: f64,
    weights: &CqsWeights,
) -> f64 {
    weights.sentiment * mean_sentiment.abs()
        + weights.relevance * mean_relevance.abs()
        + weights.engagement * engagement
}

/// Applies the sentiment polarity and display scale to a QMS.
pub fn signed_cqs(mean_sentiment: f64, qms: f64, scale: f64) -> f64 {
    let signed = if mean_sentiment < 0.0 { -qms } else { qms };
    signed * scale
}

/// Largest |cqs| the weights allow, for sentiment and relevance within [-1, 1].
pub fn cqs_bound(weights: &CqsWeights, max_engagement: f64, scale: f64) -> f64 {
    (weights.sentiment + weights.relevance + weights.engagement * max_engagement) * scale
}

#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    pub engagement_weights: EngagementWeights,
    pub cqs_weights: CqsWeights,
    pub scale: f64,
}

impl Scorer {
    pub fn new(engagement_weights: EngagementWeights, cqs_weights: CqsWeights, scale: f64) -> Self {
        Self {
            engagement_weights,
            cqs_weights,
            scale,
        }
    }

    pub fn score(&self, video: VideoAggregate) -> ScoredVideo {
        let engagement = engagement_score(&video, &self.engagement_weights);
        let qms = quality_magnitude(
            video.mean_sentiment,
            video.mean_relevance,
            engagement,
            &self.cqs_weights,
        );
        let cqs = signed_cqs(video.mean_sentiment, qms, self.scale);

        ScoredVideo {
            video,
            engagement_score: engagement,
            cqs,
        }
    }

    pub fn score_all(&self, videos: Vec<VideoAggregate>) -> Vec<ScoredVideo> {
        videos.into_iter().map(|v| self.score(v)).collect()
    }
}

impl ScoreRecord {
    /// Flattens a scored video into a table row rounded to `precision` places.
    pub fn from_scored(scored: &ScoredVideo, precision: u32) -> Self {
        ScoreRecord {
            video_id: scored.video.video_id.clone(),
            cqs: round_to(scored.cqs, precision),
            engagement_score: round_to(scored.engagement_score, precision),
            avg_sentiment: round_to(scored.video.mean_sentiment, precision),
            avg_relevance: round_to(scored.video.mean_relevance, precision),
            comment_count: scored.video.comment_count,
            view_count: scored.video.view_count,
        }
    }
}
