use crate::analyzers::types::{CommentRow, RawAggregate, VideoAggregate};
use crate::analyzers::utility::mean;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Running state for one video while rows are folded in.
struct Group {
    sentiments: Vec<f64>,
    relevances: Vec<f64>,
    rows: usize,
    first: RawAggregate,
}

/// Groups comment rows by video id.
///
/// Sentiment and relevance are averaged over the rows where they are present,
/// `comment_count` is the number of rows, and every static field takes the
/// first present value in input order. Static fields are not checked for
/// consistency within a group; later values that disagree are ignored.
///
/// Output follows the order in which each video id was first seen, and every
/// aggregate has `comment_count >= 1`.
pub fn aggregate_comments(rows: &[CommentRow]) -> Vec<RawAggregate> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Group> = HashMap::new();

    for row in rows {
        let group = groups.entry(row.video_id.clone()).or_insert_with(|| {
            order.push(row.video_id.clone());
            Group {
                sentiments: Vec::new(),
                relevances: Vec::new(),
                rows: 0,
                first: RawAggregate {
                    video_id: row.video_id.clone(),
                    mean_sentiment: None,
                    mean_relevance: None,
                    comment_count: 0,
                    view_count: None,
                    like_count: None,
                    favorite_count: None,
                    title: None,
                    published_at: None,
                    category: None,
                    content_type: None,
                },
            }
        });

        group.rows += 1;
        if let Some(s) = row.sentiment {
            group.sentiments.push(s);
        }
        if let Some(r) = row.relevance {
            group.relevances.push(r);
        }

        macro_rules! first_of {
            ($field:ident) => {
                if group.first.$field.is_none() {
                    group.first.$field = row.$field.clone();
                }
            };
        }

        first_of!(view_count);
        first_of!(like_count);
        first_of!(favorite_count);
        first_of!(title);
        first_of!(published_at);
        first_of!(category);
        first_of!(content_type);
    }

    order
        .into_iter()
        .filter_map(|video_id| groups.remove(&video_id))
        .map(|group| {
            let mut agg = group.first;
            agg.comment_count = group.rows;
            agg.mean_sentiment = (!group.sentiments.is_empty()).then(|| mean(&group.sentiments));
            agg.mean_relevance = (!group.relevances.is_empty()).then(|| mean(&group.relevances));
            agg
        })
        .collect()
}

/// Fills every missing value in the aggregate table in one pass.
///
/// Missing numbers become 0, missing labels and titles become
/// `placeholder`, and a missing publish time becomes `reference_time`.
pub fn fill_missing(
    aggregates: Vec<RawAggregate>,
    placeholder: &str,
    reference_time: DateTime<Utc>,
) -> Vec<VideoAggregate> {
    fn num(value: Option<f64>) -> f64 {
        value.filter(|v| v.is_finite()).unwrap_or(0.0)
    }

    let label = |value: Option<String>| -> String {
        value
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| placeholder.to_string())
    };

    aggregates
        .into_iter()
        .map(|agg| VideoAggregate {
            video_id: agg.video_id,
            mean_sentiment: num(agg.mean_sentiment),
            mean_relevance: num(agg.mean_relevance),
            comment_count: agg.comment_count,
            view_count: num(agg.view_count),
            like_count: num(agg.like_count),
            favorite_count: num(agg.favorite_count),
            title: label(agg.title),
            published_at: agg.published_at.unwrap_or(reference_time),
            category: label(agg.category),
            content_type: label(agg.content_type),
        })
        .collect()
}
