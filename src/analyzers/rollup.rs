//! Category rollups for the dashboard charts and the "next focus" cards.

use crate::analyzers::types::{FocusItem, LabelRow, NamedCount};
use std::collections::HashMap;

/// Counts occurrences per label, most frequent first.
///
/// Ties keep the order in which labels were first seen (the sort is stable).
pub fn category_histogram<'a, I>(labels: I) -> Vec<NamedCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<NamedCount> = Vec::new();

    for label in labels {
        match index.get(label) {
            Some(&i) => counts[i].value += 1,
            None => {
                index.insert(label, counts.len());
                counts.push(NamedCount {
                    name: label.to_string(),
                    value: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.value.cmp(&a.value));
    counts
}

/// Resolves each video's label from a side table, keeping the first row seen
/// for a video id.
pub fn label_lookup(rows: &[LabelRow]) -> HashMap<&str, &str> {
    let mut lookup = HashMap::new();
    for row in rows {
        if let Some(label) = row.label.as_deref().filter(|l| !l.trim().is_empty()) {
            lookup.entry(row.video_id.as_str()).or_insert(label);
        }
    }
    lookup
}

/// The label with the highest mean score over `(label, score)` pairs, and
/// that mean.
///
/// Groups are visited in first-seen order and the first group reaching the
/// maximum wins a tie. Returns `None` for an empty input.
pub fn top_category_by_mean<'a, I>(pairs: I) -> Option<(String, f64)>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, f64, usize)> = Vec::new();

    for (name, score) in pairs {
        match index.get(name) {
            Some(&i) => {
                groups[i].1 += score;
                groups[i].2 += 1;
            }
            None => {
                index.insert(name, groups.len());
                groups.push((name, score, 1));
            }
        }
    }

    let mut best: Option<(&str, f64)> = None;
    for (name, total, count) in groups {
        let avg = total / count as f64;
        match best {
            Some((_, best_avg)) if avg <= best_avg => {}
            _ => best = Some((name, avg)),
        }
    }

    best.map(|(name, avg)| (name.to_string(), avg))
}

pub fn top_quality_focus(top: Option<(String, f64)>, placeholder: &str) -> FocusItem {
    match top {
        Some((title, avg)) => FocusItem {
            title,
            metric: format!("Avg. CQS {avg:.1}"),
        },
        None => FocusItem {
            title: placeholder.to_string(),
            metric: "Avg. CQS 0.0".to_string(),
        },
    }
}

/// The most frequent entry of an already-sorted histogram.
pub fn most_discussed_focus(histogram: &[NamedCount], placeholder: &str) -> FocusItem {
    match histogram.first() {
        Some(top) => FocusItem {
            title: top.name.clone(),
            metric: format!("{} Mentions", top.value),
        },
        None => FocusItem {
            title: placeholder.to_string(),
            metric: "0 Mentions".to_string(),
        },
    }
}
