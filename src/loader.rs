//! CSV loading onto the canonical row schema.
//!
//! Each table has its own header mapping (see [`crate::config::ColumnConfig`]).
//! Required columns are checked against the header before any row is read.
//! Rows whose numeric cells fail to parse are dropped and counted rather than
//! failing the run; empty cells are kept as missing values.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::analyzers::types::{CommentRow, LabelRow};
use crate::config::{CommentColumns, LabelColumns};
use crate::error::{PipelineError, Result};

/// Rows read from one table plus the number dropped for malformed numbers.
#[derive(Debug)]
pub struct Loaded<T> {
    pub rows: Vec<T>,
    pub dropped: usize,
}

/// Dropped-row counts per input table for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub comments: usize,
    pub products: usize,
    pub video_types: usize,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.comments + self.products + self.video_types
    }
}

/// Header name → position for one opened table.
struct Header {
    table: String,
    index: HashMap<String, usize>,
}

impl Header {
    fn new(table: &str, headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self {
            table: table.to_string(),
            index,
        }
    }

    fn required(&self, field: &str, column: &str) -> Result<usize> {
        self.index
            .get(column)
            .copied()
            .ok_or_else(|| PipelineError::schema_mismatch(&self.table, field, column))
    }

    fn optional(&self, field: &str, column: Option<&str>) -> Option<usize> {
        let column = column?;
        let found = self.index.get(column).copied();
        if found.is_none() {
            debug!(table = %self.table, field, column, "Optional column not present");
        }
        found
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    if !path.is_file() {
        return Err(PipelineError::missing_input(path));
    }
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PipelineError::missing_input(path),
        _ => PipelineError::Io(e),
    })?;
    // Short rows leave their trailing fields missing instead of failing the read.
    Ok(csv::ReaderBuilder::new().flexible(true).from_reader(file))
}

fn cell(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn text(record: &StringRecord, index: Option<usize>) -> Option<String> {
    cell(record, index).map(str::to_string)
}

/// `Ok(None)` for an empty or NaN cell, `Err(())` when the cell holds
/// something that is not a number.
fn number(record: &StringRecord, index: Option<usize>) -> std::result::Result<Option<f64>, ()> {
    match cell(record, index) {
        None => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("nan") => Ok(None),
        Some(v) => v.parse::<f64>().map(Some).map_err(|_| ()),
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (taken as UTC) and bare dates.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

/// Loads the per-comment table.
#[tracing::instrument(skip(path, columns), fields(path = %path.display()))]
pub fn load_comments(path: &Path, columns: &CommentColumns) -> Result<Loaded<CommentRow>> {
    let mut rdr = open_reader(path)?;
    let header = Header::new("comments", rdr.headers()?);

    let video_id_col = header.required("video_id", &columns.video_id)?;
    let comment_id_col = header.required("comment_id", &columns.comment_id)?;
    let numeric_cols = [
        header.required("sentiment", &columns.sentiment)?,
        header.required("relevance", &columns.relevance)?,
        header.required("view_count", &columns.view_count)?,
        header.required("like_count", &columns.like_count)?,
        header.required("favorite_count", &columns.favorite_count)?,
    ];
    let title_col = header.optional("title", columns.title.as_deref());
    let published_col = header.optional("published_at", columns.published_at.as_deref());
    let category_col = header.optional("category", columns.category.as_deref());
    let content_type_col = header.optional("content_type", columns.content_type.as_deref());

    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for result in rdr.records() {
        let record = result?;

        let Some(video_id) = text(&record, Some(video_id_col)) else {
            dropped += 1;
            continue;
        };

        let mut values = [None; 5];
        let mut malformed = false;
        for (slot, col) in values.iter_mut().zip(numeric_cols) {
            match number(&record, Some(col)) {
                Ok(v) => *slot = v,
                Err(()) => malformed = true,
            }
        }
        if malformed {
            dropped += 1;
            continue;
        }
        let [sentiment, relevance, view_count, like_count, favorite_count] = values;

        rows.push(CommentRow {
            video_id,
            comment_id: text(&record, Some(comment_id_col)).unwrap_or_default(),
            sentiment,
            relevance,
            view_count,
            like_count,
            favorite_count,
            title: text(&record, title_col),
            published_at: cell(&record, published_col).and_then(parse_timestamp),
            category: text(&record, category_col),
            content_type: text(&record, content_type_col),
        });
    }

    if dropped > 0 {
        warn!(dropped, kept = rows.len(), "Dropped comment rows with malformed values");
    }
    info!(rows = rows.len(), "Comment table loaded");

    Ok(Loaded { rows, dropped })
}

/// Loads a classification side table (one label per video id).
#[tracing::instrument(skip(path, columns), fields(path = %path.display()))]
pub fn load_labels(path: &Path, table: &str, columns: &LabelColumns) -> Result<Loaded<LabelRow>> {
    let mut rdr = open_reader(path)?;
    let header = Header::new(table, rdr.headers()?);

    let video_id = header.required("video_id", &columns.video_id)?;
    let label = header.required("label", &columns.label)?;

    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for result in rdr.records() {
        let record = result?;
        match text(&record, Some(video_id)) {
            Some(id) => rows.push(LabelRow {
                video_id: id,
                label: text(&record, Some(label)),
            }),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(table, dropped, "Dropped label rows without a video id");
    }
    info!(table, rows = rows.len(), "Label table loaded");

    Ok(Loaded { rows, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_csv(name: &str, content: &str) -> PathBuf {
        let path = env::temp_dir().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    const HEADER: &str = "video_id,comment_id,sentiment_score,relevance_score,view_count,like_count,favorite_count,title,published_at,cluster_label,video_type\n";

    #[test]
    fn test_load_comments_maps_columns() {
        let path = temp_csv(
            "cqs_dashboard_loader_ok.csv",
            &format!(
                "{HEADER}V1,c1,0.8,0.5,1000,50,5,First look,2025-01-10T12:00:00Z,Phones,Review\n\
                 V1,c2,0.6,,1000,50,5,First look,2025-01-10T12:00:00Z,Phones,Review\n"
            ),
        );

        let loaded = load_comments(&path, &CommentColumns::default()).unwrap();

        assert_eq!(loaded.rows.len(), 2);
        assert_eq!(loaded.dropped, 0);
        let first = &loaded.rows[0];
        assert_eq!(first.video_id, "V1");
        assert_eq!(first.sentiment, Some(0.8));
        assert_eq!(first.view_count, Some(1000.0));
        assert_eq!(first.title.as_deref(), Some("First look"));
        assert_eq!(first.content_type.as_deref(), Some("Review"));
        assert!(first.published_at.is_some());
        assert_eq!(loaded.rows[1].relevance, None);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_malformed_numbers_drop_row() {
        let path = temp_csv(
            "cqs_dashboard_loader_bad.csv",
            &format!(
                "{HEADER}V1,c1,0.8,0.5,lots,50,5,t,,,\n\
                 V1,c2,0.6,0.5,1000,50,5,t,,,\n\
                 ,c3,0.6,0.5,1000,50,5,t,,,\n"
            ),
        );

        let loaded = load_comments(&path, &CommentColumns::default()).unwrap();

        assert_eq!(loaded.rows.len(), 1);
        assert_eq!(loaded.dropped, 2);
        assert_eq!(loaded.rows[0].comment_id, "c2");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_short_row_keeps_trailing_fields_missing() {
        let path = temp_csv(
            "cqs_dashboard_loader_short.csv",
            &format!(
                "{HEADER}V1,c1,0.8,0.5,1000,50,5,First look,2025-01-10T12:00:00Z,Phones,Review\n\
                 V1,c2,0.6,0.5,1000,50,5\n\
                 V2,c3,0.1\n"
            ),
        );

        let loaded = load_comments(&path, &CommentColumns::default()).unwrap();

        assert_eq!(loaded.rows.len(), 3);
        assert_eq!(loaded.dropped, 0);
        let short = &loaded.rows[1];
        assert_eq!(short.comment_id, "c2");
        assert_eq!(short.favorite_count, Some(5.0));
        assert_eq!(short.title, None);
        assert_eq!(short.published_at, None);
        assert_eq!(short.content_type, None);
        assert_eq!(loaded.rows[2].relevance, None);
        assert_eq!(loaded.rows[2].view_count, None);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_report_total() {
        let report = LoadReport {
            comments: 2,
            products: 1,
            video_types: 0,
        };
        assert_eq!(report.total(), 3);
        assert_eq!(LoadReport::default().total(), 0);
    }

    #[test]
    fn test_missing_file() {
        let path = env::temp_dir().join("cqs_dashboard_loader_absent.csv");
        let _ = fs::remove_file(&path);

        let err = load_comments(&path, &CommentColumns::default()).unwrap_err();

        assert!(matches!(err, PipelineError::MissingInput { .. }));
        assert!(err.to_string().contains("cqs_dashboard_loader_absent.csv"));
    }

    #[test]
    fn test_schema_mismatch_names_field() {
        let path = temp_csv(
            "cqs_dashboard_loader_schema.csv",
            "videoId,comment_id,sentiment_score,relevance_score,view_count,like_count,favorite_count\n",
        );

        let err = load_comments(&path, &CommentColumns::default()).unwrap_err();

        match err {
            PipelineError::SchemaMismatch { field, column, .. } => {
                assert_eq!(field, "video_id");
                assert_eq!(column, "video_id");
            }
            other => panic!("unexpected error: {other}"),
        }

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_custom_mapping() {
        let path = temp_csv(
            "cqs_dashboard_loader_mapping.csv",
            "videoId,commentId,sentiment,relevance,viewCount,likeCount_y,favoriteCount\n\
             abc,1,-0.3,0.9,10,1,0\n",
        );
        let columns = CommentColumns {
            video_id: "videoId".into(),
            comment_id: "commentId".into(),
            sentiment: "sentiment".into(),
            relevance: "relevance".into(),
            view_count: "viewCount".into(),
            like_count: "likeCount_y".into(),
            favorite_count: "favoriteCount".into(),
            ..Default::default()
        };

        let loaded = load_comments(&path, &columns).unwrap();

        assert_eq!(loaded.rows.len(), 1);
        assert_eq!(loaded.rows[0].like_count, Some(1.0));
        assert_eq!(loaded.rows[0].title, None);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_labels() {
        let path = temp_csv(
            "cqs_dashboard_loader_labels.csv",
            "videoId,cluster_label\nv1,Phones\nv2,\n,Audio\n",
        );
        let columns = LabelColumns {
            video_id: "videoId".into(),
            label: "cluster_label".into(),
        };

        let loaded = load_labels(&path, "products", &columns).unwrap();

        assert_eq!(loaded.rows.len(), 2);
        assert_eq!(loaded.dropped, 1);
        assert_eq!(loaded.rows[1].label, None);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2025-01-10T12:00:00Z").is_some());
        assert!(parse_timestamp("2025-01-10T12:00:00+02:00").is_some());
        assert!(parse_timestamp("2025-01-10 12:00:00").is_some());
        assert_eq!(
            parse_timestamp("2025-01-10").unwrap().to_rfc3339(),
            "2025-01-10T00:00:00+00:00"
        );
        assert!(parse_timestamp("last tuesday").is_none());
    }
}
