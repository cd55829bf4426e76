//! Output formatting and persistence for scored videos and reports.
//!
//! Supports log pretty-printing, JSON report files and the score table CSV.
//! Files are written to a sibling temporary path and renamed into place, so a
//! failed write never leaves a truncated output behind.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::ScoreRecord;
use crate::error::Result;

/// Logs the score table, one line per video.
pub fn print_pretty(records: &[ScoreRecord]) {
    info!("--- Calculated Video Quality Scores ---");
    for r in records {
        info!(
            video_id = %r.video_id,
            cqs = r.cqs,
            engagement_score = r.engagement_score,
            avg_sentiment = r.avg_sentiment,
            avg_relevance = r.avg_relevance,
            comment_count = r.comment_count,
            view_count = r.view_count,
            "Video score"
        );
    }
}

/// Logs any serializable value as pretty-printed JSON at debug level.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    if tracing::enabled!(tracing::Level::DEBUG) {
        debug!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    write(&mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Writes through `write` into a temporary file, then renames it over `path`.
fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let tmp = temp_sibling(path);
    if let Err(e) = write_file(&tmp, write) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "Output written");
    Ok(())
}

/// Serializes `value` as indented JSON to `path`.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    write_atomic(path, |w| {
        serde_json::to_writer_pretty(&mut *w, value)?;
        w.write_all(b"\n")?;
        Ok(())
    })
}

/// Writes the per-video score table as CSV with a header row.
pub fn write_scores_csv(path: &Path, records: &[ScoreRecord]) -> Result<()> {
    write_atomic(path, |w| {
        let mut writer = WriterBuilder::new().has_headers(true).from_writer(w);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn record(id: &str, cqs: f64) -> ScoreRecord {
        ScoreRecord {
            video_id: id.to_string(),
            cqs,
            engagement_score: 0.069,
            avg_sentiment: 0.4,
            avg_relevance: 0.5,
            comment_count: 3,
            view_count: 1000.0,
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&[record("V1", 0.3638)]);
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&record("V1", 0.3638)).unwrap();
    }

    #[test]
    fn test_write_scores_csv_header_and_rows() {
        let path = temp_path("cqs_dashboard_test_scores.csv");
        let _ = fs::remove_file(&path);

        write_scores_csv(&path, &[record("V1", 0.3638), record("V2", -0.12)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "video_id,cqs,engagement_score,avg_sentiment,avg_relevance,comment_count,view_count"
        );
        assert!(lines[1].starts_with("V1,0.3638,"));
        assert!(!temp_sibling(&path).exists());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_json_replaces_existing() {
        let path = temp_path("cqs_dashboard_test_replace.json");
        fs::write(&path, "stale").unwrap();

        write_json(&path, &record("V9", 1.5)).unwrap();

        let parsed: ScoreRecord =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.video_id, "V9");
        assert_eq!(parsed.cqs, 1.5);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_temp_sibling_name() {
        let tmp = temp_sibling(Path::new("out/output.json"));
        assert_eq!(tmp, PathBuf::from("out/output.json.tmp"));
    }
}
