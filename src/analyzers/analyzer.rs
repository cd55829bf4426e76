use crate::analyzers::aggregate::{aggregate_comments, fill_missing};
use crate::analyzers::history::TrendGenerator;
use crate::analyzers::rollup::{
    category_histogram, label_lookup, most_discussed_focus, top_category_by_mean, top_quality_focus,
};
use crate::analyzers::score::Scorer;
use crate::analyzers::types::{
    DashboardReport, LabelRow, NextMonthFocus, ScoreRecord, ScoredVideo, SummaryReport, VideoCqs,
};
use crate::analyzers::utility::round_to;
use crate::config::{LabelColumns, PipelineConfig};
use crate::error::Result;
use crate::loader::{LoadReport, Loaded, load_comments, load_labels};
use crate::output::{print_json, print_pretty, write_json, write_scores_csv};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Scored videos plus the number of comment rows the loader dropped.
#[derive(Debug)]
pub struct ScoreRun {
    pub videos: Vec<ScoredVideo>,
    pub dropped_rows: usize,
}

/// A written output plus the rows each input table lost on load.
#[derive(Debug)]
pub struct PipelineRun<T> {
    pub output: T,
    pub dropped: LoadReport,
}

/// Loads, aggregates, fills and scores the comment table.
///
/// `as_of` stands in for publish times missing from the input.
#[tracing::instrument(skip_all, fields(path = %config.comments_path.display()))]
pub fn score_comments(config: &PipelineConfig, as_of: DateTime<Utc>) -> Result<ScoreRun> {
    let loaded = load_comments(&config.comments_path, &config.columns.comments)?;
    let aggregates = aggregate_comments(&loaded.rows);
    let filled = fill_missing(aggregates, &config.placeholder_label, as_of);

    let scorer = Scorer::new(config.engagement_weights, config.cqs_weights, config.scale);
    let videos = scorer.score_all(filled);

    info!(
        videos = videos.len(),
        dropped_rows = loaded.dropped,
        "Videos scored"
    );

    Ok(ScoreRun {
        videos,
        dropped_rows: loaded.dropped,
    })
}

fn load_side_table(
    path: Option<&Path>,
    table: &str,
    columns: &LabelColumns,
) -> Result<Loaded<LabelRow>> {
    match path {
        Some(path) => load_labels(path, table, columns),
        None => Ok(Loaded {
            rows: Vec::new(),
            dropped: 0,
        }),
    }
}

fn log_dropped(dropped: &LoadReport) {
    if dropped.total() > 0 {
        warn!(
            comments = dropped.comments,
            products = dropped.products,
            video_types = dropped.video_types,
            "Rows dropped while loading inputs"
        );
    }
}

/// Assembles the dashboard document from scored videos and side tables.
///
/// A video's product and type labels come from the side tables when they list
/// it, and from its own comment rows otherwise. Histograms count videos, so
/// each sums to `videos.len()`.
pub fn build_report<R: Rng>(
    videos: &[ScoredVideo],
    products: &[LabelRow],
    video_types: &[LabelRow],
    config: &PipelineConfig,
    trends: &mut TrendGenerator<R>,
) -> DashboardReport {
    let product_of = label_lookup(products);
    let type_of = label_lookup(video_types);
    let precision = config.precision;

    let product_labels: Vec<&str> = videos
        .iter()
        .map(|v| {
            product_of
                .get(v.video.video_id.as_str())
                .copied()
                .unwrap_or(v.video.category.as_str())
        })
        .collect();
    let type_labels: Vec<&str> = videos
        .iter()
        .map(|v| {
            type_of
                .get(v.video.video_id.as_str())
                .copied()
                .unwrap_or(v.video.content_type.as_str())
        })
        .collect();

    let product_discussion_data = category_histogram(product_labels.iter().copied());
    let video_type_data = category_histogram(type_labels.iter().copied());

    let top = top_category_by_mean(
        type_labels
            .iter()
            .copied()
            .zip(videos.iter().map(|v| v.cqs)),
    );

    let video_cqs_data = videos
        .iter()
        .map(|v| VideoCqs {
            id: v.video.video_id.clone(),
            title: v.video.title.clone(),
            cqs: round_to(v.cqs, precision),
            timestamp: v.video.published_at,
        })
        .collect();

    let mut video_cqs_history = BTreeMap::new();
    for v in videos {
        let mut points = trends.history_for(v.video.published_at, v.cqs);
        for p in &mut points {
            p.cqs = round_to(p.cqs, precision);
        }
        video_cqs_history.insert(v.video.video_id.clone(), points);
    }

    let next_month_focus_data = NextMonthFocus {
        top_quality_comment_video: top_quality_focus(top, &config.placeholder_label),
        most_discussed_product: most_discussed_focus(
            &product_discussion_data,
            &config.placeholder_label,
        ),
    };

    DashboardReport {
        video_cqs_data,
        video_cqs_history,
        product_discussion_data,
        video_type_data,
        next_month_focus_data,
    }
}

/// Runs the full pipeline and writes the dashboard JSON to
/// `config.output_path`. Nothing is written if any input is missing.
#[tracing::instrument(skip_all, fields(output = %config.output_path.display()))]
pub fn run_dashboard(
    config: &PipelineConfig,
    as_of: DateTime<Utc>,
) -> Result<PipelineRun<DashboardReport>> {
    let products = load_side_table(
        config.products_path.as_deref(),
        "products",
        &config.columns.products,
    )?;
    let video_types = load_side_table(
        config.video_types_path.as_deref(),
        "video_types",
        &config.columns.video_types,
    )?;
    let run = score_comments(config, as_of)?;
    let dropped = LoadReport {
        comments: run.dropped_rows,
        products: products.dropped,
        video_types: video_types.dropped,
    };
    log_dropped(&dropped);

    if config.history.seed.is_none() {
        info!("Trend history is unseeded; output will differ between runs");
    }
    warn!("videoCqsHistory is synthetic placeholder data, not measured history");

    let mut trends = TrendGenerator::from_config(&config.history);
    let report = build_report(
        &run.videos,
        &products.rows,
        &video_types.rows,
        config,
        &mut trends,
    );

    print_json(&report)?;
    write_json(&config.output_path, &report)?;
    info!(
        videos = report.video_cqs_data.len(),
        path = %config.output_path.display(),
        "Dashboard report written"
    );

    Ok(PipelineRun {
        output: report,
        dropped,
    })
}

/// Scores the comment table and writes the per-video score CSV to
/// `config.scores_path`.
#[tracing::instrument(skip_all, fields(output = %config.scores_path.display()))]
pub fn run_scores(config: &PipelineConfig, as_of: DateTime<Utc>) -> Result<Vec<ScoreRecord>> {
    let run = score_comments(config, as_of)?;
    let records: Vec<ScoreRecord> = run
        .videos
        .iter()
        .map(|v| ScoreRecord::from_scored(v, config.precision))
        .collect();

    print_pretty(&records);
    write_scores_csv(&config.scores_path, &records)?;
    info!(rows = records.len(), "Score table written");

    Ok(records)
}

/// Histograms over the raw side-table rows, without any scoring.
///
/// Carries no top-quality card: ranking by CQS needs the comment table, which
/// this summary never reads.
pub fn build_summary(
    products: &[LabelRow],
    video_types: &[LabelRow],
    placeholder: &str,
) -> SummaryReport {
    let label = |row: &LabelRow| -> String {
        row.label.clone().unwrap_or_else(|| placeholder.to_string())
    };
    let product_labels: Vec<String> = products.iter().map(&label).collect();
    let type_labels: Vec<String> = video_types.iter().map(&label).collect();

    let product_discussion_data = category_histogram(product_labels.iter().map(String::as_str));
    let video_type_data = category_histogram(type_labels.iter().map(String::as_str));
    let most_discussed_product = most_discussed_focus(&product_discussion_data, placeholder);

    SummaryReport {
        product_discussion_data,
        video_type_data,
        most_discussed_product,
    }
}

/// Builds the side-table summary and writes it to `config.summary_path`.
#[tracing::instrument(skip_all, fields(output = %config.summary_path.display()))]
pub fn run_summary(config: &PipelineConfig) -> Result<PipelineRun<SummaryReport>> {
    let products = load_side_table(
        config.products_path.as_deref(),
        "products",
        &config.columns.products,
    )?;
    let video_types = load_side_table(
        config.video_types_path.as_deref(),
        "video_types",
        &config.columns.video_types,
    )?;

    let dropped = LoadReport {
        comments: 0,
        products: products.dropped,
        video_types: video_types.dropped,
    };
    log_dropped(&dropped);

    let summary = build_summary(
        &products.rows,
        &video_types.rows,
        &config.placeholder_label,
    );
    print_json(&summary)?;
    write_json(&config.summary_path, &summary)?;
    info!(path = %config.summary_path.display(), "Summary written");

    Ok(PipelineRun {
        output: summary,
        dropped,
    })
}
