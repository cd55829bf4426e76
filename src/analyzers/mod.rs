//! Comment aggregation, quality scoring and dashboard rollups.
//!
//! This module groups per-comment rows into per-video aggregates, computes
//! the engagement score and the signed Comment Quality Score (CQS), builds
//! category histograms and synthetic trend lines, and assembles the report
//! the dashboard reads.

pub mod aggregate;
pub mod analyzer;
pub mod history;
pub mod rollup;
pub mod score;
pub mod types;
pub mod utility;
