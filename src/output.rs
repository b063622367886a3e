//! Output persistence for analysis reports.
//!
//! Supports pretty-printing, atomic JSON writes, and run-history CSV append.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::AnalysisReport;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes `value` as pretty JSON to `path`.
///
/// The body goes to a sibling `.tmp` file first and is renamed into place, so
/// readers see either the previous file or the complete new one.
pub fn write_report(path: impl AsRef<Path>, value: &impl Serialize) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory '{}'", parent.display()))?;
    }

    let body = serde_json::to_vec_pretty(value)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    std::fs::write(&tmp, body).with_context(|| format!("writing '{}'", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("moving report into place at '{}'", path.display()))?;

    debug!(path = %path.display(), "Report written");
    Ok(())
}

/// One row of the run-history CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRecord {
    pub timestamp: String,
    pub data_timestamp: String,
    pub overall_confidence: f64,
    pub regions_analyzed: usize,
    pub successful_analyses: usize,
    pub fallback_analyses: usize,
    pub security_score: u32,
    pub validation_warnings: usize,
}

impl RunRecord {
    pub fn from_report(report: &AnalysisReport) -> Self {
        Self {
            timestamp: report.timestamp.to_rfc3339(),
            data_timestamp: report.data_timestamp.to_rfc3339(),
            overall_confidence: report.confidence_breakdown.overall_confidence,
            regions_analyzed: report.regions_analyzed,
            successful_analyses: report.successful_analyses,
            fallback_analyses: report.fallback_analyses,
            security_score: report.security_score,
            validation_warnings: report.validation_warnings,
        }
    }
}

/// Appends a [`RunRecord`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_history(path: impl AsRef<Path>, record: &RunRecord) -> Result<()> {
    let path = path.as_ref();
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending run history");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}
