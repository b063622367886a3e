//! Pipeline Orchestrator.
//!
//! `VALIDATE → (per region: AGGREGATE → ANALYZE → SCORE) → SCORE_OVERALL`.
//! Only validation failure is fatal. A region whose narrative falls back, or
//! whose task fails outright, gets the floor confidence.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, warn};

use crate::analyzers::aggregate::aggregate_region;
use crate::analyzers::confidence::{ConfidenceTuning, score_overall, score_region};
use crate::analyzers::grade::grade;
use crate::analyzers::types::{
    AnalysisReport, AnalysisResult, ConfidenceBreakdown, ConfidenceScore, RegionalConfidence,
    RegionalData,
};
use crate::analyzers::utility::{mean, min_max, percentage};
use crate::error::PipelineResult;
use crate::narrative::NarrativeAnalyzer;
use crate::narrative::fallback::fallback_analysis;
use crate::registry::Region;
use crate::snapshot::{MeasurementType, ValidatedSnapshot};
use crate::validation::validate_at;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Regions analysed at once. 1 reproduces the serial reference behaviour.
    pub concurrency: usize,
    pub tuning: ConfidenceTuning,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            concurrency: 1,
            tuning: ConfidenceTuning::default(),
        }
    }
}

pub struct Pipeline {
    regions: Arc<Vec<Region>>,
    narrator: Arc<NarrativeAnalyzer>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(regions: Vec<Region>, narrator: NarrativeAnalyzer, settings: PipelineSettings) -> Self {
        Self {
            regions: Arc::new(regions),
            narrator: Arc::new(narrator),
            settings,
        }
    }

    /// Runs the whole pipeline on one raw snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::PipelineError::InvalidSnapshot`] when the
    /// snapshot fails validation. Nothing else is fatal.
    #[tracing::instrument(skip_all, fields(regions = self.regions.len(), concurrency = self.settings.concurrency))]
    pub async fn run(&self, raw: &Value, now: DateTime<Utc>) -> PipelineResult<AnalysisReport> {
        let report = validate_at(raw, now);
        if !report.is_valid {
            error!(errors = report.errors.len(), "Snapshot failed validation");
        } else if !report.warnings.is_empty() {
            warn!(
                warnings = report.warnings.len(),
                security_score = report.security_score,
                "Snapshot accepted with warnings"
            );
        }
        for w in &report.warnings {
            debug!(warning = %w, "Validation warning");
        }

        let validated = Arc::new(report.into_validated()?);
        info!(
            stations = validated.snapshot.stations_used.len(),
            "Snapshot validated"
        );

        let analyses = self.analyze_regions(validated.clone(), now).await;
        let overall = score_overall(
            &validated,
            &analyses,
            &self.regions,
            now,
            &self.settings.tuning,
        );

        let successful = analyses.iter().filter(|a| !a.fallback).count();
        info!(
            confidence = overall.value,
            successful,
            fallback = analyses.len() - successful,
            "Analysis complete"
        );

        Ok(build_report(&validated, analyses, overall, now))
    }

    async fn analyze_regions(
        &self,
        validated: Arc<ValidatedSnapshot>,
        now: DateTime<Utc>,
    ) -> Vec<AnalysisResult> {
        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.settings.concurrency.max(1)));
        let mut tasks = Vec::with_capacity(self.regions.len());

        for region in self.regions.iter() {
            let sem = semaphore.clone();
            let narrator = self.narrator.clone();
            let validated = validated.clone();
            let tuning = self.settings.tuning.clone();
            let task_region = region.clone();

            let span = tracing::info_span!("analyze_region", region = %region.id);
            let task = tokio::spawn(
                async move {
                    let _permit = sem.acquire_owned().await.ok();
                    analyze_region(&task_region, &validated, &narrator, now, &tuning).await
                }
                .instrument(span),
            );
            tasks.push(task);
        }

        // Awaiting in registry order keeps the report independent of concurrency.
        let mut results = Vec::with_capacity(tasks.len());
        for (task, region) in tasks.into_iter().zip(self.regions.iter()) {
            match task.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!(region = %region.id, error = %e, "Region analysis failed, substituting fallback");
                    results.push(failed_result(region, &self.settings.tuning));
                }
            }
        }
        results
    }
}

/// Aggregates, narrates and scores one region.
///
/// A fallback narrative fixes the region's confidence at the floor.
pub async fn analyze_region(
    region: &Region,
    validated: &ValidatedSnapshot,
    narrator: &NarrativeAnalyzer,
    now: DateTime<Utc>,
    tuning: &ConfidenceTuning,
) -> AnalysisResult {
    let data = aggregate_region(region, &validated.snapshot);
    let outcome = narrator.analyze(region, &data, &validated.snapshot).await;

    let confidence = if outcome.fallback {
        ConfidenceScore::fixed(tuning.floor)
    } else {
        score_region(validated, &data, region, now, tuning)
    };
    debug!(
        readings = data.total_readings,
        stations = data.station_ids.len(),
        confidence = confidence.value,
        fallback = outcome.fallback,
        "Region analysed"
    );

    AnalysisResult {
        region_id: region.id.clone(),
        region_name: region.name.clone(),
        data,
        confidence,
        analysis: outcome.analysis,
        fallback: outcome.fallback,
    }
}

/// Result substituted for a region whose analysis could not complete.
pub fn failed_result(region: &Region, tuning: &ConfidenceTuning) -> AnalysisResult {
    AnalysisResult {
        region_id: region.id.clone(),
        region_name: region.name.clone(),
        data: RegionalData {
            region_id: region.id.clone(),
            region_name: region.name.clone(),
            measurements: MeasurementType::ALL
                .into_iter()
                .map(|k| (k, Default::default()))
                .collect(),
            station_ids: Vec::new(),
            total_readings: 0,
        },
        confidence: ConfidenceScore::fixed(tuning.floor),
        analysis: fallback_analysis(region),
        fallback: true,
    }
}

fn build_report(
    validated: &ValidatedSnapshot,
    analyses: Vec<AnalysisResult>,
    overall: ConfidenceScore,
    now: DateTime<Utc>,
) -> AnalysisReport {
    let successful = analyses.iter().filter(|a| !a.fallback).count();
    let quality_factors: BTreeMap<String, String> = overall
        .factors
        .iter()
        .map(|f| (f.name.clone(), grade(f.value)))
        .collect();
    let regional_confidence = analyses
        .iter()
        .map(|a| RegionalConfidence {
            region_id: a.region_id.clone(),
            region_name: a.region_name.clone(),
            confidence: a.confidence.value,
            fallback: a.fallback,
        })
        .collect();

    AnalysisReport {
        timestamp: now,
        data_timestamp: validated.snapshot.timestamp,
        source: validated.snapshot.source.clone(),
        achieved_confidence: percentage(overall.value),
        overall_summary: overall_summary(validated, &analyses),
        regions_analyzed: analyses.len(),
        successful_analyses: successful,
        fallback_analyses: analyses.len() - successful,
        security_score: validated.security_score,
        validation_warnings: validated.warning_count,
        confidence_breakdown: ConfidenceBreakdown {
            overall_confidence: overall.value,
            overall,
            regional_confidence,
            quality_factors,
        },
        regional_analyses: analyses,
    }
}

/// Island-wide one-paragraph summary built from the snapshot and the results.
pub fn overall_summary(validated: &ValidatedSnapshot, analyses: &[AnalysisResult]) -> String {
    let snap = &validated.snapshot;
    let temps = snap.values(MeasurementType::Temperature);

    let temperature = match (mean(&temps), min_max(&temps)) {
        (Some(avg), Some((lo, hi))) => {
            format!("average temperature {avg:.1}°C (range {lo:.1}–{hi:.1}°C)")
        }
        _ => "no temperature data".to_string(),
    };
    let humidity = match mean(&snap.values(MeasurementType::Humidity)) {
        Some(h) => format!("humidity {:.0}%", h.round()),
        None => "no humidity data".to_string(),
    };
    let raining: BTreeSet<&str> = snap
        .readings(MeasurementType::Rainfall)
        .iter()
        .filter(|r| r.value > 0.0)
        .map(|r| r.station.as_str())
        .collect();
    let rain = match raining.len() {
        0 => "no rainfall reported".to_string(),
        1 => "rain at 1 station".to_string(),
        n => format!("rain at {n} stations"),
    };
    let generated = analyses.iter().filter(|a| !a.fallback).count();

    format!(
        "Conditions across {regions} regions from {stations} stations: {temperature}, {humidity}, {rain}. \
         {generated} of {regions} regional narratives were generated; the rest use standard guidance.",
        regions = analyses.len(),
        stations = snap.stations_used.len(),
    )
}
