//! Data types produced by the analysis pipeline.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::narrative::NarrativeAnalysis;
use crate::snapshot::MeasurementType;

/// Descriptive statistics for one measurement type within a region.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeasurementSummary {
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub count: usize,
    /// Rainfall only: readings reporting rain (> 0 mm/h).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_stations: Option<usize>,
    pub stations: Vec<String>,
    #[serde(skip)]
    pub(crate) values: Vec<f64>,
}

impl MeasurementSummary {
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Per-region aggregation of one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionalData {
    pub region_id: String,
    pub region_name: String,
    #[serde(flatten)]
    pub measurements: BTreeMap<MeasurementType, MeasurementSummary>,
    pub station_ids: Vec<String>,
    pub total_readings: usize,
}

impl RegionalData {
    pub fn summary(&self, kind: MeasurementType) -> Option<&MeasurementSummary> {
        self.measurements.get(&kind)
    }

    pub fn average(&self, kind: MeasurementType) -> Option<f64> {
        self.summary(kind).and_then(|s| s.average)
    }

    pub fn rainfall_active(&self) -> usize {
        self.summary(MeasurementType::Rainfall)
            .and_then(|s| s.active_stations)
            .unwrap_or(0)
    }
}

/// One weighted factor in a confidence score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorScore {
    pub name: String,
    pub weight: f64,
    pub value: f64,
    pub contribution: f64,
}

/// A bounded confidence value and the factors it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceScore {
    pub value: f64,
    pub base: f64,
    pub bonus_applied: bool,
    pub factors: Vec<FactorScore>,
    /// Overall score only: mean regional confidence blended into `value`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regional_mean: Option<f64>,
}

impl ConfidenceScore {
    /// A fixed score with no factor breakdown, used for failed regions.
    pub fn fixed(value: f64) -> Self {
        ConfidenceScore {
            value,
            base: value,
            bonus_applied: false,
            factors: Vec::new(),
            regional_mean: None,
        }
    }

    pub fn factor(&self, name: &str) -> Option<&FactorScore> {
        self.factors.iter().find(|f| f.name == name)
    }
}

/// Full analysis of one region.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub region_id: String,
    pub region_name: String,
    pub data: RegionalData,
    pub confidence: ConfidenceScore,
    pub analysis: NarrativeAnalysis,
    /// True when the narrative came from the deterministic template.
    pub fallback: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionalConfidence {
    pub region_id: String,
    pub region_name: String,
    pub confidence: f64,
    pub fallback: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfidenceBreakdown {
    pub overall_confidence: f64,
    pub overall: ConfidenceScore,
    pub regional_confidence: Vec<RegionalConfidence>,
    /// Factor name to qualitative label.
    pub quality_factors: BTreeMap<String, String>,
}

/// The output snapshot written at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub timestamp: DateTime<Utc>,
    pub data_timestamp: DateTime<FixedOffset>,
    pub source: String,
    pub achieved_confidence: String,
    pub overall_summary: String,
    pub regional_analyses: Vec<AnalysisResult>,
    pub confidence_breakdown: ConfidenceBreakdown,
    pub regions_analyzed: usize,
    pub successful_analyses: usize,
    pub fallback_analyses: usize,
    pub security_score: u32,
    pub validation_warnings: usize,
}
