//! Typed records for one weather snapshot.
//!
//! Raw input is untrusted JSON; these types only ever hold data that has
//! passed through [`crate::validation`].

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

/// Kind of observation carried by a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementType {
    Temperature,
    Humidity,
    Rainfall,
    WindSpeed,
    WindDirection,
}

impl MeasurementType {
    pub const ALL: [MeasurementType; 5] = [
        MeasurementType::Temperature,
        MeasurementType::Humidity,
        MeasurementType::Rainfall,
        MeasurementType::WindSpeed,
        MeasurementType::WindDirection,
    ];

    /// Types the completeness factor is computed over.
    pub const CORE: [MeasurementType; 3] = [
        MeasurementType::Temperature,
        MeasurementType::Humidity,
        MeasurementType::Rainfall,
    ];

    pub fn key(self) -> &'static str {
        match self {
            MeasurementType::Temperature => "temperature",
            MeasurementType::Humidity => "humidity",
            MeasurementType::Rainfall => "rainfall",
            MeasurementType::WindSpeed => "wind_speed",
            MeasurementType::WindDirection => "wind_direction",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }

    /// Physically plausible `(min, max)` range, inclusive.
    ///
    /// | Type           | Range        | Unit  |
    /// |----------------|--------------|-------|
    /// | temperature    | 15 – 45      | °C    |
    /// | humidity       | 0 – 100      | %     |
    /// | rainfall       | 0 – 200      | mm/h  |
    /// | wind_speed     | 0 – 150      | km/h  |
    /// | wind_direction | 0 – 360      | deg   |
    pub fn range(self) -> (f64, f64) {
        match self {
            MeasurementType::Temperature => (15.0, 45.0),
            MeasurementType::Humidity => (0.0, 100.0),
            MeasurementType::Rainfall => (0.0, 200.0),
            MeasurementType::WindSpeed => (0.0, 150.0),
            MeasurementType::WindDirection => (0.0, 360.0),
        }
    }

    pub fn in_range(self, value: f64) -> bool {
        let (lo, hi) = self.range();
        value.is_finite() && value >= lo && value <= hi
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One observation from one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub station: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSeries {
    pub readings: Vec<Reading>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "critical" => Some(PriorityLevel::Critical),
            "high" => Some(PriorityLevel::High),
            "medium" => Some(PriorityLevel::Medium),
            "low" => Some(PriorityLevel::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_level: Option<PriorityLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographicCoverage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions_covered: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_percentage: Option<f64>,
}

/// Official forecast temperature band for the snapshot period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastBand {
    pub temperature_low: f64,
    pub temperature_high: f64,
}

impl ForecastBand {
    pub fn contains(&self, t: f64) -> bool {
        t >= self.temperature_low && t <= self.temperature_high
    }

    pub fn midpoint(&self) -> f64 {
        (self.temperature_low + self.temperature_high) / 2.0
    }
}

/// A sanitized weather snapshot. Only whitelisted fields survive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub timestamp: DateTime<FixedOffset>,
    pub source: String,
    pub stations_used: Vec<String>,
    pub data: BTreeMap<MeasurementType, MeasurementSeries>,
    pub station_details: BTreeMap<String, StationDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographic_coverage: Option<GeographicCoverage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_quality_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<ForecastBand>,
}

impl WeatherSnapshot {
    pub fn readings(&self, kind: MeasurementType) -> &[Reading] {
        self.data
            .get(&kind)
            .map(|s| s.readings.as_slice())
            .unwrap_or(&[])
    }

    pub fn values(&self, kind: MeasurementType) -> Vec<f64> {
        self.readings(kind).iter().map(|r| r.value).collect()
    }
}

/// Reading counts for one measurement type.
///
/// `raw` counts every entry in the feed. `out_of_range` counts only readings
/// dropped for a value outside physical bounds; readings dropped for a bad
/// station identifier or bad coordinates appear in neither `accepted` nor
/// `out_of_range`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadingTally {
    pub raw: usize,
    pub accepted: usize,
    pub out_of_range: usize,
}

impl ReadingTally {
    /// Share of range-checked readings that fell within bounds.
    pub fn acceptance(&self) -> Option<f64> {
        let checked = self.accepted + self.out_of_range;
        if checked == 0 {
            None
        } else {
            Some(self.accepted as f64 / checked as f64)
        }
    }
}

/// A snapshot that passed validation, plus what the validator observed.
#[derive(Debug, Clone)]
pub struct ValidatedSnapshot {
    pub snapshot: WeatherSnapshot,
    pub tally: BTreeMap<MeasurementType, ReadingTally>,
    pub security_score: u32,
    pub warning_count: usize,
}

/// Reads an untrusted snapshot document from disk.
///
/// Only the file read and the JSON parse can fail here; field checks belong
/// to [`crate::validation`].
pub fn load_snapshot(path: impl AsRef<Path>) -> PipelineResult<Value> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| PipelineError::Load {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(serde_json::from_str(&content)?)
}
