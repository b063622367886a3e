//! Integrity Validator.
//!
//! Checks a raw snapshot's structure, timestamp, station table and readings,
//! and rebuilds a clean [`WeatherSnapshot`] from whitelisted fields only. A
//! single bad reading or station becomes a warning; only structural problems
//! are errors.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{PipelineError, PipelineResult};
use crate::registry::SINGAPORE_BOUNDS;
use crate::snapshot::{
    Coordinates, ForecastBand, GeographicCoverage, MeasurementSeries, MeasurementType,
    PriorityLevel, Reading, ReadingTally, StationDetail, ValidatedSnapshot, WeatherSnapshot,
};

pub const REQUIRED_FIELDS: [&str; 5] = [
    "timestamp",
    "source",
    "stations_used",
    "data",
    "station_details",
];

/// Maximum length of any free-text field after sanitization.
pub const MAX_TEXT_LEN: usize = 200;

const STRIPPED_CHARS: [char; 5] = ['<', '>', '"', '\'', '&'];
const MIN_YEAR_EXCLUSIVE: i32 = 2020;
const FUTURE_TOLERANCE_MINUTES: i64 = 5;

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitized: Option<WeatherSnapshot>,
    pub security_score: u32,
    pub tally: BTreeMap<MeasurementType, ReadingTally>,
}

impl ValidationReport {
    /// Converts an accepted report into the pipeline's input, or the fatal error.
    pub fn into_validated(self) -> PipelineResult<ValidatedSnapshot> {
        let warning_count = self.warnings.len();
        match self.sanitized {
            Some(snapshot) if self.is_valid => Ok(ValidatedSnapshot {
                snapshot,
                tally: self.tally,
                security_score: self.security_score,
                warning_count,
            }),
            _ => Err(PipelineError::InvalidSnapshot {
                errors: self.errors,
            }),
        }
    }
}

/// `100 − 20×errors − 5×warnings`, floored at zero.
pub fn security_score(errors: usize, warnings: usize) -> u32 {
    let penalty = 20 * errors as i64 + 5 * warnings as i64;
    (100 - penalty).max(0) as u32
}

/// Matches `^S\d{1,3}$`.
pub fn is_valid_station_id(id: &str) -> bool {
    match id.strip_prefix('S') {
        Some(digits) => (1..=3).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Removes markup-significant characters, trims, and truncates to
/// [`MAX_TEXT_LEN`] characters. Idempotent.
pub fn sanitize_text(input: &str) -> String {
    let stripped: String = input
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c) && !c.is_control())
        .collect();
    stripped
        .trim()
        .chars()
        .take(MAX_TEXT_LEN)
        .collect::<String>()
        .trim_end()
        .to_string()
}

pub fn validate(raw: &Value) -> ValidationReport {
    validate_at(raw, Utc::now())
}

/// Validates `raw` as of `now` (used for the future-timestamp check).
pub fn validate_at(raw: &Value, now: DateTime<Utc>) -> ValidationReport {
    let mut v = Validator::default();
    let sanitized = v.run(raw, now);
    let is_valid = v.errors.is_empty();

    ValidationReport {
        is_valid,
        security_score: security_score(v.errors.len(), v.warnings.len()),
        sanitized: if is_valid { sanitized } else { None },
        errors: v.errors,
        warnings: v.warnings,
        tally: v.tally,
    }
}

#[derive(Default)]
struct Validator {
    errors: Vec<String>,
    warnings: Vec<String>,
    tally: BTreeMap<MeasurementType, ReadingTally>,
}

impl Validator {
    fn run(&mut self, raw: &Value, now: DateTime<Utc>) -> Option<WeatherSnapshot> {
        let Some(obj) = raw.as_object() else {
            self.errors.push("snapshot must be a JSON object".into());
            return None;
        };

        for field in REQUIRED_FIELDS {
            if !obj.contains_key(field) {
                self.errors.push(format!("missing required field '{field}'"));
            }
        }
        if !self.errors.is_empty() {
            return None;
        }

        let timestamp = self.timestamp(&obj["timestamp"], now);
        let source = match obj["source"].as_str() {
            Some(s) => sanitize_text(s),
            None => {
                self.errors.push("'source' must be a string".into());
                String::new()
            }
        };
        let stations_used = self.stations_used(&obj["stations_used"]);
        let station_details = self.station_details(&obj["station_details"]);
        let data = self.data(&obj["data"]);

        let data_quality_score = obj.get("data_quality_score").and_then(|v| {
            match v.as_f64() {
                Some(s) if (0.0..=100.0).contains(&s) => Some(s),
                _ => {
                    self.warnings
                        .push("'data_quality_score' must be a number in [0, 100]; dropped".into());
                    None
                }
            }
        });
        let geographic_coverage = obj
            .get("geographic_coverage")
            .and_then(|v| self.geographic_coverage(v));
        let forecast = obj.get("forecast").and_then(|v| self.forecast(v));

        if !self.errors.is_empty() {
            return None;
        }

        Some(WeatherSnapshot {
            timestamp: timestamp?,
            source,
            stations_used: stations_used?,
            data: data?,
            station_details: station_details?,
            geographic_coverage,
            data_quality_score,
            forecast,
        })
    }

    fn timestamp(&mut self, v: &Value, now: DateTime<Utc>) -> Option<DateTime<FixedOffset>> {
        let Some(ts) = v.as_str().and_then(parse_timestamp) else {
            self.errors.push("'timestamp' is not a valid ISO-8601 date-time".into());
            return None;
        };
        if ts.year() <= MIN_YEAR_EXCLUSIVE {
            self.errors
                .push(format!("'timestamp' year must be after {MIN_YEAR_EXCLUSIVE}"));
            return None;
        }
        if ts.with_timezone(&Utc) > now + Duration::minutes(FUTURE_TOLERANCE_MINUTES) {
            self.warnings.push("'timestamp' lies in the future".into());
        }
        Some(ts)
    }

    fn stations_used(&mut self, v: &Value) -> Option<Vec<String>> {
        let Some(items) = v.as_array() else {
            self.errors.push("'stations_used' must be an array".into());
            return None;
        };
        let mut out: Vec<String> = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(id) if is_valid_station_id(id) => {
                    if !out.iter().any(|s| s == id) {
                        out.push(id.to_string());
                    }
                }
                _ => self
                    .warnings
                    .push(format!("stations_used[{idx}] is not a valid station identifier")),
            }
        }
        Some(out)
    }

    fn station_details(&mut self, v: &Value) -> Option<BTreeMap<String, StationDetail>> {
        let Some(stations) = v.as_object() else {
            self.errors.push("'station_details' must be an object".into());
            return None;
        };
        let mut out = BTreeMap::new();
        for (id, detail) in stations {
            if let Some(d) = self.station(id, detail) {
                out.insert(id.clone(), d);
            }
        }
        if out.is_empty() {
            self.errors.push("no station passed validation".into());
            return None;
        }
        Some(out)
    }

    fn station(&mut self, id: &str, v: &Value) -> Option<StationDetail> {
        if !is_valid_station_id(id) {
            self.warnings
                .push("station_details contains an invalid station identifier".into());
            return None;
        }
        let Some(obj) = v.as_object() else {
            self.warnings.push(format!("station {id} is not an object"));
            return None;
        };
        let Some(coordinates) = obj.get("coordinates").and_then(parse_coordinates) else {
            self.warnings
                .push(format!("station {id} has missing or malformed coordinates"));
            return None;
        };
        if !SINGAPORE_BOUNDS.contains(coordinates.latitude, coordinates.longitude) {
            self.warnings
                .push(format!("station {id} lies outside the supported bounds"));
            return None;
        }

        let reliability_score = obj.get("reliability_score").and_then(|r| match r.as_f64() {
            Some(s) if (0.0..=1.0).contains(&s) => Some(s),
            _ => {
                self.warnings
                    .push(format!("station {id} reliability_score outside [0, 1]; dropped"));
                None
            }
        });
        let priority_level = obj.get("priority_level").and_then(|p| {
            match p.as_str().and_then(PriorityLevel::parse) {
                Some(level) => Some(level),
                None => {
                    self.warnings
                        .push(format!("station {id} has an unknown priority_level; dropped"));
                    None
                }
            }
        });

        Some(StationDetail {
            name: clean_name(obj.get("name")),
            coordinates,
            reliability_score,
            priority_level,
        })
    }

    fn data(&mut self, v: &Value) -> Option<BTreeMap<MeasurementType, MeasurementSeries>> {
        let Some(series) = v.as_object() else {
            self.errors.push("'data' must be an object".into());
            return None;
        };
        let mut out = BTreeMap::new();
        for (key, body) in series {
            let Some(kind) = MeasurementType::from_key(key) else {
                self.warnings
                    .push("data contains an unknown measurement type; ignored".into());
                continue;
            };
            let readings = self.series(kind, body);
            out.insert(kind, MeasurementSeries { readings });
        }
        Some(out)
    }

    fn series(&mut self, kind: MeasurementType, v: &Value) -> Vec<Reading> {
        let Some(raw) = v.get("readings").and_then(Value::as_array) else {
            self.warnings.push(format!("{kind} has no readings array"));
            self.tally.entry(kind).or_default();
            return Vec::new();
        };

        let mut readings = Vec::with_capacity(raw.len());
        let mut out_of_range = 0;
        for (idx, item) in raw.iter().enumerate() {
            match reading(kind, item) {
                Ok(r) => readings.push(r),
                Err(rejection) => {
                    if matches!(rejection, Rejection::OutOfRange(_)) {
                        out_of_range += 1;
                    }
                    self.warnings
                        .push(format!("{kind} reading #{idx} dropped: {rejection}"));
                }
            }
        }

        let tally = self.tally.entry(kind).or_default();
        tally.raw += raw.len();
        tally.accepted += readings.len();
        tally.out_of_range += out_of_range;
        readings
    }

    fn geographic_coverage(&mut self, v: &Value) -> Option<GeographicCoverage> {
        let Some(obj) = v.as_object() else {
            self.warnings
                .push("'geographic_coverage' must be an object; dropped".into());
            return None;
        };
        Some(GeographicCoverage {
            regions_covered: obj
                .get("regions_covered")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok()),
            coverage_percentage: obj
                .get("coverage_percentage")
                .and_then(Value::as_f64)
                .filter(|p| (0.0..=100.0).contains(p)),
        })
    }

    fn forecast(&mut self, v: &Value) -> Option<ForecastBand> {
        let low = v.get("temperature_low").and_then(Value::as_f64);
        let high = v.get("temperature_high").and_then(Value::as_f64);
        let t = MeasurementType::Temperature;
        match (low, high) {
            (Some(lo), Some(hi)) if lo <= hi && t.in_range(lo) && t.in_range(hi) => {
                Some(ForecastBand {
                    temperature_low: lo,
                    temperature_high: hi,
                })
            }
            _ => {
                self.warnings
                    .push("'forecast' band is malformed or implausible; dropped".into());
                None
            }
        }
    }
}

/// Why a single reading was dropped.
#[derive(Debug)]
enum Rejection {
    OutOfRange(String),
    Malformed(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::OutOfRange(msg) | Rejection::Malformed(msg) => f.write_str(msg),
        }
    }
}

fn reading(kind: MeasurementType, v: &Value) -> Result<Reading, Rejection> {
    let obj = v
        .as_object()
        .ok_or_else(|| Rejection::Malformed("not an object".into()))?;

    let station = obj
        .get("station")
        .and_then(Value::as_str)
        .filter(|s| is_valid_station_id(s))
        .ok_or_else(|| Rejection::Malformed("invalid station identifier".into()))?;

    let value = obj
        .get("value")
        .and_then(Value::as_f64)
        .ok_or_else(|| Rejection::Malformed(format!("{station} has a non-numeric value")))?;
    if !kind.in_range(value) {
        let (lo, hi) = kind.range();
        return Err(Rejection::OutOfRange(format!(
            "{station} value {value} outside [{lo}, {hi}]"
        )));
    }

    let coordinates = match obj.get("coordinates") {
        None | Some(Value::Null) => None,
        Some(c) => {
            let c = parse_coordinates(c)
                .ok_or_else(|| Rejection::Malformed(format!("{station} has malformed coordinates")))?;
            if !SINGAPORE_BOUNDS.contains(c.latitude, c.longitude) {
                return Err(Rejection::Malformed(format!(
                    "{station} coordinates outside the supported bounds"
                )));
            }
            Some(c)
        }
    };

    Ok(Reading {
        station: station.to_string(),
        value,
        station_name: clean_name(obj.get("station_name").or_else(|| obj.get("name"))),
        coordinates,
    })
}

fn clean_name(v: Option<&Value>) -> Option<String> {
    v.and_then(Value::as_str)
        .map(sanitize_text)
        .filter(|s| !s.is_empty())
}

fn parse_coordinates(v: &Value) -> Option<Coordinates> {
    let obj: &Map<String, Value> = v.as_object()?;
    let latitude = obj
        .get("latitude")
        .or_else(|| obj.get("lat"))
        .and_then(Value::as_f64)?;
    let longitude = obj
        .get("longitude")
        .or_else(|| obj.get("lng"))
        .and_then(Value::as_f64)?;
    Some(Coordinates {
        latitude,
        longitude,
    })
}

/// Accepts RFC 3339 or an offset-less ISO-8601 date-time (read as UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts);
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}
