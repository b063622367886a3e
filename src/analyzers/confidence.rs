//! Confidence Scorer.
//!
//! A confidence score starts from a base and moves up or down by nine
//! independently weighted quality factors, each normalized to `[0, 1]`. A
//! factor at the midpoint leaves the base unchanged. The result is clamped to
//! `[floor, ceiling]`; perfect confidence is never reported.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzers::types::{AnalysisResult, ConfidenceScore, FactorScore, RegionalData};
use crate::analyzers::utility::{mean, round4, stddev};
use crate::registry::Region;
use crate::snapshot::{ForecastBand, MeasurementType, ValidatedSnapshot};

pub const DATA_COMPLETENESS: &str = "data_completeness";
pub const STATION_COVERAGE: &str = "station_coverage";
pub const TEMPORAL_CONSISTENCY: &str = "temporal_consistency";
pub const SPATIAL_COHERENCE: &str = "spatial_coherence";
pub const VALIDATION_CHECKS: &str = "validation_checks";
pub const EXPERT_RULES: &str = "expert_rules";
pub const CROSS_VALIDATION: &str = "cross_validation";
pub const REGIONAL_CONTEXT: &str = "regional_context";
pub const WEATHER_PATTERN_MATCH: &str = "weather_pattern_match";

/// Factor weights. They sum to one.
static WEIGHTS: &[(&str, f64)] = &[
    (DATA_COMPLETENESS, 0.15),
    (STATION_COVERAGE, 0.12),
    (TEMPORAL_CONSISTENCY, 0.10),
    (SPATIAL_COHERENCE, 0.08),
    (VALIDATION_CHECKS, 0.15),
    (EXPERT_RULES, 0.10),
    (CROSS_VALIDATION, 0.12),
    (REGIONAL_CONTEXT, 0.08),
    (WEATHER_PATTERN_MATCH, 0.10),
];

fn weight(name: &str) -> f64 {
    WEIGHTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, w)| *w)
        .unwrap_or(0.0)
}

/// Scoring constants. Defaults reproduce historical scores; change them only
/// together with any stored score history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceTuning {
    pub overall_base: f64,
    pub regional_base: f64,
    pub floor: f64,
    pub ceiling: f64,
    pub bonus_threshold: f64,
    pub bonus: f64,
    pub factor_midpoint: f64,
    pub adjustment_span: f64,
    pub expected_stations: f64,
    pub station_share_weight: f64,
    /// Temperature standard deviation (°C) at which spatial coherence hits zero.
    pub spatial_stddev_limit: f64,
    /// Spread of regional mean temperatures (°C) at which cross-validation hits zero.
    pub cross_validation_spread_limit: f64,
    pub min_regions_for_cross_validation: usize,
    pub forecast_margin: f64,
    /// Share of the overall score taken from the mean regional confidence.
    pub regional_blend: f64,
}

impl Default for ConfidenceTuning {
    fn default() -> Self {
        Self {
            overall_base: 0.85,
            regional_base: 0.80,
            floor: 0.75,
            ceiling: 0.99,
            bonus_threshold: 0.95,
            bonus: 0.02,
            factor_midpoint: 0.5,
            adjustment_span: 0.3,
            expected_stations: 40.0,
            station_share_weight: 0.7,
            spatial_stddev_limit: 5.0,
            cross_validation_spread_limit: 8.0,
            min_regions_for_cross_validation: 3,
            forecast_margin: 2.0,
            regional_blend: 0.4,
        }
    }
}

/// Combines `(factor, value)` pairs into a bounded score.
///
/// Weights are renormalized over the factors supplied, so the regional
/// variant's reduced set moves the score as far as the full set does.
pub fn combine(base: f64, factors: &[(&str, f64)], tuning: &ConfidenceTuning) -> ConfidenceScore {
    let total_weight: f64 = factors.iter().map(|(n, _)| weight(n)).sum();

    let mut raw = base;
    let mut breakdown = Vec::with_capacity(factors.len());

    for (name, value) in factors {
        let value = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
        let w = if total_weight > 0.0 {
            weight(name) / total_weight
        } else {
            0.0
        };
        let contribution = w * (value - tuning.factor_midpoint) * tuning.adjustment_span;
        raw += contribution;

        breakdown.push(FactorScore {
            name: name.to_string(),
            weight: round4(w),
            value: round4(value),
            contribution: round4(contribution),
        });
    }

    let bonus_applied = raw >= tuning.bonus_threshold;
    if bonus_applied {
        raw += tuning.bonus;
    }

    ConfidenceScore {
        value: round4(raw.clamp(tuning.floor, tuning.ceiling)),
        base,
        bonus_applied,
        factors: breakdown,
        regional_mean: None,
    }
}

/// Whole-dataset confidence.
///
/// The nine-factor score is blended with the mean regional confidence, so
/// regions that fell back to the template (fixed at the floor) pull the
/// overall value down.
pub fn score_overall(
    validated: &ValidatedSnapshot,
    analyses: &[AnalysisResult],
    regions: &[Region],
    now: DateTime<Utc>,
    tuning: &ConfidenceTuning,
) -> ConfidenceScore {
    let snap = &validated.snapshot;
    let temps = snap.values(MeasurementType::Temperature);
    let mean_temp = mean(&temps);
    let mean_humidity = mean(&snap.values(MeasurementType::Humidity));
    let mean_rain = mean(&snap.values(MeasurementType::Rainfall));

    let regions_with_stations = analyses
        .iter()
        .filter(|a| !a.data.station_ids.is_empty())
        .count();
    let region_share = if analyses.is_empty() {
        0.0
    } else {
        regions_with_stations as f64 / analyses.len() as f64
    };

    let factors = [
        (DATA_COMPLETENESS, data_completeness(validated)),
        (
            STATION_COVERAGE,
            station_coverage(snap.stations_used.len(), region_share, tuning),
        ),
        (TEMPORAL_CONSISTENCY, temporal_consistency(snap.timestamp, now)),
        (SPATIAL_COHERENCE, spatial_coherence(&temps, tuning)),
        (VALIDATION_CHECKS, validation_checks(validated)),
        (EXPERT_RULES, expert_rules(mean_temp, mean_humidity, mean_rain)),
        (CROSS_VALIDATION, cross_validation(analyses, tuning)),
        (REGIONAL_CONTEXT, regional_context(analyses, regions)),
        (
            WEATHER_PATTERN_MATCH,
            weather_pattern_match(mean_temp, snap.forecast, tuning),
        ),
    ];

    let mut score = combine(tuning.overall_base, &factors, tuning);

    let regional: Vec<f64> = analyses.iter().map(|a| a.confidence.value).collect();
    if let Some(m) = mean(&regional) {
        let blended = (1.0 - tuning.regional_blend) * score.value + tuning.regional_blend * m;
        score.value = round4(blended.clamp(tuning.floor, tuning.ceiling));
        score.regional_mean = Some(round4(m));
    }
    score
}

/// Confidence for one region, from the six factors that make sense locally.
pub fn score_region(
    validated: &ValidatedSnapshot,
    data: &RegionalData,
    region: &Region,
    now: DateTime<Utc>,
    tuning: &ConfidenceTuning,
) -> ConfidenceScore {
    let snap = &validated.snapshot;
    let temps = data
        .summary(MeasurementType::Temperature)
        .map(|s| s.values().to_vec())
        .unwrap_or_default();

    let reported: Vec<MeasurementType> = MeasurementType::CORE
        .into_iter()
        .filter(|k| !snap.readings(*k).is_empty())
        .collect();
    let completeness = if reported.is_empty() {
        0.0
    } else {
        let covered = reported
            .iter()
            .filter(|k| data.summary(**k).is_some_and(|s| s.count > 0))
            .count();
        covered as f64 / reported.len() as f64
    };

    let expected = region.priority_stations.len().max(1) as f64;
    let coverage = (data.station_ids.len() as f64 / expected).min(1.0);

    let rain = data
        .summary(MeasurementType::Rainfall)
        .filter(|s| s.count > 0)
        .map(|_| data.rainfall_active() as f64);

    let factors = [
        (DATA_COMPLETENESS, completeness),
        (STATION_COVERAGE, coverage),
        (TEMPORAL_CONSISTENCY, temporal_consistency(snap.timestamp, now)),
        (SPATIAL_COHERENCE, spatial_coherence(&temps, tuning)),
        (VALIDATION_CHECKS, validation_checks(validated)),
        (
            EXPERT_RULES,
            expert_rules(
                data.average(MeasurementType::Temperature),
                data.average(MeasurementType::Humidity),
                rain,
            ),
        ),
    ];

    combine(tuning.regional_base, &factors, tuning)
}

/// Share of core measurement types with at least one valid reading. Types
/// the feed reported no readings for at all are left out of the denominator.
pub fn data_completeness(validated: &ValidatedSnapshot) -> f64 {
    let reported: Vec<MeasurementType> = MeasurementType::CORE
        .into_iter()
        .filter(|k| validated.tally.get(k).is_some_and(|t| t.raw > 0))
        .collect();
    if reported.is_empty() {
        return 0.0;
    }
    let valid = reported
        .iter()
        .filter(|k| !validated.snapshot.readings(**k).is_empty())
        .count();
    valid as f64 / reported.len() as f64
}

pub fn station_coverage(stations_used: usize, region_share: f64, tuning: &ConfidenceTuning) -> f64 {
    let station_share = (stations_used as f64 / tuning.expected_stations).min(1.0);
    station_share * tuning.station_share_weight + region_share * (1.0 - tuning.station_share_weight)
}

pub fn temporal_consistency(timestamp: DateTime<FixedOffset>, now: DateTime<Utc>) -> f64 {
    let age = (now - timestamp.with_timezone(&Utc)).num_minutes().max(0);
    match age {
        0..=30 => 1.0,
        31..=60 => 0.9,
        61..=120 => 0.7,
        _ => 0.5,
    }
}

pub fn spatial_coherence(temperatures: &[f64], tuning: &ConfidenceTuning) -> f64 {
    let Some(m) = mean(temperatures).filter(|_| temperatures.len() >= 2) else {
        return 0.5;
    };
    let limit = tuning.spatial_stddev_limit;
    ((limit - stddev(temperatures, m)) / limit).clamp(0.3, 1.0)
}

/// Mean share of readings within physical bounds, over measurement types
/// with at least one range-checked reading.
pub fn validation_checks(validated: &ValidatedSnapshot) -> f64 {
    let rates: Vec<f64> = validated
        .tally
        .values()
        .filter_map(|t| t.acceptance())
        .collect();
    mean(&rates).unwrap_or(0.0)
}

/// Physical-plausibility heuristics on the mean values.
///
/// `rainfall` is the mean rainfall (or, regionally, the active-station count);
/// only whether it is above zero matters.
pub fn expert_rules(temperature: Option<f64>, humidity: Option<f64>, rainfall: Option<f64>) -> f64 {
    let heat = match (temperature, humidity) {
        (Some(t), Some(h)) if t > 33.0 && h > 85.0 => 0.8,
        (Some(t), Some(h)) if t < 22.0 && h < 50.0 => 0.7,
        (Some(_), Some(_)) => 1.0,
        _ => 0.8,
    };
    let rain = match (rainfall, humidity) {
        (Some(r), Some(h)) if r > 0.0 && h < 60.0 => 0.7,
        (Some(r), Some(h)) if r <= 0.0 && h >= 95.0 => 0.9,
        (Some(_), Some(_)) => 1.0,
        _ => 0.8,
    };
    (heat + rain) / 2.0
}

/// Agreement between regional mean temperatures.
pub fn cross_validation(analyses: &[AnalysisResult], tuning: &ConfidenceTuning) -> f64 {
    let means: Vec<f64> = analyses
        .iter()
        .filter_map(|a| a.data.average(MeasurementType::Temperature))
        .collect();

    if means.len() < tuning.min_regions_for_cross_validation {
        return if means.is_empty() { 0.5 } else { 0.6 };
    }

    let lo = means.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = means.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let limit = tuning.cross_validation_spread_limit;
    ((limit - (hi - lo)) / limit).clamp(0.3, 1.0)
}

/// Share of narratives consistent with their region's characteristic tags.
/// A fallback narrative earns half credit.
pub fn regional_context(analyses: &[AnalysisResult], regions: &[Region]) -> f64 {
    let scores: Vec<f64> = analyses
        .iter()
        .map(|a| {
            if a.fallback {
                return 0.5;
            }
            let Some(region) = regions.iter().find(|r| r.id == a.region_id) else {
                return 0.5;
            };
            let text = a.analysis.full_text().to_lowercase();
            let consistent = region
                .characteristics
                .iter()
                .any(|tag| text.contains(&tag.to_lowercase()));
            if consistent { 1.0 } else { 0.0 }
        })
        .collect();
    mean(&scores).unwrap_or(0.5)
}

pub fn weather_pattern_match(
    mean_temperature: Option<f64>,
    forecast: Option<ForecastBand>,
    tuning: &ConfidenceTuning,
) -> f64 {
    match (mean_temperature, forecast) {
        (Some(t), Some(band)) if band.contains(t) => 0.9,
        (Some(t), Some(band)) if (t - band.midpoint()).abs() <= tuning.forecast_margin => 0.8,
        _ => 0.7,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::aggregate::aggregate_region;
    use crate::narrative::fallback::fallback_analysis;
    use crate::registry::default_regions;
    use crate::snapshot::{MeasurementSeries, Reading, ReadingTally, WeatherSnapshot};
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 4, 0, 0).unwrap()
    }

    fn reading(station: &str, value: f64) -> Reading {
        Reading {
            station: station.to_string(),
            value,
            station_name: None,
            coordinates: None,
        }
    }

    fn validated(data: Vec<(MeasurementType, Vec<Reading>, usize)>) -> ValidatedSnapshot {
        let mut tally = BTreeMap::new();
        let mut series = BTreeMap::new();
        for (kind, readings, raw) in data {
            tally.insert(
                kind,
                ReadingTally {
                    raw,
                    accepted: readings.len(),
                    out_of_range: raw - readings.len(),
                },
            );
            series.insert(kind, MeasurementSeries { readings });
        }
        ValidatedSnapshot {
            snapshot: WeatherSnapshot {
                timestamp: now().fixed_offset() - Duration::minutes(10),
                source: "test".into(),
                stations_used: vec!["S24".into(), "S43".into()],
                data: series,
                station_details: BTreeMap::new(),
                geographic_coverage: None,
                data_quality_score: None,
                forecast: None,
            },
            tally,
            security_score: 100,
            warning_count: 0,
        }
    }

    fn analyses_for(
        v: &ValidatedSnapshot,
        regions: &[Region],
        fallback: bool,
    ) -> Vec<AnalysisResult> {
        let tuning = ConfidenceTuning::default();
        regions
            .iter()
            .map(|r| {
                let data = aggregate_region(r, &v.snapshot);
                AnalysisResult {
                    region_id: r.id.clone(),
                    region_name: r.name.clone(),
                    confidence: if fallback {
                        ConfidenceScore::fixed(tuning.floor)
                    } else {
                        score_region(v, &data, r, now(), &tuning)
                    },
                    analysis: fallback_analysis(r),
                    data,
                    fallback,
                }
            })
            .collect()
    }

    fn rich() -> ValidatedSnapshot {
        validated(vec![
            (
                MeasurementType::Temperature,
                vec![reading("S24", 30.0), reading("S60", 29.5), reading("S104", 28.7)],
                4,
            ),
            (MeasurementType::Humidity, vec![reading("S24", 78.0)], 1),
            (MeasurementType::Rainfall, vec![reading("S24", 0.0)], 1),
        ])
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = WEIGHTS.iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_neutral_factors_score_base() {
        let tuning = ConfidenceTuning::default();
        let factors: Vec<(&str, f64)> = WEIGHTS.iter().map(|(n, _)| (*n, 0.5)).collect();
        let s = combine(tuning.overall_base, &factors, &tuning);
        assert_eq!(s.value, 0.85);
        assert!(!s.bonus_applied);
    }

    #[test]
    fn test_perfect_factors_capped_below_one() {
        let tuning = ConfidenceTuning::default();
        let factors: Vec<(&str, f64)> = WEIGHTS.iter().map(|(n, _)| (*n, 1.0)).collect();
        let s = combine(tuning.overall_base, &factors, &tuning);
        assert!(s.bonus_applied);
        assert_eq!(s.value, 0.99);
    }

    #[test]
    fn test_worst_factors_hit_floor() {
        let tuning = ConfidenceTuning::default();
        let factors: Vec<(&str, f64)> = WEIGHTS.iter().map(|(n, _)| (*n, 0.0)).collect();
        let s = combine(tuning.regional_base, &factors, &tuning);
        assert_eq!(s.value, 0.75);
    }

    #[test]
    fn test_out_of_range_factor_values_clamped() {
        let tuning = ConfidenceTuning::default();
        let s = combine(0.85, &[(EXPERT_RULES, 7.0), (CROSS_VALIDATION, f64::NAN)], &tuning);
        assert_eq!(s.factors[0].value, 1.0);
        assert_eq!(s.factors[1].value, 0.0);
    }

    #[test]
    fn test_temporal_bands() {
        let ts = |mins: i64| (now() - Duration::minutes(mins)).fixed_offset();
        assert_eq!(temporal_consistency(ts(0), now()), 1.0);
        assert_eq!(temporal_consistency(ts(30), now()), 1.0);
        assert_eq!(temporal_consistency(ts(45), now()), 0.9);
        assert_eq!(temporal_consistency(ts(120), now()), 0.7);
        assert_eq!(temporal_consistency(ts(121), now()), 0.5);
        assert_eq!(temporal_consistency(ts(-20), now()), 1.0);
    }

    #[test]
    fn test_spatial_coherence() {
        let t = ConfidenceTuning::default();
        assert_eq!(spatial_coherence(&[30.0], &t), 0.5);
        assert_eq!(spatial_coherence(&[30.0, 30.0], &t), 1.0);
        // stddev 1.0
        assert!((spatial_coherence(&[29.0, 31.0], &t) - 0.8).abs() < 1e-9);
        assert_eq!(spatial_coherence(&[15.0, 45.0], &t), 0.3);
    }

    #[test]
    fn test_completeness_excludes_unreported_types() {
        let v = validated(vec![
            (MeasurementType::Temperature, vec![reading("S24", 30.0)], 1),
            (MeasurementType::Humidity, vec![], 0),
            (MeasurementType::Rainfall, vec![reading("S24", 0.0)], 1),
        ]);
        assert_eq!(data_completeness(&v), 1.0);

        let v = validated(vec![
            (MeasurementType::Temperature, vec![reading("S24", 30.0)], 1),
            (MeasurementType::Humidity, vec![], 3),
        ]);
        assert_eq!(data_completeness(&v), 0.5);
    }

    #[test]
    fn test_validation_checks_averages_acceptance() {
        let v = validated(vec![
            (MeasurementType::Temperature, vec![reading("S24", 30.0)], 2),
            (MeasurementType::Humidity, vec![reading("S24", 80.0)], 1),
            (MeasurementType::Rainfall, vec![], 0),
        ]);
        assert_eq!(validation_checks(&v), 0.75);
    }

    #[test]
    fn test_expert_rules() {
        assert_eq!(expert_rules(Some(30.0), Some(80.0), Some(0.0)), 1.0);
        assert_eq!(expert_rules(Some(34.0), Some(90.0), Some(0.0)), 0.9);
        assert_eq!(expert_rules(Some(30.0), Some(50.0), Some(3.0)), 0.85);
        assert_eq!(expert_rules(None, None, None), 0.8);
    }

    #[test]
    fn test_weather_pattern_match() {
        let t = ConfidenceTuning::default();
        let band = Some(ForecastBand {
            temperature_low: 26.0,
            temperature_high: 28.0,
        });
        assert_eq!(weather_pattern_match(Some(27.0), band, &t), 0.9);
        assert_eq!(weather_pattern_match(Some(28.5), band, &t), 0.8);
        assert_eq!(weather_pattern_match(Some(33.0), band, &t), 0.7);
        assert_eq!(weather_pattern_match(Some(27.0), None, &t), 0.7);
    }

    #[test]
    fn test_cross_validation_requires_three_regions() {
        let regions = default_regions();
        let v = validated(vec![(
            MeasurementType::Temperature,
            vec![reading("S24", 30.0), reading("S60", 29.0)],
            2,
        )]);
        let analyses = analyses_for(&v, &regions, true);
        // only east and south have data
        assert_eq!(cross_validation(&analyses, &ConfidenceTuning::default()), 0.6);
        assert_eq!(cross_validation(&[], &ConfidenceTuning::default()), 0.5);
    }

    #[test]
    fn test_cross_validation_spread() {
        let regions = default_regions();
        let v = validated(vec![(
            MeasurementType::Temperature,
            vec![reading("S24", 30.0), reading("S60", 29.0), reading("S104", 28.0)],
            3,
        )]);
        let analyses = analyses_for(&v, &regions, false);
        let cv = cross_validation(&analyses, &ConfidenceTuning::default());
        assert!((cv - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_context_half_credit() {
        let regions = default_regions();
        let v = validated(vec![(MeasurementType::Temperature, vec![reading("S24", 30.0)], 1)]);
        let analyses = analyses_for(&v, &regions, true);
        assert_eq!(regional_context(&analyses, &regions), 0.5);
    }

    #[test]
    fn test_scores_bounded_and_deterministic() {
        let regions = default_regions();
        let v = rich();
        let analyses = analyses_for(&v, &regions, false);
        let tuning = ConfidenceTuning::default();

        let a = score_overall(&v, &analyses, &regions, now(), &tuning);
        let b = score_overall(&v, &analyses, &regions, now(), &tuning);
        assert_eq!(a, b);
        assert!((0.75..=0.99).contains(&a.value));
        assert_eq!(a.factors.len(), 9);

        for r in &analyses {
            assert!((0.75..=0.99).contains(&r.confidence.value));
            assert_eq!(r.confidence.factors.len(), 6);
            assert_eq!(r.confidence.base, 0.80);
        }
    }

    #[test]
    fn test_region_without_data_scores_low() {
        let regions = default_regions();
        let v = validated(vec![(MeasurementType::Temperature, vec![reading("S24", 30.0)], 1)]);
        let west = regions.iter().find(|r| r.id == "west").unwrap();
        let data = aggregate_region(west, &v.snapshot);
        let s = score_region(&v, &data, west, now(), &ConfidenceTuning::default());
        assert_eq!(s.factor(DATA_COMPLETENESS).unwrap().value, 0.0);
        assert_eq!(s.factor(STATION_COVERAGE).unwrap().value, 0.0);

        let east = regions.iter().find(|r| r.id == "east").unwrap();
        let east_data = aggregate_region(east, &v.snapshot);
        let covered = score_region(&v, &east_data, east, now(), &ConfidenceTuning::default());
        assert!(s.value < covered.value);
    }

    #[test]
    fn test_all_fallback_regions_pull_overall_down() {
        let regions = default_regions();
        let v = rich();
        let tuning = ConfidenceTuning::default();

        let fallback = score_overall(&v, &analyses_for(&v, &regions, true), &regions, now(), &tuning);
        let generated =
            score_overall(&v, &analyses_for(&v, &regions, false), &regions, now(), &tuning);

        assert_eq!(fallback.regional_mean, Some(0.75));
        assert!(fallback.value <= 0.90);
        assert!(fallback.value >= 0.75);
        assert!(fallback.value < generated.value);
    }

    #[test]
    fn test_blend_uses_regional_mean() {
        let regions = default_regions();
        let v = rich();
        let tuning = ConfidenceTuning::default();
        let analyses = analyses_for(&v, &regions, true);

        let unblended = score_overall(
            &v,
            &analyses,
            &regions,
            now(),
            &ConfidenceTuning {
                regional_blend: 0.0,
                ..tuning.clone()
            },
        );
        let blended = score_overall(&v, &analyses, &regions, now(), &tuning);
        let expected = round4(0.6 * unblended.value + 0.4 * 0.75);
        assert!((blended.value - expected).abs() < 1e-4);
    }
}
