use crate::analyzers::types::{MeasurementSummary, RegionalData};
use crate::analyzers::utility::{mean, min_max};
use crate::geo::assign;
use crate::registry::Region;
use crate::snapshot::{MeasurementType, Reading, WeatherSnapshot};
use std::collections::{BTreeMap, BTreeSet};

/// Aggregates the readings of `snapshot` that belong to `region`.
///
/// Every measurement type is present in the result; types with no matching
/// readings carry `None` statistics instead of a NaN average.
pub fn aggregate_region(region: &Region, snapshot: &WeatherSnapshot) -> RegionalData {
    let mut measurements = BTreeMap::new();
    let mut station_ids = BTreeSet::new();
    let mut total_readings = 0;

    for kind in MeasurementType::ALL {
        let matched: Vec<&Reading> = snapshot
            .readings(kind)
            .iter()
            .filter(|r| assign(r, region) || region.is_priority_station(&r.station))
            .collect();

        total_readings += matched.len();
        station_ids.extend(matched.iter().map(|r| r.station.clone()));

        measurements.insert(kind, summarize(kind, &matched));
    }

    RegionalData {
        region_id: region.id.clone(),
        region_name: region.name.clone(),
        measurements,
        station_ids: station_ids.into_iter().collect(),
        total_readings,
    }
}

fn summarize(kind: MeasurementType, readings: &[&Reading]) -> MeasurementSummary {
    let values: Vec<f64> = readings.iter().map(|r| r.value).collect();
    let stations: BTreeSet<String> = readings.iter().map(|r| r.station.clone()).collect();
    let bounds = min_max(&values);

    MeasurementSummary {
        average: mean(&values),
        min: bounds.map(|(lo, _)| lo),
        max: bounds.map(|(_, hi)| hi),
        count: values.len(),
        active_stations: (kind == MeasurementType::Rainfall)
            .then(|| values.iter().filter(|v| **v > 0.0).count()),
        stations: stations.into_iter().collect(),
        values,
    }
}
