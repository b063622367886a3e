//! Geospatial Assigner: great-circle membership of readings in regions.

use crate::registry::Region;
use crate::snapshot::{Coordinates, Reading};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Whether `reading` belongs to `region`.
///
/// Readings with coordinates match when they lie within the region radius of
/// its center; readings without coordinates match only through the region's
/// priority-station list. Regions may overlap, so a reading can match several.
pub fn assign(reading: &Reading, region: &Region) -> bool {
    match reading.coordinates {
        Some(c) => haversine_km(c, region.center) <= region.radius_km,
        None => region.is_priority_station(&reading.station),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::default_regions;

    fn at(latitude: f64, longitude: f64) -> Coordinates {
        Coordinates {
            latitude,
            longitude,
        }
    }

    fn reading(station: &str, coordinates: Option<Coordinates>) -> Reading {
        Reading {
            station: station.to_string(),
            value: 30.0,
            station_name: None,
            coordinates,
        }
    }

    /// Point `km` kilometres due north of `origin`.
    fn north_of(origin: Coordinates, km: f64) -> Coordinates {
        at(origin.latitude + (km / EARTH_RADIUS_KM).to_degrees(), origin.longitude)
    }

    #[test]
    fn test_zero_distance() {
        let p = at(1.3521, 103.8198);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_known_distance() {
        // Changi to Tuas, roughly 40 km
        let d = haversine_km(at(1.3644, 103.9915), at(1.2966, 103.6361));
        assert!((d - 40.2).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_symmetric() {
        let a = at(1.30, 103.80);
        let b = at(1.40, 103.95);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-12);
    }

    #[test]
    fn test_reading_at_center_matches() {
        for region in default_regions() {
            assert!(assign(&reading("S1", Some(region.center)), &region));
        }
    }

    #[test]
    fn test_radius_cutoff() {
        let regions = default_regions();
        let region = &regions[0];
        let inside = reading("S1", Some(north_of(region.center, 2.9)));
        let outside = reading("S2", Some(north_of(region.center, 3.1)));

        assert!(assign(&inside, region));
        assert!(!assign(&outside, region));
    }

    #[test]
    fn test_priority_membership_without_coordinates() {
        let regions = default_regions();
        let region = &regions[0];
        let priority = region.priority_stations[0].clone();
        assert!(assign(&reading(&priority, None), region));
        assert!(!assign(&reading("S999", None), region));
    }

    #[test]
    fn test_coordinates_take_precedence_over_priority_list() {
        let regions = default_regions();
        let region = &regions[0];
        let priority = region.priority_stations[0].clone();
        let far = reading(&priority, Some(north_of(region.center, 10.0)));
        assert!(!assign(&far, region));
    }
}
