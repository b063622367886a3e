//! Station Registry: the fixed table of named Singapore regions.
//!
//! Regions are static configuration. The built-in table carries eight zones;
//! deployments can replace it with a JSON file of the same shape.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::snapshot::Coordinates;

/// Default membership radius around a region center, in kilometres.
pub const ASSIGNMENT_RADIUS_KM: f64 = 3.0;

/// Geographic bounding box every coordinate in a snapshot must fall inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl Bounds {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat.is_finite()
            && lng.is_finite()
            && lat >= self.lat_min
            && lat <= self.lat_max
            && lng >= self.lng_min
            && lng <= self.lng_max
    }
}

pub const SINGAPORE_BOUNDS: Bounds = Bounds {
    lat_min: 1.16,
    lat_max: 1.48,
    lng_min: 103.6,
    lng_max: 104.0,
};

fn default_radius() -> f64 {
    ASSIGNMENT_RADIUS_KM
}

/// A named geographic zone used to partition stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub center: Coordinates,
    #[serde(default = "default_radius")]
    pub radius_km: f64,
    pub priority_stations: Vec<String>,
    /// Narrative flavour only; never used for membership.
    #[serde(default)]
    pub characteristics: Vec<String>,
    #[serde(default)]
    pub analysis_focus: Vec<String>,
}

impl Region {
    pub fn is_priority_station(&self, station: &str) -> bool {
        self.priority_stations.iter().any(|s| s == station)
    }

    /// First characteristic tag, used by the fallback narrative.
    pub fn primary_characteristic(&self) -> &str {
        self.characteristics
            .first()
            .map(String::as_str)
            .unwrap_or("mixed-use")
    }
}

fn region(
    id: &str,
    name: &str,
    lat: f64,
    lng: f64,
    priority: &[&str],
    characteristics: &[&str],
    focus: &[&str],
) -> Region {
    Region {
        id: id.to_string(),
        name: name.to_string(),
        center: Coordinates {
            latitude: lat,
            longitude: lng,
        },
        radius_km: ASSIGNMENT_RADIUS_KM,
        priority_stations: priority.iter().map(|s| s.to_string()).collect(),
        characteristics: characteristics.iter().map(|s| s.to_string()).collect(),
        analysis_focus: focus.iter().map(|s| s.to_string()).collect(),
    }
}

/// The reference deployment's eight regions.
pub fn default_regions() -> Vec<Region> {
    vec![
        region(
            "bukit-timah",
            "Bukit Timah",
            1.3437,
            103.7758,
            &["S116", "S121", "S118"],
            &["residential", "nature reserve", "educational"],
            &["heat_stress", "forest_humidity"],
        ),
        region(
            "central",
            "Central Business District",
            1.2966,
            103.8520,
            &["S109", "S111", "S108"],
            &["urban", "commercial", "high-density"],
            &["urban_heat_island", "commuter_comfort"],
        ),
        region(
            "east",
            "East Coast",
            1.3236,
            103.9273,
            &["S107", "S43", "S24"],
            &["coastal", "residential", "recreational"],
            &["sea_breeze", "outdoor_recreation"],
        ),
        region(
            "north",
            "Woodlands",
            1.4382,
            103.7890,
            &["S104", "S100", "S122"],
            &["residential", "border", "industrial"],
            &["rainfall", "morning_haze"],
        ),
        region(
            "northeast",
            "Punggol & Sengkang",
            1.3984,
            103.9072,
            &["S106", "S81", "S229"],
            &["new town", "waterfront", "residential"],
            &["waterfront_wind", "family_activities"],
        ),
        region(
            "west",
            "Jurong",
            1.3329,
            103.7436,
            &["S44", "S50", "S119"],
            &["industrial", "university", "green spaces"],
            &["industrial_heat", "campus_activities"],
        ),
        region(
            "northwest",
            "Choa Chu Kang & Bukit Panjang",
            1.3800,
            103.7600,
            &["S117", "S112", "S66"],
            &["residential", "hilly", "nature parks"],
            &["thunderstorms", "hiking_conditions"],
        ),
        region(
            "south",
            "Sentosa & HarbourFront",
            1.2494,
            103.8303,
            &["S60", "S71", "S102"],
            &["coastal", "tourism", "island"],
            &["beach_conditions", "tourist_comfort"],
        ),
    ]
}

/// Loads a region table from a JSON array at `path`.
///
/// The file must contain at least one region and every center must sit inside
/// [`SINGAPORE_BOUNDS`].
pub fn load_regions(path: &str) -> Result<Vec<Region>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading region file '{path}'"))?;
    let regions: Vec<Region> =
        serde_json::from_str(&content).with_context(|| format!("parsing region file '{path}'"))?;
    check_regions(&regions)?;
    Ok(regions)
}

fn check_regions(regions: &[Region]) -> Result<()> {
    if regions.is_empty() {
        bail!("region table is empty");
    }
    for r in regions {
        if !SINGAPORE_BOUNDS.contains(r.center.latitude, r.center.longitude) {
            bail!("region '{}' has a center outside the supported bounds", r.id);
        }
        if !(r.radius_km.is_finite() && r.radius_km > 0.0) {
            bail!("region '{}' has a non-positive radius", r.id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_regions_are_valid() {
        let regions = default_regions();
        assert_eq!(regions.len(), 8);
        check_regions(&regions).unwrap();

        let mut ids: Vec<_> = regions.iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn test_bounds_edges_inclusive() {
        assert!(SINGAPORE_BOUNDS.contains(1.16, 103.6));
        assert!(SINGAPORE_BOUNDS.contains(1.48, 104.0));
        assert!(!SINGAPORE_BOUNDS.contains(1.159, 103.8));
        assert!(!SINGAPORE_BOUNDS.contains(1.3, 104.01));
        assert!(!SINGAPORE_BOUNDS.contains(f64::NAN, 103.8));
    }

    #[test]
    fn test_priority_lookup() {
        let regions = default_regions();
        let east = regions.iter().find(|r| r.id == "east").unwrap();
        assert!(east.is_priority_station("S24"));
        assert!(!east.is_priority_station("S60"));
        assert_eq!(east.primary_characteristic(), "coastal");
    }

    #[test]
    fn test_load_regions_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"x","name":"X","center":{{"latitude":1.3,"longitude":103.8}},"priority_stations":["S1"]}}]"#
        )
        .unwrap();

        let regions = load_regions(file.path().to_str().unwrap()).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].radius_km, ASSIGNMENT_RADIUS_KM);
        assert!(regions[0].characteristics.is_empty());
    }

    #[test]
    fn test_load_regions_rejects_out_of_bounds_center() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"x","name":"X","center":{{"latitude":51.5,"longitude":0.1}},"priority_stations":[]}}]"#
        )
        .unwrap();

        assert!(load_regions(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_load_regions_rejects_empty_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        assert!(load_regions(file.path().to_str().unwrap()).is_err());
    }
}
