//! Deterministic narrative used when no generated text is available.
//!
//! The template depends only on the region's name and first characteristic
//! tag, and fills every section the generated narrative would.

use super::{DetailedAnalysis, NarrativeAnalysis};
use crate::registry::Region;

pub fn fallback_analysis(region: &Region) -> NarrativeAnalysis {
    let name = &region.name;
    let tag = region.primary_characteristic();

    NarrativeAnalysis {
        summary: format!(
            "{name} is experiencing typical tropical conditions for a {tag} area."
        ),
        detailed_analysis: DetailedAnalysis {
            temperature_analysis: format!(
                "Temperatures across {name} follow the usual daytime pattern for a {tag} area, with shaded and ventilated spaces staying noticeably cooler."
            ),
            humidity_analysis: format!(
                "Humidity in {name} remains characteristic of the equatorial climate, so it may feel warmer than the air temperature suggests."
            ),
            activities: format!(
                "Outdoor plans in {name} are best scheduled for the early morning or late afternoon."
            ),
            health: format!(
                "Stay hydrated and limit prolonged sun exposure around midday in {tag} surroundings."
            ),
            outlook: format!(
                "Conditions in {name} should stay broadly similar over the next few hours, with a chance of isolated afternoon showers."
            ),
        },
        recommendations: vec![
            format!("Plan outdoor activities in {name} before 10am or after 5pm"),
            "Carry water and take regular breaks in the shade".to_string(),
            "Keep an umbrella handy for sudden showers".to_string(),
        ],
        health_advisory:
            "Drink water regularly and watch for signs of heat exhaustion during outdoor activity."
                .to_string(),
    }
}
