use crate::analyzers::types::RegionalData;
use crate::registry::Region;
use crate::snapshot::{MeasurementType, WeatherSnapshot};

fn fmt_opt(v: Option<f64>, decimals: usize, unit: &str) -> String {
    match v {
        Some(v) => format!("{v:.decimals$}{unit}"),
        None => "no data".to_string(),
    }
}

/// Builds the text-generation prompt for one region.
///
/// Temperatures use one decimal, humidity is rounded to an integer, rainfall
/// uses one decimal. The requested headers match what
/// [`super::sections::parse_narrative`] recognizes.
pub fn build_prompt(region: &Region, data: &RegionalData, snapshot: &WeatherSnapshot) -> String {
    let temp = data.summary(MeasurementType::Temperature);
    let humidity = data.average(MeasurementType::Humidity);
    let rain = data.average(MeasurementType::Rainfall);
    let wind = data.average(MeasurementType::WindSpeed);

    let temp_line = match temp.and_then(|t| t.average.zip(t.min).zip(t.max)) {
        Some(((avg, min), max)) => format!("{avg:.1}°C (range {min:.1}–{max:.1}°C)"),
        None => "no data".to_string(),
    };

    format!(
        "You are a weather analyst for Singapore. Write a concise analysis for the {name} region.\n\
         \n\
         Region characteristics: {characteristics}\n\
         Analysis focus: {focus}\n\
         Observation time: {timestamp}\n\
         \n\
         Current conditions from {stations} stations:\n\
         - Temperature: {temp_line}\n\
         - Humidity: {humidity}\n\
         - Rainfall: {rain} average, {active} stations reporting rain\n\
         - Wind speed: {wind}\n\
         \n\
         Start with a one-sentence summary, then use exactly these headers:\n\
         🌡️ Temperature Analysis:\n\
         💧 Humidity Analysis:\n\
         🏃 Recommended Activities: (as a bulleted list)\n\
         🏥 Health Considerations:\n\
         🔮 Outlook:\n",
        name = region.name,
        characteristics = region.characteristics.join(", "),
        focus = region.analysis_focus.join(", "),
        timestamp = snapshot.timestamp.to_rfc3339(),
        stations = data.station_ids.len(),
        humidity = fmt_opt(humidity.map(f64::round), 0, "%"),
        rain = fmt_opt(rain, 1, "mm"),
        active = data.rainfall_active(),
        wind = fmt_opt(wind, 1, " km/h"),
    )
}
