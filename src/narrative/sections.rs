//! Narrative section splitter.
//!
//! Generated text is scanned line by line. Header lines (emoji markers or
//! keyword headings) switch the current section; other non-empty lines are
//! appended to it. Bullets under the activities section become
//! recommendations. Nothing here fails: unrecognized text lands in the
//! preamble or in whichever section is active.

use super::{DetailedAnalysis, NarrativeAnalysis};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Preamble,
    Temperature,
    Humidity,
    Activities,
    Health,
    Outlook,
}

const EMOJI_MARKERS: &[(&str, Section)] = &[
    ("🌡", Section::Temperature),
    ("☀", Section::Temperature),
    ("💧", Section::Humidity),
    ("💦", Section::Humidity),
    ("🏃", Section::Activities),
    ("⚽", Section::Activities),
    ("🎯", Section::Activities),
    ("🏥", Section::Health),
    ("⚕", Section::Health),
    ("😷", Section::Health),
    ("🔮", Section::Outlook),
    ("📈", Section::Outlook),
    ("🌤", Section::Outlook),
];

const KEYWORDS: &[(&str, Section)] = &[
    ("temperature", Section::Temperature),
    ("humidity", Section::Humidity),
    ("activit", Section::Activities),
    ("recommend", Section::Activities),
    ("health", Section::Health),
    ("outlook", Section::Outlook),
    ("forecast", Section::Outlook),
];

/// Longest line still considered a keyword heading.
const MAX_HEADING_LEN: usize = 60;

/// Splits generated text into a [`NarrativeAnalysis`].
pub fn parse_narrative(text: &str, region_name: &str) -> NarrativeAnalysis {
    let mut current = Section::Preamble;
    let mut preamble = Vec::new();
    let mut temperature = Vec::new();
    let mut humidity = Vec::new();
    let mut activities = Vec::new();
    let mut health = Vec::new();
    let mut outlook = Vec::new();
    let mut recommendations = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let bullet = strip_bullet(line);
        let content = match bullet {
            Some(item) if current == Section::Activities => {
                if !item.is_empty() {
                    recommendations.push(item.to_string());
                }
                continue;
            }
            Some(item) => item,
            None => match detect_header(line) {
                Some((section, rest)) => {
                    current = section;
                    rest
                }
                None => line,
            },
        };
        if content.is_empty() {
            continue;
        }

        let target = match current {
            Section::Preamble => &mut preamble,
            Section::Temperature => &mut temperature,
            Section::Humidity => &mut humidity,
            Section::Activities => &mut activities,
            Section::Health => &mut health,
            Section::Outlook => &mut outlook,
        };
        target.push(content.to_string());
    }

    let mut activities = activities.join(" ");
    if activities.is_empty() && !recommendations.is_empty() {
        activities = recommendations.join("; ");
    }

    let summary = match preamble.join(" ") {
        s if s.is_empty() => generic_summary(region_name),
        s => s,
    };
    let health = health.join(" ");
    let health_advisory = if health.is_empty() {
        "No specific health advisories for current conditions.".to_string()
    } else {
        health.clone()
    };

    NarrativeAnalysis {
        summary,
        detailed_analysis: DetailedAnalysis {
            temperature_analysis: temperature.join(" "),
            humidity_analysis: humidity.join(" "),
            activities,
            health,
            outlook: outlook.join(" "),
        },
        recommendations,
        health_advisory,
    }
}

pub fn generic_summary(region_name: &str) -> String {
    format!("Current weather conditions in {region_name} are being monitored across local stations.")
}

fn strip_bullet(line: &str) -> Option<&str> {
    for marker in ["- ", "• ", "* ", "– "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest.trim());
        }
    }
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = line[digits..]
            .strip_prefix(". ")
            .or_else(|| line[digits..].strip_prefix(") "))
        {
            return Some(rest.trim());
        }
    }
    None
}

/// Returns the section a header line opens and any content on the same line.
///
/// An emoji line with no keyword heading after the marker is content, not a
/// title, so its text is kept.
pub fn detect_header(line: &str) -> Option<(Section, &str)> {
    let stripped = line.trim_start_matches(['#', '*', ' ']).trim_end_matches(['*', ' ']);

    if let Some((marker, section)) = EMOJI_MARKERS
        .iter()
        .find(|(marker, _)| stripped.starts_with(marker))
    {
        let rest = stripped[marker.len()..]
            .trim_start_matches(['\u{FE0F}', ' '])
            .trim();
        let content = if rest.starts_with(':') || keyword_section(rest).is_some() {
            after_colon(rest)
        } else {
            rest
        };
        return Some((*section, content));
    }

    let decorated = line.starts_with('#') || line.starts_with("**");
    let colon = stripped.find(':');
    let heading_len = colon.unwrap_or(stripped.len());
    if heading_len > MAX_HEADING_LEN || !(decorated || colon.is_some()) {
        return None;
    }

    keyword_section(&stripped[..heading_len]).map(|section| (section, after_colon(stripped)))
}

/// Section named by the first word of `heading`, if it is a known keyword.
fn keyword_section(heading: &str) -> Option<Section> {
    let first = heading.split_whitespace().next()?.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(kw, _)| first.starts_with(kw))
        .map(|(_, section)| *section)
}

fn after_colon(s: &str) -> &str {
    match s.find(':') {
        Some(idx) => s[idx + 1..].trim_start_matches(['*', ' ']).trim(),
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Hot and humid afternoon across the district.

🌡️ Temperature Analysis:
Temperatures peaked at 32.4°C near the coast.

💧 Humidity Analysis:
Humidity at 78% makes it feel warmer.

🏃 Recommended Activities:
- Morning jog along the park connector
- Indoor swimming after 4pm

🏥 Health Considerations:
Stay hydrated.

🔮 Outlook:
Thundery showers likely later.";

    #[test]
    fn test_parses_all_sections() {
        let n = parse_narrative(SAMPLE, "East Coast");
        assert_eq!(n.summary, "Hot and humid afternoon across the district.");
        assert_eq!(
            n.detailed_analysis.temperature_analysis,
            "Temperatures peaked at 32.4°C near the coast."
        );
        assert_eq!(
            n.detailed_analysis.humidity_analysis,
            "Humidity at 78% makes it feel warmer."
        );
        assert_eq!(
            n.recommendations,
            vec!["Morning jog along the park connector", "Indoor swimming after 4pm"]
        );
        assert_eq!(
            n.detailed_analysis.activities,
            "Morning jog along the park connector; Indoor swimming after 4pm"
        );
        assert_eq!(n.detailed_analysis.health, "Stay hydrated.");
        assert_eq!(n.health_advisory, "Stay hydrated.");
        assert_eq!(n.detailed_analysis.outlook, "Thundery showers likely later.");
    }

    #[test]
    fn test_keyword_headings_without_emoji() {
        let text = "## Temperature\nWarm.\n**Humidity:** Sticky at 85%.\nOutlook: clearing by evening";
        let n = parse_narrative(text, "Jurong");
        assert_eq!(n.detailed_analysis.temperature_analysis, "Warm.");
        assert_eq!(n.detailed_analysis.humidity_analysis, "Sticky at 85%.");
        assert_eq!(n.detailed_analysis.outlook, "clearing by evening");
    }

    #[test]
    fn test_emoji_line_without_colon_keeps_text() {
        assert_eq!(
            detect_header("🌡️ 32°C at noon"),
            Some((Section::Temperature, "32°C at noon"))
        );
        assert_eq!(
            detect_header("🏃 Recommended Activities"),
            Some((Section::Activities, ""))
        );
        assert_eq!(
            detect_header("🌡️ Temperature Analysis: 31°C inland"),
            Some((Section::Temperature, "31°C inland"))
        );

        let n = parse_narrative("🌡️ 32°C at noon
💧 Humidity
Muggy.", "Central");
        assert_eq!(n.detailed_analysis.temperature_analysis, "32°C at noon");
        assert_eq!(n.detailed_analysis.humidity_analysis, "Muggy.");
    }

    #[test]
    fn test_sentence_starting_with_keyword_is_not_a_heading() {
        assert!(detect_header("Temperature stayed flat through the morning").is_none());
        assert!(detect_header("The forecast: rain").is_none());
    }

    #[test]
    fn test_malformed_text_never_panics() {
        let n = parse_narrative("", "Woodlands");
        assert_eq!(n.summary, generic_summary("Woodlands"));
        assert!(n.detailed_analysis.temperature_analysis.is_empty());
        assert!(n.recommendations.is_empty());

        let junk = "::::\n- \n#\n**\n🌡️\n1. \n\u{0}\u{1F600}";
        let _ = parse_narrative(junk, "Woodlands");
    }

    #[test]
    fn test_bullets_outside_activities_are_prose() {
        let n = parse_narrative("🏥 Health:\n- Drink water\n- Rest in shade", "Central");
        assert_eq!(n.detailed_analysis.health, "Drink water Rest in shade");
        assert!(n.recommendations.is_empty());
    }

    #[test]
    fn test_numbered_bullets() {
        assert_eq!(strip_bullet("1. Cycle early"), Some("Cycle early"));
        assert_eq!(strip_bullet("12) Walk"), Some("Walk"));
        assert_eq!(strip_bullet("2025 was hot"), None);
    }
}
