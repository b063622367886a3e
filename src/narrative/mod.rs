//! Narrative Analyzer.
//!
//! Turns a region's aggregated statistics into prose through an external
//! [`TextGenerator`]. Missing credentials, an exhausted daily budget, a failed
//! call or an empty response all produce the deterministic
//! [`fallback::fallback_analysis`] instead, flagged as such.

pub mod fallback;
pub mod prompt;
pub mod sections;

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::analyzers::types::RegionalData;
use crate::registry::Region;
use crate::services::text_generation::TextGenerator;
use crate::snapshot::WeatherSnapshot;
use crate::usage::{CallPacer, UsageStore};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailedAnalysis {
    pub temperature_analysis: String,
    pub humidity_analysis: String,
    pub activities: String,
    pub health: String,
    pub outlook: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NarrativeAnalysis {
    pub summary: String,
    pub detailed_analysis: DetailedAnalysis,
    pub recommendations: Vec<String>,
    pub health_advisory: String,
}

impl NarrativeAnalysis {
    /// Every prose field joined, for keyword checks.
    pub fn full_text(&self) -> String {
        let d = &self.detailed_analysis;
        [
            self.summary.as_str(),
            d.temperature_analysis.as_str(),
            d.humidity_analysis.as_str(),
            d.activities.as_str(),
            d.health.as_str(),
            d.outlook.as_str(),
            self.health_advisory.as_str(),
        ]
        .into_iter()
        .chain(self.recommendations.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// A narrative and whether it came from the fallback template.
#[derive(Debug, Clone)]
pub struct NarrativeOutcome {
    pub analysis: NarrativeAnalysis,
    pub fallback: bool,
}

impl NarrativeOutcome {
    fn fallback(region: &Region) -> Self {
        NarrativeOutcome {
            analysis: fallback::fallback_analysis(region),
            fallback: true,
        }
    }
}

pub struct NarrativeAnalyzer {
    generator: Option<Arc<dyn TextGenerator>>,
    usage: Arc<UsageStore>,
    pacer: CallPacer,
    force: bool,
}

impl NarrativeAnalyzer {
    pub fn new(
        generator: Option<Arc<dyn TextGenerator>>,
        usage: Arc<UsageStore>,
        pacer: CallPacer,
        force: bool,
    ) -> Self {
        Self {
            generator,
            usage,
            pacer,
            force,
        }
    }

    /// An analyzer that never calls out; every region gets the fallback.
    pub fn offline() -> Self {
        Self::new(None, Arc::new(UsageStore::in_memory(0)), CallPacer::none(), false)
    }

    pub fn usage(&self) -> &UsageStore {
        &self.usage
    }

    pub async fn analyze(
        &self,
        region: &Region,
        data: &RegionalData,
        snapshot: &WeatherSnapshot,
    ) -> NarrativeOutcome {
        let Some(generator) = &self.generator else {
            debug!(region = %region.id, "No text generator configured, using fallback");
            return NarrativeOutcome::fallback(region);
        };

        if !self.usage.try_acquire(self.force) {
            warn!(
                region = %region.id,
                calls = self.usage.calls(),
                "Daily text-generation budget exhausted, using fallback"
            );
            return NarrativeOutcome::fallback(region);
        }

        self.pacer.wait().await;

        let prompt = prompt::build_prompt(region, data, snapshot);
        match generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => NarrativeOutcome {
                analysis: sections::parse_narrative(&text, &region.name),
                fallback: false,
            },
            Ok(_) => {
                warn!(region = %region.id, "Text generation returned empty output, using fallback");
                NarrativeOutcome::fallback(region)
            }
            Err(e) => {
                warn!(region = %region.id, reason = %e, "Text generation failed, using fallback");
                debug!(region = %region.id, detail = ?e, "Text generation failure detail");
                NarrativeOutcome::fallback(region)
            }
        }
    }
}
