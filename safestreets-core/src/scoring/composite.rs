//! Weighted blend of the domain scores and external safety data into one
//! grade.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{DomainOutcome, DomainResults, clamp_score};

/// Six domains, demographics and crash history
pub const EXPECTED_SOURCES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeWeights {
    pub fifteen_minute: f64,
    pub transit: f64,
    pub lighting: f64,
    pub accessibility: f64,
    pub density: f64,
    pub economy: f64,
    pub traffic_safety: f64,
    /// Traffic-safety points lost per pedestrian crash per year
    pub crash_penalty: f64,
    /// Additional points lost per fatal crash per year
    pub fatal_penalty: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            fifteen_minute: 0.25,
            transit: 0.15,
            lighting: 0.15,
            accessibility: 0.15,
            density: 0.10,
            economy: 0.10,
            traffic_safety: 0.10,
            crash_penalty: 10.0,
            fatal_penalty: 25.0,
        }
    }
}

/// Census-style context for the location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    /// Residents per km²
    pub population_density: Option<f64>,
    pub median_age: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Pedestrian crash record for the surrounding area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashHistory {
    pub pedestrian_crashes: u32,
    #[serde(default)]
    pub fatal_crashes: u32,
    /// Years covered by the record
    pub years: f64,
}

impl CrashHistory {
    /// `None` when the record covers no time
    fn safety_score(&self, weights: &CompositeWeights) -> Option<f64> {
        if !(self.years.is_finite() && self.years > 0.0) {
            return None;
        }
        let crashes = f64::from(self.pedestrian_crashes) / self.years;
        let fatal = f64::from(self.fatal_crashes) / self.years;
        Some(clamp_score(
            100.0 - weights.crash_penalty * crashes - weights.fatal_penalty * fatal,
        ))
    }
}

/// Data from outside the map service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalInputs {
    pub demographics: Option<Demographics>,
    pub crash_history: Option<CrashHistory>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::A
        } else if score >= 80.0 {
            Self::B
        } else if score >= 70.0 {
            Self::C
        } else if score >= 60.0 {
            Self::D
        } else {
            Self::F
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentScore {
    pub name: &'static str,
    pub score: f64,
    /// Configured weight, before renormalization
    pub weight: f64,
    pub included: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeScore {
    pub score: f64,
    pub grade: Grade,
    pub components: Vec<ComponentScore>,
    /// Share of expected sources that delivered data, in percent
    pub confidence: f64,
    pub degraded_sources: Vec<&'static str>,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompositeAggregator {
    weights: CompositeWeights,
}

impl CompositeAggregator {
    pub fn new(weights: CompositeWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &CompositeWeights {
        &self.weights
    }

    /// Blends the domain results. Never fails; degraded or missing inputs
    /// are excluded and the remaining weights renormalized.
    #[allow(clippy::cast_precision_loss)]
    pub fn aggregate(&self, results: &DomainResults, external: &ExternalInputs) -> CompositeScore {
        let w = &self.weights;
        let mut components = Vec::with_capacity(7);
        let mut degraded_sources = Vec::new();

        let mut domain = |name: &'static str, outcome: &dyn DomainOutcome, weight: f64| {
            let included = !outcome.status().is_degraded();
            if !included {
                degraded_sources.push(name);
            }
            components.push(ComponentScore {
                name,
                score: clamp_score(outcome.score()),
                weight,
                included,
            });
        };
        domain("15-minute city", &results.fifteen_minute_city, w.fifteen_minute);
        domain("transit access", &results.transit_access, w.transit);
        domain("street lighting", &results.street_lighting, w.lighting);
        domain("accessibility", &results.accessibility, w.accessibility);
        domain("building density", &results.building_density, w.density);
        domain("local economy", &results.local_economy, w.economy);

        let safety = external
            .crash_history
            .as_ref()
            .and_then(|history| history.safety_score(w));
        if safety.is_none() {
            degraded_sources.push("crash history");
        }
        components.push(ComponentScore {
            name: "traffic safety",
            score: safety.unwrap_or(0.0),
            weight: w.traffic_safety,
            included: safety.is_some(),
        });

        if external.demographics.is_none() {
            degraded_sources.push("demographics");
        }

        let included: Vec<&ComponentScore> = components.iter().filter(|c| c.included).collect();
        let total_weight: f64 = included.iter().map(|c| c.weight).sum();
        let score = if total_weight > 0.0 {
            clamp_score(included.iter().map(|c| c.score * c.weight).sum::<f64>() / total_weight)
        } else {
            0.0
        };
        let grade = Grade::from_score(score);
        let confidence =
            (EXPECTED_SOURCES - degraded_sources.len()) as f64 / EXPECTED_SOURCES as f64 * 100.0;

        let summary = summarize(score, grade, &included, &degraded_sources);

        CompositeScore {
            score,
            grade,
            components,
            confidence,
            degraded_sources,
            summary,
        }
    }
}

fn summarize(
    score: f64,
    grade: Grade,
    included: &[&ComponentScore],
    degraded: &[&'static str],
) -> String {
    let by_score = |a: &&&ComponentScore, b: &&&ComponentScore| {
        a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal)
    };

    let mut summary = format!("Grade {grade:?} ({score:.0}/100).");
    if let (Some(best), Some(worst)) = (
        included.iter().max_by(by_score),
        included.iter().min_by(by_score),
    ) {
        summary.push_str(&format!(
            " Strongest: {} ({:.0}). Weakest: {} ({:.0}).",
            best.name, best.score, worst.name, worst.score
        ));
    } else {
        summary.push_str(" No data sources were available.");
    }
    if !degraded.is_empty() {
        summary.push_str(&format!(" Missing data: {}.", degraded.join(", ")));
    }
    summary
}
