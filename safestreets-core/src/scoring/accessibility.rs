//! ADA accessibility: curb ramps, tactile paving, sidewalk surfaces,
//! wheelchair-friendly venues and stairs.

use serde::{Deserialize, Serialize};

use super::{DomainOutcome, DomainScorer, clamp_score, percent};
use crate::model::{DataStatus, FeatureCategory, Location, ParsedMapData, RawMapElement};

const FEATURES: &[FeatureCategory] = &[
    FeatureCategory::Crossing,
    FeatureCategory::Sidewalk,
    FeatureCategory::Accessibility,
    FeatureCategory::Steps,
];

const RAMP_KERBS: &[&str] = &["lowered", "flush"];
const SLOPED_CURBS: &[&str] = &["yes", "both", "left", "right"];
const SMOOTH_SURFACES: &[&str] = &[
    "asphalt",
    "concrete",
    "concrete:plates",
    "paved",
    "paving_stones",
];
const ROUGH_SMOOTHNESS: &[&str] = &["bad", "very_bad", "horrible", "very_horrible", "impassable"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessibilityWeights {
    pub curb_ramps: f64,
    pub tactile_paving: f64,
    pub smooth_surfaces: f64,
    pub wheelchair_access: f64,
    pub penalty_per_staircase: f64,
    pub max_staircase_penalty: f64,
}

impl Default for AccessibilityWeights {
    fn default() -> Self {
        Self {
            curb_ramps: 0.35,
            tactile_paving: 0.20,
            smooth_surfaces: 0.25,
            wheelchair_access: 0.20,
            penalty_per_staircase: 2.0,
            max_staircase_penalty: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessibilityRating {
    Excellent,
    Good,
    Fair,
    Poor,
    #[serde(rename = "Insufficient data")]
    InsufficientData,
}

impl AccessibilityRating {
    fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 60.0 {
            Self::Good
        } else if score >= 40.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaAccessibility {
    pub crossing_count: usize,
    pub curb_ramp_count: usize,
    pub tactile_paving_count: usize,
    pub sidewalk_count: usize,
    pub smooth_sidewalk_count: usize,
    pub wheelchair_tagged_pois: usize,
    /// `yes`/`designated` count fully, `limited` counts half
    pub wheelchair_accessible_pois: f64,
    pub steps_count: usize,
    pub curb_ramp_percent: f64,
    pub tactile_paving_percent: f64,
    pub smooth_surface_percent: f64,
    pub wheelchair_percent: f64,
    pub score: f64,
    pub rating: AccessibilityRating,
    pub status: DataStatus,
    pub findings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl DomainOutcome for AdaAccessibility {
    fn score(&self) -> f64 {
        self.score
    }

    fn status(&self) -> &DataStatus {
        &self.status
    }
}

fn has_curb_ramp(element: &RawMapElement) -> bool {
    element.tag("kerb").is_some_and(|v| RAMP_KERBS.contains(&v))
        || element
            .tag("sloped_curb")
            .is_some_and(|v| SLOPED_CURBS.contains(&v))
}

fn has_smooth_surface(element: &RawMapElement) -> bool {
    element
        .tag("surface")
        .is_some_and(|v| SMOOTH_SURFACES.contains(&v))
        && !element
            .tag("smoothness")
            .is_some_and(|v| ROUGH_SMOOTHNESS.contains(&v))
}

fn wheelchair_value(element: &RawMapElement) -> Option<f64> {
    match element.tag("wheelchair")? {
        "yes" | "designated" => Some(1.0),
        "limited" => Some(0.5),
        _ => Some(0.0),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccessibilityScorer {
    weights: AccessibilityWeights,
}

impl AccessibilityScorer {
    pub fn new(weights: AccessibilityWeights) -> Self {
        Self { weights }
    }
}

impl DomainScorer for AccessibilityScorer {
    type Output = AdaAccessibility;

    const NAME: &'static str = "accessibility";

    fn features(&self) -> &'static [FeatureCategory] {
        FEATURES
    }

    #[allow(clippy::cast_precision_loss)]
    fn score(&self, _location: &Location, data: &ParsedMapData) -> AdaAccessibility {
        let weights = &self.weights;

        let crossing_count = data.crossings.len();
        let curb_ramp_count = data.crossings.iter().filter(|e| has_curb_ramp(e)).count();
        let tactile_paving_count = data
            .crossings
            .iter()
            .filter(|e| e.tag_is("tactile_paving", "yes"))
            .count();

        let sidewalk_count = data.sidewalks.len();
        let smooth_sidewalk_count = data
            .sidewalks
            .iter()
            .filter(|e| has_smooth_surface(e))
            .count();

        let wheelchair: Vec<f64> = data.pois.iter().filter_map(wheelchair_value).collect();
        let wheelchair_tagged_pois = wheelchair.len();
        let wheelchair_accessible_pois: f64 = wheelchair.iter().sum();

        let steps_count = data
            .pois
            .iter()
            .filter(|e| FeatureCategory::Steps.matches(e))
            .count();

        let curb_ramp_percent = percent(curb_ramp_count, crossing_count);
        let tactile_paving_percent = percent(tactile_paving_count, crossing_count);
        let smooth_surface_percent = percent(smooth_sidewalk_count, sidewalk_count);
        let wheelchair_percent = if wheelchair_tagged_pois == 0 {
            0.0
        } else {
            wheelchair_accessible_pois / wheelchair_tagged_pois as f64 * 100.0
        };

        let insufficient = crossing_count == 0 && sidewalk_count == 0 && wheelchair_tagged_pois == 0;
        let staircase_penalty = (steps_count as f64 * weights.penalty_per_staircase)
            .min(weights.max_staircase_penalty);
        let score = if insufficient {
            0.0
        } else {
            clamp_score(
                curb_ramp_percent * weights.curb_ramps
                    + tactile_paving_percent * weights.tactile_paving
                    + smooth_surface_percent * weights.smooth_surfaces
                    + wheelchair_percent * weights.wheelchair_access
                    - staircase_penalty,
            )
        };
        let rating = if insufficient {
            AccessibilityRating::InsufficientData
        } else {
            AccessibilityRating::from_score(score)
        };

        let mut findings = Vec::new();
        let mut recommendations = Vec::new();
        if insufficient {
            findings.push(
                "No crossings, sidewalks or wheelchair-tagged places are mapped nearby".to_string(),
            );
            recommendations.push("Audit and map pedestrian infrastructure in the area".to_string());
        } else {
            if crossing_count > 0 {
                findings.push(format!(
                    "{curb_ramp_count} of {crossing_count} crossings have curb ramps ({curb_ramp_percent:.0}%)"
                ));
                findings.push(format!(
                    "{tactile_paving_count} crossings have tactile paving ({tactile_paving_percent:.0}%)"
                ));
            }
            if sidewalk_count > 0 {
                findings.push(format!(
                    "{smooth_surface_percent:.0}% of sidewalks have a smooth surface"
                ));
            }
            if wheelchair_tagged_pois > 0 {
                findings.push(format!(
                    "{wheelchair_percent:.0}% of {wheelchair_tagged_pois} wheelchair-tagged places are accessible"
                ));
            }
            if crossing_count > 0 && curb_ramp_percent < 75.0 {
                recommendations.push("Install curb ramps at crossings that lack them".to_string());
            }
            if crossing_count > 0 && tactile_paving_percent < 50.0 {
                recommendations.push("Add tactile paving at crossings".to_string());
            }
            if sidewalk_count > 0 && smooth_surface_percent < 70.0 {
                recommendations.push("Resurface rough or unpaved sidewalks".to_string());
            }
        }
        if steps_count > 0 {
            findings.push(format!("{steps_count} staircases on pedestrian routes"));
            recommendations.push("Provide ramps or elevators next to staircases".to_string());
        }

        AdaAccessibility {
            crossing_count,
            curb_ramp_count,
            tactile_paving_count,
            sidewalk_count,
            smooth_sidewalk_count,
            wheelchair_tagged_pois,
            wheelchair_accessible_pois,
            steps_count,
            curb_ramp_percent,
            tactile_paving_percent,
            smooth_surface_percent,
            wheelchair_percent,
            score,
            rating,
            status: DataStatus::Measured,
            findings,
            recommendations,
        }
    }

    fn degraded(&self, reason: &str) -> AdaAccessibility {
        AdaAccessibility {
            crossing_count: 0,
            curb_ramp_count: 0,
            tactile_paving_count: 0,
            sidewalk_count: 0,
            smooth_sidewalk_count: 0,
            wheelchair_tagged_pois: 0,
            wheelchair_accessible_pois: 0.0,
            steps_count: 0,
            curb_ramp_percent: 0.0,
            tactile_paving_percent: 0.0,
            smooth_surface_percent: 0.0,
            wheelchair_percent: 0.0,
            score: 0.0,
            rating: AccessibilityRating::InsufficientData,
            status: DataStatus::degraded(reason),
            findings: vec![format!("Accessibility data unavailable: {reason}")],
            recommendations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::model::elements::test_support::{node, way};

    fn location() -> Location {
        Location::new(0.0, 0.0).unwrap()
    }

    fn p() -> Point<f64> {
        Point::new(0.0, 0.0)
    }

    #[test]
    fn weighted_components() {
        let data = ParsedMapData {
            crossings: vec![
                node(1, p(), &[("highway", "crossing"), ("kerb", "lowered"), ("tactile_paving", "yes")]),
                node(2, p(), &[("highway", "crossing"), ("sloped_curb", "both")]),
                node(3, p(), &[("highway", "crossing"), ("kerb", "raised")]),
                node(4, p(), &[("highway", "crossing")]),
            ],
            sidewalks: vec![
                way(10, &[], &[("footway", "sidewalk"), ("surface", "asphalt")]),
                way(11, &[], &[("footway", "sidewalk"), ("surface", "asphalt"), ("smoothness", "bad")]),
            ],
            pois: vec![
                node(20, p(), &[("amenity", "cafe"), ("wheelchair", "yes")]),
                node(21, p(), &[("amenity", "bank"), ("wheelchair", "limited")]),
                node(22, p(), &[("amenity", "pub"), ("wheelchair", "no")]),
                node(23, p(), &[("shop", "bakery"), ("wheelchair", "designated")]),
                way(30, &[], &[("highway", "steps")]),
            ],
            ..ParsedMapData::default()
        };
        let result = AccessibilityScorer::default().score(&location(), &data);

        assert_eq!(result.curb_ramp_count, 2);
        assert_eq!(result.curb_ramp_percent, 50.0);
        assert_eq!(result.tactile_paving_percent, 25.0);
        assert_eq!(result.smooth_surface_percent, 50.0);
        assert_eq!(result.wheelchair_percent, 62.5);
        assert_eq!(result.steps_count, 1);

        let expected = 50.0 * 0.35 + 25.0 * 0.20 + 50.0 * 0.25 + 62.5 * 0.20 - 2.0;
        assert!((result.score - expected).abs() < 1e-9);
        assert_eq!(result.rating, AccessibilityRating::Fair);
    }

    #[test]
    fn staircase_penalty_is_capped() {
        let mut pois: Vec<RawMapElement> = (0..8)
            .map(|i| way(i, &[], &[("highway", "steps")]))
            .collect();
        pois.push(node(100, p(), &[("wheelchair", "yes")]));
        let data = ParsedMapData {
            pois,
            ..ParsedMapData::default()
        };
        let result = AccessibilityScorer::default().score(&location(), &data);
        assert!((result.score - (100.0 * 0.20 - 10.0)).abs() < 1e-9);
    }

    #[test]
    fn nothing_mapped_is_insufficient_data() {
        let result = AccessibilityScorer::default().score(&location(), &ParsedMapData::default());
        assert_eq!(result.rating, AccessibilityRating::InsufficientData);
        assert_eq!(result.score, 0.0);
        assert_eq!(
            serde_json::to_value(result.rating).unwrap(),
            serde_json::json!("Insufficient data")
        );
    }
}
