//! Street lighting coverage, lamp density, dark spots and night safety

use std::cmp::Ordering;

use geo::Point;
use serde::{Deserialize, Serialize};

use super::{DomainOutcome, DomainScorer, clamp_score, percent};
use crate::model::{
    DataStatus, FeatureCategory, Location, MAIN_STREET_CLASSES, ParsedMapData, RawMapElement,
};
use crate::{Meters, OsmId};

const FEATURES: &[FeatureCategory] = &[
    FeatureCategory::Street,
    FeatureCategory::StreetLamp,
    FeatureCategory::Sidewalk,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Unlit main-street stretch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DarkSpot {
    pub way_id: OsmId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub highway: String,
    pub length_m: Meters,
    pub severity: Severity,
    /// Marker position, the way's midpoint
    pub position: Option<Point<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingParams {
    /// Score points per lamp per street kilometer
    pub density_weight: f64,
    /// Unlit main streets shorter than this are ignored
    pub dark_spot_min_length_m: Meters,
    pub high_severity_m: Meters,
    pub medium_severity_m: Meters,
    pub night_coverage_weight: f64,
    pub night_density_weight: f64,
    pub night_max_density_points: f64,
    pub night_sidewalk_points: f64,
    pub night_dark_spot_penalty: f64,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            density_weight: 5.0,
            dark_spot_min_length_m: 50.0,
            high_severity_m: 200.0,
            medium_severity_m: 100.0,
            night_coverage_weight: 0.5,
            night_density_weight: 3.0,
            night_max_density_points: 30.0,
            night_sidewalk_points: 20.0,
            night_dark_spot_penalty: 2.0,
        }
    }
}

impl LightingParams {
    fn severity(&self, length_m: Meters) -> Severity {
        if length_m > self.high_severity_m {
            Severity::High
        } else if length_m > self.medium_severity_m {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetLighting {
    pub total_streets: usize,
    pub lit_streets: usize,
    pub coverage_percent: f64,
    pub lamp_count: usize,
    /// Lamps per street kilometer
    pub lamp_density: f64,
    pub lit_sidewalk_percent: f64,
    pub score: f64,
    pub night_safety_score: f64,
    pub dark_spots: Vec<DarkSpot>,
    pub status: DataStatus,
    pub findings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl DomainOutcome for StreetLighting {
    fn score(&self) -> f64 {
        self.score
    }

    fn status(&self) -> &DataStatus {
        &self.status
    }
}

/// `lit=yes`, any `lit:by`, or `lighting=yes`
pub fn is_lit(element: &RawMapElement) -> bool {
    element.tag_is("lit", "yes") || element.has_tag("lit:by") || element.tag_is("lighting", "yes")
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LightingScorer {
    params: LightingParams,
}

impl LightingScorer {
    pub fn new(params: LightingParams) -> Self {
        Self { params }
    }

    fn dark_spots(&self, data: &ParsedMapData) -> Vec<DarkSpot> {
        let mut spots: Vec<DarkSpot> = data
            .streets
            .iter()
            .filter(|street| !is_lit(street))
            .filter_map(|street| {
                let way = street.as_way()?;
                let highway = street.tag("highway")?;
                if !MAIN_STREET_CLASSES.contains(&highway) {
                    return None;
                }
                let length_m = way.length(&data.nodes);
                (length_m > self.params.dark_spot_min_length_m).then(|| DarkSpot {
                    way_id: way.id,
                    name: street.name().map(str::to_string),
                    highway: highway.to_string(),
                    length_m,
                    severity: self.params.severity(length_m),
                    position: way.midpoint(&data.nodes),
                })
            })
            .collect();

        spots.sort_by(|a, b| {
            b.length_m
                .partial_cmp(&a.length_m)
                .unwrap_or(Ordering::Equal)
                .then(a.way_id.cmp(&b.way_id))
        });
        spots
    }
}

impl DomainScorer for LightingScorer {
    type Output = StreetLighting;

    const NAME: &'static str = "street lighting";

    fn features(&self) -> &'static [FeatureCategory] {
        FEATURES
    }

    #[allow(clippy::cast_precision_loss)]
    fn score(&self, _location: &Location, data: &ParsedMapData) -> StreetLighting {
        let params = &self.params;

        let total_streets = data.streets.len();
        let lit_streets = data.streets.iter().filter(|s| is_lit(s)).count();
        let coverage_percent = percent(lit_streets, total_streets);

        let lamp_count = data
            .pois
            .iter()
            .filter(|e| FeatureCategory::StreetLamp.matches(e))
            .count();
        let street_km = data.network.total_length_km;
        let lamp_density = if street_km > 0.0 {
            lamp_count as f64 / street_km
        } else {
            0.0
        };

        let lit_sidewalks = data.sidewalks.iter().filter(|s| is_lit(s)).count();
        let lit_sidewalk_percent = percent(lit_sidewalks, data.sidewalks.len());

        let dark_spots = self.dark_spots(data);

        let score = clamp_score(coverage_percent + lamp_density * params.density_weight);
        let night_safety_score = clamp_score(
            (coverage_percent * params.night_coverage_weight).min(50.0)
                + (lamp_density * params.night_density_weight).min(params.night_max_density_points)
                + lit_sidewalk_percent / 100.0 * params.night_sidewalk_points
                - dark_spots.len() as f64 * params.night_dark_spot_penalty,
        );

        let mut findings = Vec::new();
        let mut recommendations = Vec::new();
        if total_streets == 0 {
            findings.push("No streets found within the analysis area".to_string());
        } else {
            findings.push(format!(
                "{lit_streets} of {total_streets} streets are tagged as lit ({coverage_percent:.0}%)"
            ));
        }
        findings.push(format!(
            "{lamp_count} street lamps mapped ({lamp_density:.1} per street km)"
        ));

        let high = dark_spots
            .iter()
            .filter(|spot| spot.severity == Severity::High)
            .count();
        if !dark_spots.is_empty() {
            findings.push(format!(
                "{} unlit main-street stretches, {high} of them longer than {:.0} m",
                dark_spots.len(),
                params.high_severity_m
            ));
            recommendations.push("Install lighting along unlit main streets".to_string());
        }
        if total_streets > 0 && coverage_percent < 50.0 {
            recommendations
                .push("Survey and improve lighting on residential streets".to_string());
        }
        if !data.sidewalks.is_empty() && lit_sidewalk_percent < 50.0 {
            recommendations.push("Add pedestrian-scale lighting on sidewalks".to_string());
        }

        StreetLighting {
            total_streets,
            lit_streets,
            coverage_percent,
            lamp_count,
            lamp_density,
            lit_sidewalk_percent,
            score,
            night_safety_score,
            dark_spots,
            status: DataStatus::Measured,
            findings,
            recommendations,
        }
    }

    fn degraded(&self, reason: &str) -> StreetLighting {
        StreetLighting {
            total_streets: 0,
            lit_streets: 0,
            coverage_percent: 0.0,
            lamp_count: 0,
            lamp_density: 0.0,
            lit_sidewalk_percent: 0.0,
            score: 0.0,
            night_safety_score: 0.0,
            dark_spots: Vec::new(),
            status: DataStatus::degraded(reason),
            findings: vec![format!("Lighting data unavailable: {reason}")],
            recommendations: Vec::new(),
        }
    }
}
