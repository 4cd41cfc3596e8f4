//! Transit access: stop proximity, mode diversity and stop density

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::availability::{DistanceTiers, ServiceAvailability};
use super::{DomainOutcome, DomainScorer, clamp_score};
use crate::model::{DataStatus, FeatureCategory, Location, ParsedMapData, RawMapElement};
use crate::Meters;

const FEATURES: &[FeatureCategory] = &[FeatureCategory::Transit];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransitMode {
    Bus,
    Rail,
    Tram,
    Subway,
    Ferry,
}

impl TransitMode {
    /// Modes served by a stop, inferred from its tags
    pub fn from_element(element: &RawMapElement) -> BTreeSet<TransitMode> {
        let mut modes = BTreeSet::new();
        let yes = |key: &str| element.tag_is(key, "yes");

        if element.tag_is("highway", "bus_stop") || yes("bus") || yes("trolleybus") {
            modes.insert(Self::Bus);
        }
        if element.tag_is("railway", "tram_stop") || yes("tram") {
            modes.insert(Self::Tram);
        }
        let subway_station = element.tag_is("station", "subway");
        if element.tag_is("railway", "subway_entrance") || yes("subway") || subway_station {
            modes.insert(Self::Subway);
        }
        if (matches!(element.tag("railway"), Some("station" | "halt")) && !subway_station)
            || yes("train")
        {
            modes.insert(Self::Rail);
        }
        if element.tag_is("amenity", "ferry_terminal") || yes("ferry") {
            modes.insert(Self::Ferry);
        }

        modes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum TransitFeasibility {
    Excellent,
    Good,
    Fair,
    Limited,
    None,
}

/// Points awarded to a nearest stop no farther than `max_distance_m`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityBand {
    pub max_distance_m: Meters,
    pub points: f64,
}

/// Minimum score and maximum nearest-stop distance for a feasibility level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityRule {
    pub min_score: f64,
    pub max_distance_m: Meters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitParams {
    /// Checked in order, first matching band wins
    pub proximity_bands: Vec<ProximityBand>,
    pub points_per_mode: f64,
    pub max_mode_points: f64,
    /// Radius within which stops count towards density points
    pub walk_radius_m: Meters,
    pub points_per_nearby_stop: f64,
    pub max_density_points: f64,
    pub excellent: FeasibilityRule,
    pub good: FeasibilityRule,
    pub fair: FeasibilityRule,
}

impl Default for TransitParams {
    fn default() -> Self {
        let band = |max_distance_m, points| ProximityBand {
            max_distance_m,
            points,
        };
        let rule = |min_score, max_distance_m| FeasibilityRule {
            min_score,
            max_distance_m,
        };

        Self {
            proximity_bands: vec![
                band(200.0, 50.0),
                band(400.0, 40.0),
                band(600.0, 30.0),
                band(800.0, 20.0),
                band(1200.0, 10.0),
            ],
            points_per_mode: 10.0,
            max_mode_points: 30.0,
            walk_radius_m: 500.0,
            points_per_nearby_stop: 4.0,
            max_density_points: 20.0,
            excellent: rule(80.0, 250.0),
            good: rule(60.0, 500.0),
            fair: rule(40.0, 800.0),
        }
    }
}

impl TransitParams {
    fn proximity_points(&self, nearest: Option<Meters>) -> f64 {
        let Some(distance) = nearest else {
            return 0.0;
        };
        self.proximity_bands
            .iter()
            .find(|band| distance <= band.max_distance_m)
            .map_or(0.0, |band| band.points)
    }

    fn feasibility(&self, score: f64, nearest: Option<Meters>) -> TransitFeasibility {
        let Some(distance) = nearest else {
            return TransitFeasibility::None;
        };
        let meets = |rule: &FeasibilityRule| score >= rule.min_score && distance <= rule.max_distance_m;

        if meets(&self.excellent) {
            TransitFeasibility::Excellent
        } else if meets(&self.good) {
            TransitFeasibility::Good
        } else if meets(&self.fair) {
            TransitFeasibility::Fair
        } else {
            TransitFeasibility::Limited
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitAccess {
    pub stops: ServiceAvailability,
    pub stops_within_walk: usize,
    pub modes: Vec<TransitMode>,
    pub proximity_points: f64,
    pub mode_points: f64,
    pub density_points: f64,
    pub score: f64,
    pub feasibility: TransitFeasibility,
    pub status: DataStatus,
    pub findings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl DomainOutcome for TransitAccess {
    fn score(&self) -> f64 {
        self.score
    }

    fn status(&self) -> &DataStatus {
        &self.status
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitScorer {
    tiers: DistanceTiers,
    params: TransitParams,
}

impl TransitScorer {
    pub fn new(tiers: DistanceTiers, params: TransitParams) -> Self {
        Self { tiers, params }
    }
}

impl DomainScorer for TransitScorer {
    type Output = TransitAccess;

    const NAME: &'static str = "transit";

    fn features(&self) -> &'static [FeatureCategory] {
        FEATURES
    }

    #[allow(clippy::cast_precision_loss)]
    fn score(&self, location: &Location, data: &ParsedMapData) -> TransitAccess {
        let origin = location.point();
        let params = &self.params;

        let mut distances = Vec::new();
        let mut modes = BTreeSet::new();
        for element in data.pois.iter().filter(|e| FeatureCategory::Transit.matches(e)) {
            if let Some(distance) = element.distance_from(origin, &data.nodes) {
                distances.push(distance);
                modes.extend(TransitMode::from_element(element));
            }
        }

        let nearest = distances.iter().copied().reduce(f64::min);
        let stops = match nearest {
            Some(nearest_distance) => ServiceAvailability {
                available: true,
                count: distances.len(),
                nearest_distance,
                score: self.tiers.score(nearest_distance),
            },
            None => ServiceAvailability::none(),
        };
        let stops_within_walk = distances
            .iter()
            .filter(|&&d| d <= params.walk_radius_m)
            .count();

        let proximity_points = params.proximity_points(nearest);
        let mode_points = (modes.len() as f64 * params.points_per_mode).min(params.max_mode_points);
        let density_points = (stops_within_walk as f64 * params.points_per_nearby_stop)
            .min(params.max_density_points);
        let score = clamp_score(proximity_points + mode_points + density_points);
        let feasibility = params.feasibility(score, nearest);
        let modes: Vec<TransitMode> = modes.into_iter().collect();

        let mut findings = Vec::new();
        let mut recommendations = Vec::new();
        match nearest {
            Some(distance) => {
                findings.push(format!(
                    "{} transit stops in the area, nearest {distance:.0} m away",
                    stops.count
                ));
                findings.push(format!(
                    "{stops_within_walk} stops within {:.0} m",
                    params.walk_radius_m
                ));
                if distance > params.fair.max_distance_m {
                    recommendations
                        .push("Add a stop closer to this location to shorten the walk".to_string());
                }
            }
            None => {
                findings.push("No transit stops found within the analysis area".to_string());
                recommendations.push("Introduce bus or shuttle service to the area".to_string());
            }
        }
        if !modes.is_empty() {
            findings.push(format!("Modes served: {modes:?}"));
        }
        if modes.len() == 1 {
            recommendations.push("Connect the area to an additional transit mode".to_string());
        }

        TransitAccess {
            stops,
            stops_within_walk,
            modes,
            proximity_points,
            mode_points,
            density_points,
            score,
            feasibility,
            status: DataStatus::Measured,
            findings,
            recommendations,
        }
    }

    fn degraded(&self, reason: &str) -> TransitAccess {
        TransitAccess {
            stops: ServiceAvailability::none(),
            stops_within_walk: 0,
            modes: Vec::new(),
            proximity_points: 0.0,
            mode_points: 0.0,
            density_points: 0.0,
            score: 0.0,
            feasibility: TransitFeasibility::None,
            status: DataStatus::degraded(reason),
            findings: vec![format!("Transit data unavailable: {reason}")],
            recommendations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::geometry::destination;
    use crate::model::elements::test_support::node;

    fn location() -> Location {
        Location::new(51.5, -0.12).unwrap()
    }

    fn stop(id: i64, distance: f64, pairs: &[(&str, &str)]) -> RawMapElement {
        node(id, destination(location().point(), 120.0, distance), pairs)
    }

    fn score(pois: Vec<RawMapElement>) -> TransitAccess {
        let data = ParsedMapData {
            pois,
            ..ParsedMapData::default()
        };
        TransitScorer::default().score(&location(), &data)
    }

    #[rstest]
    #[case(150.0, 50.0)]
    #[case(200.0, 50.0)]
    #[case(350.0, 40.0)]
    #[case(550.0, 30.0)]
    #[case(700.0, 20.0)]
    #[case(1100.0, 10.0)]
    #[case(1300.0, 0.0)]
    fn proximity_bands(#[case] distance: f64, #[case] expected: f64) {
        assert_eq!(TransitParams::default().proximity_points(Some(distance)), expected);
    }

    #[test]
    fn modes_are_inferred_from_tags() {
        let station = node(
            1,
            location().point(),
            &[("railway", "station"), ("train", "yes"), ("subway", "yes")],
        );
        let modes = TransitMode::from_element(&station);
        assert_eq!(
            modes.into_iter().collect::<Vec<_>>(),
            vec![TransitMode::Rail, TransitMode::Subway]
        );

        let metro = node(2, location().point(), &[("railway", "station"), ("station", "subway")]);
        assert!(!TransitMode::from_element(&metro).contains(&TransitMode::Rail));
    }

    #[test]
    fn dense_multimodal_area_is_excellent() {
        let result = score(vec![
            stop(1, 120.0, &[("highway", "bus_stop")]),
            stop(2, 220.0, &[("railway", "tram_stop")]),
            stop(3, 300.0, &[("railway", "station")]),
            stop(4, 400.0, &[("highway", "bus_stop")]),
            stop(5, 450.0, &[("highway", "bus_stop")]),
        ]);

        assert_eq!(result.proximity_points, 50.0);
        assert_eq!(result.mode_points, 30.0);
        assert_eq!(result.density_points, 20.0);
        assert_eq!(result.score, 100.0);
        assert_eq!(result.feasibility, TransitFeasibility::Excellent);
    }

    #[test]
    fn high_score_but_distant_stop_is_capped() {
        let params = TransitParams::default();
        assert_eq!(params.feasibility(90.0, Some(300.0)), TransitFeasibility::Good);
        assert_eq!(params.feasibility(90.0, Some(700.0)), TransitFeasibility::Fair);
        assert_eq!(params.feasibility(90.0, Some(900.0)), TransitFeasibility::Limited);
        assert_eq!(params.feasibility(30.0, Some(100.0)), TransitFeasibility::Limited);
    }

    #[test]
    fn single_distant_bus_stop() {
        let result = score(vec![stop(1, 1000.0, &[("highway", "bus_stop")])]);

        assert_eq!(result.stops.count, 1);
        assert_eq!(result.stops_within_walk, 0);
        assert_eq!(result.score, 10.0 + 10.0);
        assert_eq!(result.feasibility, TransitFeasibility::Limited);
    }

    #[test]
    fn no_stops() {
        let result = score(vec![stop(1, 100.0, &[("shop", "bakery")])]);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.feasibility, TransitFeasibility::None);
        assert_eq!(result.stops.nearest_distance, -1.0);
        assert_eq!(result.status, DataStatus::Measured);
    }
}
