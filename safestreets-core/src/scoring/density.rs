//! Building density, footprint coverage and building-type mix

use geo::{GeodesicArea, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};

use super::{DomainOutcome, DomainScorer, clamp_score, percent};
use crate::model::{CoordinateIndex, DataStatus, FeatureCategory, Location, MapWay, ParsedMapData};

const FEATURES: &[FeatureCategory] = &[FeatureCategory::Building];

const RESIDENTIAL: &[&str] = &[
    "residential",
    "house",
    "apartments",
    "detached",
    "semidetached_house",
    "terrace",
    "dormitory",
    "bungalow",
];
const COMMERCIAL: &[&str] = &[
    "commercial",
    "retail",
    "office",
    "supermarket",
    "kiosk",
    "hotel",
];
const CIVIC: &[&str] = &[
    "civic",
    "public",
    "government",
    "school",
    "university",
    "college",
    "kindergarten",
    "hospital",
    "library",
    "church",
    "train_station",
];
const INDUSTRIAL: &[&str] = &["industrial", "warehouse", "factory", "manufacture"];

/// Minimum buildings per km² for a score, checked in order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityBand {
    pub min_per_km2: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityParams {
    pub bands: Vec<DensityBand>,
    /// Score for any non-zero density below the last band
    pub sparse_score: f64,
}

impl Default for DensityParams {
    fn default() -> Self {
        let band = |min_per_km2, score| DensityBand { min_per_km2, score };
        Self {
            bands: vec![
                band(1500.0, 100.0),
                band(1000.0, 85.0),
                band(500.0, 70.0),
                band(200.0, 50.0),
                band(50.0, 30.0),
            ],
            sparse_score: 10.0,
        }
    }
}

impl DensityParams {
    fn score(&self, per_km2: f64) -> f64 {
        if per_km2 <= 0.0 {
            return 0.0;
        }
        self.bands
            .iter()
            .find(|band| per_km2 >= band.min_per_km2)
            .map_or(self.sparse_score, |band| band.score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DensityCategory {
    #[serde(rename = "Dense urban")]
    DenseUrban,
    Urban,
    Suburban,
    #[serde(rename = "Low density")]
    LowDensity,
    Rural,
    Undeveloped,
}

impl DensityCategory {
    fn from_density(per_km2: f64) -> Self {
        if per_km2 >= 1500.0 {
            Self::DenseUrban
        } else if per_km2 >= 500.0 {
            Self::Urban
        } else if per_km2 >= 200.0 {
            Self::Suburban
        } else if per_km2 >= 50.0 {
            Self::LowDensity
        } else if per_km2 > 0.0 {
            Self::Rural
        } else {
            Self::Undeveloped
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildingMix {
    pub residential: usize,
    pub commercial: usize,
    pub civic: usize,
    pub industrial: usize,
    pub other: usize,
}

impl BuildingMix {
    fn add(&mut self, building: &str) {
        let bucket = if RESIDENTIAL.contains(&building) {
            &mut self.residential
        } else if COMMERCIAL.contains(&building) {
            &mut self.commercial
        } else if CIVIC.contains(&building) {
            &mut self.civic
        } else if INDUSTRIAL.contains(&building) {
            &mut self.industrial
        } else {
            &mut self.other
        };
        *bucket += 1;
    }

    /// Number of named (non-`other`) types present
    pub fn type_count(&self) -> usize {
        [self.residential, self.commercial, self.civic, self.industrial]
            .iter()
            .filter(|&&n| n > 0)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingDensity {
    pub building_count: usize,
    pub buildings_per_km2: f64,
    pub footprint_area_m2: f64,
    pub coverage_percent: f64,
    pub mix: BuildingMix,
    pub category: DensityCategory,
    pub score: f64,
    pub status: DataStatus,
    pub findings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl DomainOutcome for BuildingDensity {
    fn score(&self) -> f64 {
        self.score
    }

    fn status(&self) -> &DataStatus {
        &self.status
    }
}

/// Closed outline of a building way, from geometry or resolved member nodes
fn footprint(way: &MapWay, index: &CoordinateIndex) -> Option<Polygon<f64>> {
    let ring: Vec<Point<f64>> = if way.geometry.len() >= 4 {
        way.geometry.iter().copied().collect::<Option<_>>()?
    } else if way.is_closed() && way.nodes.len() >= 4 {
        way.nodes
            .iter()
            .map(|id| index.get(id).copied())
            .collect::<Option<_>>()?
    } else {
        return None;
    };

    if ring.first() != ring.last() {
        return None;
    }
    Some(Polygon::new(LineString::from(ring), Vec::new()))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DensityScorer {
    params: DensityParams,
}

impl DensityScorer {
    pub fn new(params: DensityParams) -> Self {
        Self { params }
    }
}

impl DomainScorer for DensityScorer {
    type Output = BuildingDensity;

    const NAME: &'static str = "building density";

    fn features(&self) -> &'static [FeatureCategory] {
        FEATURES
    }

    #[allow(clippy::cast_precision_loss)]
    fn score(&self, _location: &Location, data: &ParsedMapData) -> BuildingDensity {
        let mut mix = BuildingMix::default();
        let mut building_count = 0;
        let mut footprint_area_m2 = 0.0;

        for element in data.pois.iter().filter(|e| FeatureCategory::Building.matches(e)) {
            building_count += 1;
            mix.add(element.tag("building").unwrap_or("yes"));
            if let Some(way) = element.as_way()
                && let Some(polygon) = footprint(way, &data.nodes)
            {
                footprint_area_m2 += polygon.geodesic_area_unsigned();
            }
        }

        let area_km2 = data.network.area_km2;
        let buildings_per_km2 = if area_km2 > 0.0 {
            building_count as f64 / area_km2
        } else {
            0.0
        };
        let coverage_percent = if area_km2 > 0.0 {
            (footprint_area_m2 / (area_km2 * 1_000_000.0) * 100.0).min(100.0)
        } else {
            0.0
        };
        let score = clamp_score(self.params.score(buildings_per_km2));
        let category = DensityCategory::from_density(buildings_per_km2);

        let mut findings = Vec::new();
        let mut recommendations = Vec::new();
        findings.push(format!(
            "{building_count} buildings mapped ({buildings_per_km2:.0} per km²)"
        ));
        if footprint_area_m2 > 0.0 {
            findings.push(format!(
                "Building footprints cover {coverage_percent:.1}% of the area"
            ));
        }
        if building_count > 0 {
            findings.push(format!(
                "Building mix: {}% residential, {}% commercial, {}% civic",
                percent(mix.residential, building_count).round(),
                percent(mix.commercial, building_count).round(),
                percent(mix.civic, building_count).round()
            ));
            if mix.type_count() < 2 {
                recommendations
                    .push("Encourage mixed-use development to diversify destinations".to_string());
            }
        }
        if matches!(
            category,
            DensityCategory::LowDensity | DensityCategory::Rural | DensityCategory::Undeveloped
        ) {
            recommendations.push("Density is too low to support walkable services".to_string());
        }

        BuildingDensity {
            building_count,
            buildings_per_km2,
            footprint_area_m2,
            coverage_percent,
            mix,
            category,
            score,
            status: DataStatus::Measured,
            findings,
            recommendations,
        }
    }

    fn degraded(&self, reason: &str) -> BuildingDensity {
        BuildingDensity {
            building_count: 0,
            buildings_per_km2: 0.0,
            footprint_area_m2: 0.0,
            coverage_percent: 0.0,
            mix: BuildingMix::default(),
            category: DensityCategory::Undeveloped,
            score: 0.0,
            status: DataStatus::degraded(reason),
            findings: vec![format!("Building data unavailable: {reason}")],
            recommendations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::model::{NetworkGraph, RawMapElement};
    use crate::model::elements::test_support::{node, way};

    fn location() -> Location {
        Location::new(0.0, 0.0).unwrap()
    }

    fn with_area(pois: Vec<RawMapElement>, area_km2: f64) -> ParsedMapData {
        ParsedMapData {
            pois,
            network: NetworkGraph {
                area_km2,
                ..NetworkGraph::default()
            },
            ..ParsedMapData::default()
        }
    }

    #[rstest]
    #[case(2000.0, 100.0)]
    #[case(1500.0, 100.0)]
    #[case(1200.0, 85.0)]
    #[case(500.0, 70.0)]
    #[case(250.0, 50.0)]
    #[case(50.0, 30.0)]
    #[case(10.0, 10.0)]
    #[case(0.0, 0.0)]
    fn density_bands(#[case] per_km2: f64, #[case] expected: f64) {
        assert_eq!(DensityParams::default().score(per_km2), expected);
    }

    #[test]
    fn counts_and_mix() {
        let origin = Point::new(0.0, 0.0);
        let pois = vec![
            node(1, origin, &[("building", "house")]),
            node(2, origin, &[("building", "apartments")]),
            node(3, origin, &[("building", "retail")]),
            node(4, origin, &[("building", "school")]),
            node(5, origin, &[("building", "yes")]),
            node(6, origin, &[("shop", "bakery")]),
        ];
        let result = DensityScorer::default().score(&location(), &with_area(pois, 0.01));

        assert_eq!(result.building_count, 5);
        assert_eq!(result.buildings_per_km2, 500.0);
        assert_eq!(result.score, 70.0);
        assert_eq!(result.category, DensityCategory::Urban);
        assert_eq!(result.mix.residential, 2);
        assert_eq!(result.mix.commercial, 1);
        assert_eq!(result.mix.civic, 1);
        assert_eq!(result.mix.other, 1);
    }

    #[test]
    fn footprint_area_from_closed_way() {
        let index: CoordinateIndex = [
            (1, Point::new(0.0, 0.0)),
            (2, Point::new(0.0001, 0.0)),
            (3, Point::new(0.0001, 0.0001)),
            (4, Point::new(0.0, 0.0001)),
        ]
        .into_iter()
        .collect();
        let mut data = with_area(vec![way(10, &[1, 2, 3, 4, 1], &[("building", "yes")])], 1.0);
        data.nodes = index;
        let result = DensityScorer::default().score(&location(), &data);

        // roughly 11.1 m x 11.1 m at the equator
        assert!(result.footprint_area_m2 > 115.0 && result.footprint_area_m2 < 130.0);
        assert!(result.coverage_percent > 0.0 && result.coverage_percent < 0.02);
    }

    #[test]
    fn no_buildings_is_undeveloped() {
        let result = DensityScorer::default().score(&location(), &with_area(Vec::new(), 8.0));
        assert_eq!(result.score, 0.0);
        assert_eq!(result.category, DensityCategory::Undeveloped);
    }
}
