//! 15-minute city access: can daily needs be reached on foot?

use serde::Serialize;

use super::availability::{DistanceTiers, ServiceAvailability, assess_availability};
use super::{DomainOutcome, DomainScorer, clamp_score};
use crate::model::{DataStatus, FeatureCategory, Location, ParsedMapData};

/// Services every resident needs within walking distance
pub const ESSENTIAL_SERVICES: [FeatureCategory; 5] = [
    FeatureCategory::Grocery,
    FeatureCategory::Healthcare,
    FeatureCategory::Education,
    FeatureCategory::Recreation,
    FeatureCategory::Transit,
];

const FEATURES: &[FeatureCategory] = &[
    FeatureCategory::Grocery,
    FeatureCategory::Healthcare,
    FeatureCategory::Education,
    FeatureCategory::Recreation,
    FeatureCategory::Transit,
    FeatureCategory::Dining,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FifteenMinuteCity {
    pub grocery: ServiceAvailability,
    pub healthcare: ServiceAvailability,
    pub education: ServiceAvailability,
    pub recreation: ServiceAvailability,
    pub transit: ServiceAvailability,
    /// Reported, but not part of the score
    pub dining: ServiceAvailability,
    pub score: f64,
    pub missing_services: Vec<FeatureCategory>,
    pub is_fifteen_minute_city: bool,
    pub status: DataStatus,
    pub findings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl FifteenMinuteCity {
    pub fn service(&self, category: FeatureCategory) -> Option<&ServiceAvailability> {
        match category {
            FeatureCategory::Grocery => Some(&self.grocery),
            FeatureCategory::Healthcare => Some(&self.healthcare),
            FeatureCategory::Education => Some(&self.education),
            FeatureCategory::Recreation => Some(&self.recreation),
            FeatureCategory::Transit => Some(&self.transit),
            FeatureCategory::Dining => Some(&self.dining),
            _ => None,
        }
    }
}

impl DomainOutcome for FifteenMinuteCity {
    fn score(&self) -> f64 {
        self.score
    }

    fn status(&self) -> &DataStatus {
        &self.status
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FifteenMinuteScorer {
    tiers: DistanceTiers,
}

impl FifteenMinuteScorer {
    pub fn new(tiers: DistanceTiers) -> Self {
        Self { tiers }
    }
}

impl DomainScorer for FifteenMinuteScorer {
    type Output = FifteenMinuteCity;

    const NAME: &'static str = "15-minute city";

    fn features(&self) -> &'static [FeatureCategory] {
        FEATURES
    }

    fn score(&self, location: &Location, data: &ParsedMapData) -> FifteenMinuteCity {
        let origin = location.point();
        let assess = |category| {
            assess_availability(origin, &data.pois, category, &self.tiers, &data.nodes)
        };

        let mut result = FifteenMinuteCity {
            grocery: assess(FeatureCategory::Grocery),
            healthcare: assess(FeatureCategory::Healthcare),
            education: assess(FeatureCategory::Education),
            recreation: assess(FeatureCategory::Recreation),
            transit: assess(FeatureCategory::Transit),
            dining: assess(FeatureCategory::Dining),
            score: 0.0,
            missing_services: Vec::new(),
            is_fifteen_minute_city: false,
            status: DataStatus::Measured,
            findings: Vec::new(),
            recommendations: Vec::new(),
        };

        let essentials: Vec<(FeatureCategory, ServiceAvailability)> = ESSENTIAL_SERVICES
            .iter()
            .filter_map(|&category| result.service(category).map(|s| (category, *s)))
            .collect();

        #[allow(clippy::cast_precision_loss)]
        let mean = essentials.iter().map(|(_, s)| s.score).sum::<f64>() / essentials.len() as f64;
        result.score = clamp_score(mean);

        result.missing_services = essentials
            .iter()
            .filter(|(_, s)| s.count == 0)
            .map(|(category, _)| *category)
            .collect();

        result.is_fifteen_minute_city = essentials
            .iter()
            .all(|(_, s)| s.nearest().is_some_and(|d| d <= self.tiers.fair_m));

        for (category, service) in &essentials {
            match service.nearest() {
                Some(distance) if distance <= self.tiers.fair_m => result.findings.push(format!(
                    "Nearest {} is {distance:.0} m away ({} within the area)",
                    category.label(),
                    service.count
                )),
                Some(distance) => {
                    result.findings.push(format!(
                        "Nearest {} is {distance:.0} m away, beyond a 15-minute walk",
                        category.label()
                    ));
                    result.recommendations.push(format!(
                        "Bring {} services closer to residents",
                        category.label()
                    ));
                }
                None => {
                    result
                        .findings
                        .push(format!("No {} found within the analysis area", category.label()));
                    result.recommendations.push(format!(
                        "Add {} within walking distance",
                        category.label()
                    ));
                }
            }
        }

        if result.is_fifteen_minute_city {
            result
                .findings
                .push("All essential services are within a 15-minute walk".to_string());
        }

        result
    }

    fn degraded(&self, reason: &str) -> FifteenMinuteCity {
        FifteenMinuteCity {
            grocery: ServiceAvailability::none(),
            healthcare: ServiceAvailability::none(),
            education: ServiceAvailability::none(),
            recreation: ServiceAvailability::none(),
            transit: ServiceAvailability::none(),
            dining: ServiceAvailability::none(),
            score: 0.0,
            missing_services: ESSENTIAL_SERVICES.to_vec(),
            is_fifteen_minute_city: false,
            status: DataStatus::degraded(reason),
            findings: vec![format!("Service data unavailable: {reason}")],
            recommendations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::geometry::destination;
    use crate::model::RawMapElement;
    use crate::model::elements::test_support::node;

    fn location() -> Location {
        Location::new(40.0, -75.0).unwrap()
    }

    fn data(pois: Vec<RawMapElement>) -> ParsedMapData {
        ParsedMapData {
            pois,
            ..ParsedMapData::default()
        }
    }

    fn at(distance: f64) -> Point<f64> {
        destination(location().point(), 45.0, distance)
    }

    #[test]
    fn grocery_at_300_m() {
        let data = data(vec![node(1, at(300.0), &[("shop", "supermarket")])]);
        let result = FifteenMinuteScorer::default().score(&location(), &data);

        assert!(result.grocery.available);
        assert_eq!(result.grocery.count, 1);
        assert!((result.grocery.nearest_distance - 300.0).abs() < 1e-6);
        assert_eq!(result.grocery.score, 100.0);
        assert_eq!(result.score, 20.0);
    }

    #[test]
    fn dining_is_excluded_from_score() {
        let data = data(vec![node(1, at(100.0), &[("amenity", "cafe")])]);
        let result = FifteenMinuteScorer::default().score(&location(), &data);

        assert_eq!(result.dining.score, 100.0);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.missing_services, ESSENTIAL_SERVICES.to_vec());
        assert!(!result.is_fifteen_minute_city);
    }

    #[test]
    fn full_coverage_is_a_fifteen_minute_city() {
        let data = data(vec![
            node(1, at(200.0), &[("shop", "supermarket")]),
            node(2, at(600.0), &[("amenity", "clinic")]),
            node(3, at(900.0), &[("amenity", "school")]),
            node(4, at(1100.0), &[("leisure", "park")]),
            node(5, at(150.0), &[("highway", "bus_stop")]),
        ]);
        let result = FifteenMinuteScorer::default().score(&location(), &data);

        assert!(result.is_fifteen_minute_city);
        assert!(result.missing_services.is_empty());
        assert_eq!(result.score, (100.0 + 75.0 + 50.0 + 50.0 + 100.0) / 5.0);
    }

    #[test]
    fn distant_essential_breaks_fifteen_minute_status() {
        let data = data(vec![
            node(1, at(200.0), &[("shop", "supermarket")]),
            node(2, at(200.0), &[("amenity", "clinic")]),
            node(3, at(200.0), &[("amenity", "school")]),
            node(4, at(200.0), &[("leisure", "park")]),
            node(5, at(1500.0), &[("highway", "bus_stop")]),
        ]);
        let result = FifteenMinuteScorer::default().score(&location(), &data);

        assert!(!result.is_fifteen_minute_city);
        assert!(result.missing_services.is_empty());
        assert_eq!(result.transit.score, 25.0);
    }

    #[test]
    fn degraded_result_is_complete() {
        let result = FifteenMinuteScorer::default().degraded("timeout");
        assert!(result.status.is_degraded());
        assert_eq!(result.score, 0.0);
        assert_eq!(result.grocery.nearest_distance, -1.0);
    }
}
