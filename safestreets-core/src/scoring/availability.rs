//! Shared proximity scorer: count, nearest distance and a tiered score for
//! one feature category around a location.

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::model::{CoordinateIndex, FeatureCategory, RawMapElement};
use crate::{Meters, NOT_FOUND};

/// Distance thresholds and the scores they map to. Boundaries are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceTiers {
    pub excellent_m: Meters,
    pub good_m: Meters,
    pub fair_m: Meters,
    pub excellent_score: f64,
    pub good_score: f64,
    pub fair_score: f64,
    /// Score for a match beyond `fair_m`
    pub distant_score: f64,
}

impl Default for DistanceTiers {
    fn default() -> Self {
        Self {
            excellent_m: 400.0,
            good_m: 800.0,
            fair_m: 1200.0,
            excellent_score: 100.0,
            good_score: 75.0,
            fair_score: 50.0,
            distant_score: 25.0,
        }
    }
}

impl DistanceTiers {
    /// Score of a match found at `distance`
    pub fn score(&self, distance: Meters) -> f64 {
        if distance <= self.excellent_m {
            self.excellent_score
        } else if distance <= self.good_m {
            self.good_score
        } else if distance <= self.fair_m {
            self.fair_score
        } else {
            self.distant_score
        }
    }
}

/// Canonical result of any proximity check
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAvailability {
    pub available: bool,
    pub count: usize,
    /// Meters to the closest match, or -1 when nothing matched
    pub nearest_distance: Meters,
    pub score: f64,
}

impl Default for ServiceAvailability {
    fn default() -> Self {
        Self::none()
    }
}

impl ServiceAvailability {
    /// Nothing found
    pub fn none() -> Self {
        Self {
            available: false,
            count: 0,
            nearest_distance: NOT_FOUND,
            score: 0.0,
        }
    }

    pub fn nearest(&self) -> Option<Meters> {
        self.available.then_some(self.nearest_distance)
    }

    fn from_distances(distances: &[Meters], tiers: &DistanceTiers) -> Self {
        let Some(nearest) = distances.iter().copied().reduce(f64::min) else {
            return Self::none();
        };

        Self {
            available: true,
            count: distances.len(),
            nearest_distance: nearest,
            score: tiers.score(nearest),
        }
    }
}

/// Distances from `origin` to every element of `category` that has a
/// resolvable coordinate. Elements without one are skipped.
pub fn distances_to<'a, I>(
    origin: Point<f64>,
    elements: I,
    category: FeatureCategory,
    index: &CoordinateIndex,
) -> Vec<Meters>
where
    I: IntoIterator<Item = &'a RawMapElement>,
{
    elements
        .into_iter()
        .filter(|element| category.matches(element))
        .filter_map(|element| element.distance_from(origin, index))
        .collect()
}

/// Availability of `category` around `origin`
pub fn assess_availability<'a, I>(
    origin: Point<f64>,
    elements: I,
    category: FeatureCategory,
    tiers: &DistanceTiers,
    index: &CoordinateIndex,
) -> ServiceAvailability
where
    I: IntoIterator<Item = &'a RawMapElement>,
{
    ServiceAvailability::from_distances(&distances_to(origin, elements, category, index), tiers)
}
