//! Domain scorers turning proximity and coverage facts into bounded scores,
//! and the aggregator blending them into a composite grade.

pub mod accessibility;
pub mod availability;
pub mod composite;
pub mod density;
pub mod economy;
pub mod fifteen_minute;
pub mod lighting;
pub mod transit;

use serde::Serialize;

use crate::model::{DataStatus, FeatureCategory, Location, ParsedMapData};

pub use accessibility::{
    AccessibilityRating, AccessibilityScorer, AccessibilityWeights, AdaAccessibility,
};
pub use availability::{DistanceTiers, ServiceAvailability, assess_availability};
pub use composite::{
    ComponentScore, CompositeAggregator, CompositeScore, CompositeWeights, CrashHistory,
    Demographics, ExternalInputs, Grade,
};
pub use density::{BuildingDensity, DensityCategory, DensityParams, DensityScorer};
pub use economy::{
    BusinessCategory, EconomicVitality, EconomyParams, EconomyScorer, LocalEconomyProfile,
};
pub use fifteen_minute::{FifteenMinuteCity, FifteenMinuteScorer};
pub use lighting::{DarkSpot, LightingParams, LightingScorer, Severity, StreetLighting};
pub use transit::{TransitAccess, TransitFeasibility, TransitMode, TransitParams, TransitScorer};

/// Common view over every domain result
pub trait DomainOutcome {
    /// Overall 0-100 score of the domain
    fn score(&self) -> f64;
    fn status(&self) -> &DataStatus;
}

/// A pure `(Location, ParsedMapData) -> result` scorer.
///
/// Implementations hold no mutable state, so the same input always yields
/// the same output and scorers can run concurrently over one snapshot.
pub trait DomainScorer: Send + Sync {
    type Output: DomainOutcome + Send;

    /// Short name used in logs
    const NAME: &'static str;

    /// Feature categories the scorer needs fetched
    fn features(&self) -> &'static [FeatureCategory];

    fn score(&self, location: &Location, data: &ParsedMapData) -> Self::Output;

    /// Complete all-zero result standing in for data that could not be fetched
    fn degraded(&self, reason: &str) -> Self::Output;
}

/// Results of all six domain scorers for one location
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainResults {
    pub fifteen_minute_city: FifteenMinuteCity,
    pub transit_access: TransitAccess,
    pub street_lighting: StreetLighting,
    pub accessibility: AdaAccessibility,
    pub building_density: BuildingDensity,
    pub local_economy: LocalEconomyProfile,
}

impl DomainResults {
    pub fn outcomes(&self) -> [&dyn DomainOutcome; 6] {
        [
            &self.fifteen_minute_city,
            &self.transit_access,
            &self.street_lighting,
            &self.accessibility,
            &self.building_density,
            &self.local_economy,
        ]
    }
}

/// Clamps a raw score into [0, 100], mapping non-finite values to 0
pub fn clamp_score(raw: f64) -> f64 {
    if raw.is_finite() {
        raw.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// `part / whole` as a percentage, 0 when `whole` is 0
#[allow(clippy::cast_precision_loss)]
pub(crate) fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
