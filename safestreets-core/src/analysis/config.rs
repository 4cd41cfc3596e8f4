use serde::{Deserialize, Serialize};

use crate::loading::{FetchConfig, FetchOptions};
use crate::scoring::{
    AccessibilityWeights, CompositeWeights, DensityParams, DistanceTiers, EconomyParams,
    LightingParams, TransitParams,
};
use crate::{DEFAULT_ANALYSIS_RADIUS_M, Error};

/// Everything tunable about an analysis run.
///
/// Every section has defaults, so a partial TOML or JSON document is enough
/// to override individual values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Radius of the analysis area in meters
    pub radius_m: u32,
    pub fetch: FetchConfig,
    pub tiers: DistanceTiers,
    pub transit: TransitParams,
    pub lighting: LightingParams,
    pub accessibility: AccessibilityWeights,
    pub density: DensityParams,
    pub economy: EconomyParams,
    pub composite: CompositeWeights,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            radius_m: DEFAULT_ANALYSIS_RADIUS_M,
            fetch: FetchConfig::default(),
            tiers: DistanceTiers::default(),
            transit: TransitParams::default(),
            lighting: LightingParams::default(),
            accessibility: AccessibilityWeights::default(),
            density: DensityParams::default(),
            economy: EconomyParams::default(),
            composite: CompositeWeights::default(),
        }
    }
}

impl AnalysisConfig {
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero radius, unordered distance tiers
    /// or negative weights
    pub fn validate(&self) -> Result<(), Error> {
        if self.radius_m == 0 {
            return Err(Error::Config("analysis radius must be positive".to_string()));
        }

        let tiers = &self.tiers;
        if !(tiers.excellent_m > 0.0 && tiers.excellent_m <= tiers.good_m && tiers.good_m <= tiers.fair_m)
        {
            return Err(Error::Config(format!(
                "distance tiers must be positive and ascending, got {} / {} / {} m",
                tiers.excellent_m, tiers.good_m, tiers.fair_m
            )));
        }

        let weights = &self.composite;
        let all = [
            weights.fifteen_minute,
            weights.transit,
            weights.lighting,
            weights.accessibility,
            weights.density,
            weights.economy,
            weights.traffic_safety,
        ];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::Config(
                "composite weights must be finite and non-negative".to_string(),
            ));
        }

        Ok(())
    }

    pub fn fetch_options(&self) -> FetchOptions {
        self.fetch.options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{ "radius_m": 800, "tiers": { "excellent_m": 300.0 } }"#)
                .unwrap();

        assert_eq!(config.radius_m, 800);
        assert_eq!(config.tiers.excellent_m, 300.0);
        assert_eq!(config.tiers.good_m, 800.0);
        assert_eq!(config.composite, CompositeWeights::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unordered_tiers() {
        let mut config = AnalysisConfig::default();
        config.tiers.good_m = 100.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_zero_radius() {
        let config = AnalysisConfig {
            radius_m: 0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
