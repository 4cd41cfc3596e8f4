//! Top-level analyses: build the query, fetch, parse and score.
//!
//! This is the boundary where fetch failures turn into complete results
//! marked [`DataStatus::Degraded`](crate::DataStatus) instead of errors.

mod config;
mod report;
mod to_geojson;

use std::time::Instant;

use log::{info, warn};

use crate::loading::{ElementParser, ElementSource, FetchClient, FetchOptions, QueryBuilder};
use crate::model::{FeatureCategory, Location, NetworkGraph, ParsedMapData};
use crate::scoring::{
    AccessibilityScorer, AdaAccessibility, BuildingDensity, CompositeAggregator, DensityScorer,
    DomainResults, DomainScorer, EconomyScorer, ExternalInputs, FifteenMinuteCity,
    FifteenMinuteScorer, LightingScorer, LocalEconomyProfile, StreetLighting, TransitAccess,
    TransitScorer,
};
use crate::Error;

pub use config::AnalysisConfig;
pub use report::WalkabilityReport;

/// Runs analyses for locations against one element source
#[derive(Debug, Clone)]
pub struct Analyzer<S = FetchClient> {
    source: S,
    parser: ElementParser,
    options: FetchOptions,
    radius_m: u32,
    query_timeout_secs: u32,
    fifteen_minute: FifteenMinuteScorer,
    transit: TransitScorer,
    lighting: LightingScorer,
    accessibility: AccessibilityScorer,
    density: DensityScorer,
    economy: EconomyScorer,
    aggregator: CompositeAggregator,
}

impl Analyzer<FetchClient> {
    /// Creates an analyzer backed by the network fetch client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built
    pub fn new(config: AnalysisConfig) -> Result<Self, Error> {
        let client = FetchClient::new(config.fetch.clone())?
            .with_parser(ElementParser::new(f64::from(config.radius_m)));
        Self::with_source(client, &config)
    }
}

impl<S: ElementSource> Analyzer<S> {
    /// Creates an analyzer for an arbitrary element source
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid
    pub fn with_source(source: S, config: &AnalysisConfig) -> Result<Self, Error> {
        config.validate()?;

        let options = config.fetch_options();
        let query_timeout_secs =
            u32::try_from(options.timeout.as_secs().max(1)).unwrap_or(u32::MAX);

        Ok(Self {
            source,
            parser: ElementParser::new(f64::from(config.radius_m)),
            options,
            radius_m: config.radius_m,
            query_timeout_secs,
            fifteen_minute: FifteenMinuteScorer::new(config.tiers),
            transit: TransitScorer::new(config.tiers, config.transit.clone()),
            lighting: LightingScorer::new(config.lighting),
            accessibility: AccessibilityScorer::new(config.accessibility),
            density: DensityScorer::new(config.density.clone()),
            economy: EconomyScorer::new(config.economy),
            aggregator: CompositeAggregator::new(config.composite),
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches and parses every feature in `categories` with one query
    ///
    /// # Errors
    ///
    /// Propagates the source's error when the data cannot be retrieved
    pub async fn snapshot<I>(&self, location: &Location, categories: I) -> Result<ParsedMapData, Error>
    where
        I: IntoIterator<Item = FeatureCategory>,
    {
        let query = QueryBuilder::new(self.radius_m)
            .timeout_secs(self.query_timeout_secs)
            .features(categories)
            .build(location);

        let elements = self.source.fetch_elements(&query, self.options).await?;
        Ok(self.parser.parse(elements))
    }

    async fn run<D: DomainScorer>(&self, scorer: &D, location: &Location) -> D::Output {
        match self.snapshot(location, scorer.features().iter().copied()).await {
            Ok(data) => scorer.score(location, &data),
            Err(e) => {
                warn!(
                    "{} analysis for {} is degraded: {e}",
                    D::NAME,
                    location.label()
                );
                scorer.degraded(&e.to_string())
            }
        }
    }

    pub async fn fifteen_minute_city(&self, location: &Location) -> FifteenMinuteCity {
        self.run(&self.fifteen_minute, location).await
    }

    pub async fn transit_access(&self, location: &Location) -> TransitAccess {
        self.run(&self.transit, location).await
    }

    pub async fn street_lighting(&self, location: &Location) -> StreetLighting {
        self.run(&self.lighting, location).await
    }

    pub async fn accessibility(&self, location: &Location) -> AdaAccessibility {
        self.run(&self.accessibility, location).await
    }

    pub async fn building_density(&self, location: &Location) -> BuildingDensity {
        self.run(&self.density, location).await
    }

    pub async fn local_economy(&self, location: &Location) -> LocalEconomyProfile {
        self.run(&self.economy, location).await
    }

    /// Categories needed by all six scorers together
    pub fn all_features(&self) -> impl Iterator<Item = FeatureCategory> + '_ {
        [
            self.fifteen_minute.features(),
            self.transit.features(),
            self.lighting.features(),
            self.accessibility.features(),
            self.density.features(),
            self.economy.features(),
        ]
        .into_iter()
        .flatten()
        .copied()
    }

    /// Runs all six scorers over one snapshot in parallel
    pub fn score_all(&self, location: &Location, data: &ParsedMapData) -> DomainResults {
        let (
            (fifteen_minute_city, transit_access),
            ((street_lighting, accessibility), (building_density, local_economy)),
        ) = rayon::join(
            || {
                rayon::join(
                    || self.fifteen_minute.score(location, data),
                    || self.transit.score(location, data),
                )
            },
            || {
                rayon::join(
                    || {
                        rayon::join(
                            || self.lighting.score(location, data),
                            || self.accessibility.score(location, data),
                        )
                    },
                    || {
                        rayon::join(
                            || self.density.score(location, data),
                            || self.economy.score(location, data),
                        )
                    },
                )
            },
        );

        DomainResults {
            fifteen_minute_city,
            transit_access,
            street_lighting,
            accessibility,
            building_density,
            local_economy,
        }
    }

    /// Complete set of degraded results sharing one reason
    pub fn degraded_all(&self, reason: &str) -> DomainResults {
        DomainResults {
            fifteen_minute_city: self.fifteen_minute.degraded(reason),
            transit_access: self.transit.degraded(reason),
            street_lighting: self.lighting.degraded(reason),
            accessibility: self.accessibility.degraded(reason),
            building_density: self.density.degraded(reason),
            local_economy: self.economy.degraded(reason),
        }
    }

    /// Full walkability report: one shared fetch, six scorers, composite
    pub async fn analyze(&self, location: Location, external: ExternalInputs) -> WalkabilityReport {
        let started = Instant::now();

        let (results, network) = match self.snapshot(&location, self.all_features()).await {
            Ok(data) => (self.score_all(&location, &data), data.network),
            Err(e) => {
                warn!("Analysis for {} is degraded: {e}", location.label());
                (self.degraded_all(&e.to_string()), NetworkGraph::default())
            }
        };
        let composite = self.aggregator.aggregate(&results, &external);

        info!(
            "Analyzed {} in {} ms: grade {:?} ({:.1}), confidence {:.0}%",
            location.label(),
            started.elapsed().as_millis(),
            composite.grade,
            composite.score,
            composite.confidence
        );

        WalkabilityReport::new(location, results, composite, network, external)
    }
}
