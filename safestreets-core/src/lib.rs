//! Geospatial data acquisition and walkability scoring.
//!
//! The crate fetches map features around a point from Overpass-style
//! geodata services, normalizes them into typed collections, derives a
//! street-network graph and runs a family of domain scorers whose results
//! are blended into a composite grade.

pub mod analysis;
pub mod error;
pub mod geometry;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod scoring;

pub use analysis::{AnalysisConfig, Analyzer, WalkabilityReport};
pub use error::Error;
pub use loading::{ElementParser, ElementSource, FetchClient, FetchConfig, FetchOptions, QueryBuilder};
pub use model::{
    DataStatus, FeatureCategory, Location, NetworkGraph, ParsedMapData, RawMapElement,
};

/// OpenStreetMap element identifier
pub type OsmId = i64;

/// Distances are expressed in meters unless a name says otherwise
pub type Meters = f64;

/// Mean Earth radius used by every distance calculation in the crate
pub const EARTH_RADIUS_M: Meters = 6_371_000.0;

/// Radius of the circular analysis area around a location
pub const DEFAULT_ANALYSIS_RADIUS_M: u32 = 1600;

/// Sentinel distance reported when nothing matching was found
pub const NOT_FOUND: Meters = -1.0;
