pub use crate::{Error, Meters, OsmId};

// Entry points
pub use crate::analysis::{AnalysisConfig, Analyzer, WalkabilityReport};
pub use crate::loading::{
    ElementParser, ElementSource, FetchClient, FetchConfig, FetchOptions, QueryBuilder,
    build_network_graph,
};

// Data model
pub use crate::model::{
    DataStatus, FeatureCategory, Location, NetworkGraph, ParsedMapData, RawMapElement,
};

// Scoring
pub use crate::scoring::{
    CompositeAggregator, CompositeScore, CrashHistory, Demographics, DistanceTiers, DomainOutcome,
    DomainResults, DomainScorer, ExternalInputs, Grade, ServiceAvailability, assess_availability,
};
