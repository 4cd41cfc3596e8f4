use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Location, NetworkGraph};
use crate::scoring::{CompositeScore, CrashHistory, Demographics, DomainResults, ExternalInputs};

/// Complete walkability profile of one location
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkabilityReport {
    pub location: Location,
    #[serde(flatten)]
    pub results: DomainResults,
    pub composite: CompositeScore,
    pub network: NetworkGraph,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demographics: Option<Demographics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crash_history: Option<CrashHistory>,
    pub analyzed_at: DateTime<Utc>,
}

impl WalkabilityReport {
    pub fn new(
        location: Location,
        results: DomainResults,
        composite: CompositeScore,
        network: NetworkGraph,
        external: ExternalInputs,
    ) -> Self {
        Self {
            location,
            results,
            composite,
            network,
            demographics: external.demographics,
            crash_history: external.crash_history,
            analyzed_at: Utc::now(),
        }
    }

    /// `true` when any domain result stands in for missing data
    pub fn is_degraded(&self) -> bool {
        self.results
            .outcomes()
            .iter()
            .any(|outcome| outcome.status().is_degraded())
    }
}
