use serde::Serialize;

use super::elements::{CoordinateIndex, RawMapElement};
use super::network::NetworkGraph;

/// Typed snapshot of one fetch, owned by a single analysis run
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMapData {
    pub crossings: Vec<RawMapElement>,
    pub sidewalks: Vec<RawMapElement>,
    pub streets: Vec<RawMapElement>,
    pub pois: Vec<RawMapElement>,
    /// Every node coordinate seen in the response
    pub nodes: CoordinateIndex,
    pub network: NetworkGraph,
}
