//! Street network summary derived from street ways

use geo::Point;
use serde::Serialize;

use crate::{Meters, OsmId};

/// Street network node retained by the graph (intersection or dead-end)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    /// OSM ID of the node
    pub id: OsmId,
    /// Node coordinates
    pub position: Point<f64>,
    /// Number of street segments meeting at the node
    pub degree: usize,
}

/// Street network metrics for one analysis area
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkGraph {
    /// Nodes with degree >= 3, sorted by id
    pub intersections: Vec<GraphNode>,
    /// Nodes with degree 1, sorted by id
    pub dead_ends: Vec<GraphNode>,
    /// Street ways that contributed at least one segment
    pub street_count: usize,
    pub total_length_km: f64,
    /// Circular analysis area
    pub area_km2: f64,
    pub average_block_length_m: Meters,
    /// Intersections per square kilometer
    pub intersection_density: f64,
    /// Connected pieces of the resolved street network
    pub component_count: usize,
}

impl NetworkGraph {
    pub fn intersection_count(&self) -> usize {
        self.intersections.len()
    }

    pub fn dead_end_count(&self) -> usize {
        self.dead_ends.len()
    }

    pub fn total_length_m(&self) -> Meters {
        self.total_length_km * 1000.0
    }
}
