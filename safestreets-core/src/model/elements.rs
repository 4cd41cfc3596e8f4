//! Raw map elements as delivered by the geodata service

use std::collections::BTreeMap;

use geo::Point;
use serde::Serialize;

use crate::geometry::{haversine_distance, mean_point};
use crate::{Meters, OsmId};

/// Free-form OSM tags, kept sorted so that serialization is stable
pub type Tags = BTreeMap<String, String>;

/// Node id to coordinate lookup used to resolve way geometry
pub type CoordinateIndex = BTreeMap<OsmId, Point<f64>>;

/// A point on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapNode {
    pub id: OsmId,
    /// `None` when the service omitted coordinates
    pub position: Option<Point<f64>>,
    pub tags: Tags,
}

/// A polyline (or a relation folded into one, carrying only a center)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapWay {
    pub id: OsmId,
    /// Ordered member node ids
    pub nodes: Vec<OsmId>,
    pub tags: Tags,
    /// Pre-resolved geometry, aligned with `nodes` when both are present;
    /// `None` where the service could not place a member node
    pub geometry: Vec<Option<Point<f64>>>,
    pub center: Option<Point<f64>>,
}

/// Heterogeneous map element, either a node or a way
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawMapElement {
    Node(MapNode),
    Way(MapWay),
}

impl RawMapElement {
    pub fn id(&self) -> OsmId {
        match self {
            Self::Node(node) => node.id,
            Self::Way(way) => way.id,
        }
    }

    pub fn tags(&self) -> &Tags {
        match self {
            Self::Node(node) => &node.tags,
            Self::Way(way) => &way.tags,
        }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags().get(key).map(String::as_str)
    }

    pub fn has_tag(&self, key: &str) -> bool {
        self.tags().contains_key(key)
    }

    pub fn tag_is(&self, key: &str, value: &str) -> bool {
        self.tag(key) == Some(value)
    }

    pub fn name(&self) -> Option<&str> {
        self.tag("name")
    }

    pub fn as_way(&self) -> Option<&MapWay> {
        match self {
            Self::Way(way) => Some(way),
            Self::Node(_) => None,
        }
    }

    /// Representative coordinate of the element.
    ///
    /// Nodes use their own position. Ways use the service-provided center,
    /// then the mean of their geometry, then the mean of whichever member
    /// nodes resolve through `index`.
    pub fn position(&self, index: &CoordinateIndex) -> Option<Point<f64>> {
        match self {
            Self::Node(node) => node.position,
            Self::Way(way) => way
                .center
                .or_else(|| mean_point(way.resolved_geometry()))
                .or_else(|| mean_point(way.nodes.iter().filter_map(|id| index.get(id).copied()))),
        }
    }

    /// Distance from `origin` to the element, `None` if it has no coordinate
    pub fn distance_from(&self, origin: Point<f64>, index: &CoordinateIndex) -> Option<Meters> {
        self.position(index)
            .map(|position| haversine_distance(origin, position))
    }
}

impl MapWay {
    pub fn is_closed(&self) -> bool {
        self.nodes.len() > 2 && self.nodes.first() == self.nodes.last()
    }

    /// Coordinates of consecutive member-node pairs.
    ///
    /// Pairs where either end does not resolve are skipped, as are pairs
    /// that repeat the same node id.
    pub fn segments<'a>(
        &'a self,
        index: &'a CoordinateIndex,
    ) -> impl Iterator<Item = ((OsmId, Point<f64>), (OsmId, Point<f64>))> + 'a {
        self.nodes.windows(2).filter_map(move |pair| {
            let (a, b) = (pair[0], pair[1]);
            if a == b {
                return None;
            }
            Some(((a, *index.get(&a)?), (b, *index.get(&b)?)))
        })
    }

    /// Geometry points the service could place, in order
    pub fn resolved_geometry(&self) -> impl Iterator<Item = Point<f64>> + '_ {
        self.geometry.iter().flatten().copied()
    }

    /// Length of the way, from member nodes when they resolve, otherwise
    /// from the pre-resolved geometry. Hops touching an unplaced point are
    /// skipped.
    pub fn length(&self, index: &CoordinateIndex) -> Meters {
        let from_nodes: Meters = self
            .segments(index)
            .map(|((_, a), (_, b))| haversine_distance(a, b))
            .sum();

        if from_nodes > 0.0 {
            return from_nodes;
        }
        self.geometry
            .windows(2)
            .filter_map(|pair| Some(haversine_distance(pair[0]?, pair[1]?)))
            .sum()
    }

    /// Midpoint of the way's extent, used to place map markers
    pub fn midpoint(&self, index: &CoordinateIndex) -> Option<Point<f64>> {
        let resolved: Vec<Point<f64>> = if self.geometry.is_empty() {
            self.nodes.iter().filter_map(|id| index.get(id).copied()).collect()
        } else {
            self.resolved_geometry().collect()
        };
        resolved.get(resolved.len() / 2).copied().or(self.center)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    pub fn node(id: OsmId, position: Point<f64>, pairs: &[(&str, &str)]) -> RawMapElement {
        RawMapElement::Node(MapNode {
            id,
            position: Some(position),
            tags: tags(pairs),
        })
    }

    pub fn way(id: OsmId, nodes: &[OsmId], pairs: &[(&str, &str)]) -> RawMapElement {
        RawMapElement::Way(MapWay {
            id,
            nodes: nodes.to_vec(),
            tags: tags(pairs),
            geometry: Vec::new(),
            center: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn way_position_falls_back_to_member_nodes() {
        let index: CoordinateIndex = [(1, Point::new(0.0, 0.0)), (2, Point::new(0.0, 2.0))]
            .into_iter()
            .collect();
        let street = way(10, &[1, 2, 3], &[("highway", "residential")]);
        assert_eq!(street.position(&index), Some(Point::new(0.0, 1.0)));
    }

    #[test]
    fn unresolved_segments_are_skipped() {
        let index: CoordinateIndex = [(1, Point::new(0.0, 0.0)), (2, Point::new(0.0, 0.001))]
            .into_iter()
            .collect();
        let RawMapElement::Way(street) = way(10, &[1, 2, 3], &[]) else {
            unreachable!()
        };
        assert_eq!(street.segments(&index).count(), 1);
        assert!(street.length(&index) > 100.0);
    }

    #[test]
    fn geometry_length_skips_hops_touching_null_points() {
        let mut street = way(11, &[1, 2, 3], &[("highway", "residential")]);
        if let RawMapElement::Way(w) = &mut street {
            w.geometry = vec![Some(Point::new(0.0, 0.0)), Some(Point::new(0.0, 0.001)), None];
        }
        let RawMapElement::Way(w) = &street else {
            unreachable!()
        };

        let length = w.length(&CoordinateIndex::new());
        assert!(length > 110.0 && length < 112.0);
        assert_eq!(street.position(&CoordinateIndex::new()), Some(Point::new(0.0, 0.0005)));
    }

    #[test]
    fn node_without_coordinates_has_no_position() {
        let element = RawMapElement::Node(MapNode {
            id: 1,
            position: None,
            tags: tags(&[("shop", "supermarket")]),
        });
        assert!(element.position(&CoordinateIndex::new()).is_none());
        assert!(element.tag_is("shop", "supermarket"));
    }
}
