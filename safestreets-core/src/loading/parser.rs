//! Classification of raw elements into typed collections

use log::debug;

use super::network::build_network_graph;
use crate::model::{CoordinateIndex, FeatureCategory, ParsedMapData, RawMapElement, is_street_class};
use crate::{DEFAULT_ANALYSIS_RADIUS_M, Meters};

/// Tag values that explicitly deny the presence of a sidewalk
const NO_SIDEWALK: &[&str] = &["no", "none"];

/// Turns a raw element list into a [`ParsedMapData`] snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementParser {
    radius_m: Meters,
}

impl Default for ElementParser {
    fn default() -> Self {
        Self::new(f64::from(DEFAULT_ANALYSIS_RADIUS_M))
    }
}

impl ElementParser {
    /// `radius_m` is the radius of the queried area, used for area metrics
    pub fn new(radius_m: Meters) -> Self {
        Self { radius_m }
    }

    pub fn radius_m(&self) -> Meters {
        self.radius_m
    }

    pub fn parse(&self, elements: Vec<RawMapElement>) -> ParsedMapData {
        let nodes = build_coordinate_index(&elements);
        let mut data = ParsedMapData {
            nodes,
            ..ParsedMapData::default()
        };

        for element in elements {
            let crossing = is_crossing(&element);
            let sidewalk = !crossing && is_sidewalk(&element);
            let street = is_street(&element);

            if crossing {
                data.crossings.push(element.clone());
            }
            if sidewalk {
                data.sidewalks.push(element.clone());
            }
            if street {
                data.streets.push(element);
            } else if !crossing && !sidewalk && !element.tags().is_empty() {
                data.pois.push(element);
            }
        }

        data.network = build_network_graph(&data.streets, &data.nodes, self.radius_m);

        debug!(
            "Parsed {} crossings, {} sidewalks, {} streets, {} POIs, {} node coordinates",
            data.crossings.len(),
            data.sidewalks.len(),
            data.streets.len(),
            data.pois.len(),
            data.nodes.len()
        );

        data
    }
}

/// Node coordinates from node elements and from way geometry aligned with
/// the way's node list. Node elements win over way geometry.
fn build_coordinate_index(elements: &[RawMapElement]) -> CoordinateIndex {
    let mut index = CoordinateIndex::new();

    for element in elements {
        if let RawMapElement::Way(way) = element
            && way.nodes.len() == way.geometry.len()
        {
            for (id, point) in way.nodes.iter().zip(&way.geometry) {
                if let Some(point) = point {
                    index.entry(*id).or_insert(*point);
                }
            }
        }
    }

    for element in elements {
        if let RawMapElement::Node(node) = element
            && let Some(position) = node.position
        {
            index.insert(node.id, position);
        }
    }

    index
}

fn is_crossing(element: &RawMapElement) -> bool {
    FeatureCategory::Crossing.matches(element)
}

fn is_sidewalk(element: &RawMapElement) -> bool {
    match element.tag("sidewalk") {
        Some(value) if NO_SIDEWALK.contains(&value) => {
            element.tag_is("footway", "sidewalk") || element.tag_is("highway", "footway")
        }
        _ => FeatureCategory::Sidewalk.matches(element),
    }
}

fn is_street(element: &RawMapElement) -> bool {
    element.as_way().is_some() && element.tag("highway").is_some_and(is_street_class)
}
