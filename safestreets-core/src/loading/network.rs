//! Street network derivation from unordered street ways

use std::f64::consts::PI;

use hashbrown::{HashMap, HashSet};
use log::debug;
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::geometry::haversine_distance;
use crate::model::{CoordinateIndex, GraphNode, NetworkGraph, RawMapElement, is_street_class};
use crate::{Meters, OsmId};

/// Builds the street network summary for the analysis area.
///
/// A node's degree is the number of street segments touching it, counted
/// over street-like ways only. Degree >= 3 marks an intersection, degree 1
/// a dead-end. Segments with an unresolved end still count towards degree
/// but not towards length, and nodes without coordinates are not retained.
#[allow(clippy::cast_precision_loss)]
pub fn build_network_graph(
    streets: &[RawMapElement],
    index: &CoordinateIndex,
    radius_m: Meters,
) -> NetworkGraph {
    let mut degree: HashMap<OsmId, usize> = HashMap::new();
    let mut seen_ways: HashSet<OsmId> = HashSet::new();
    let mut graph: UnGraph<OsmId, ()> = UnGraph::new_undirected();
    let mut graph_ids: HashMap<OsmId, NodeIndex> = HashMap::new();
    let mut total_length_m = 0.0;
    let mut street_count = 0;

    for element in streets {
        let Some(way) = element.as_way() else {
            continue;
        };
        if way.nodes.len() < 2
            || !element.tag("highway").is_some_and(is_street_class)
            || !seen_ways.insert(way.id)
        {
            continue;
        }

        let mut contributed = false;
        for pair in way.nodes.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a == b {
                continue;
            }
            *degree.entry(a).or_default() += 1;
            *degree.entry(b).or_default() += 1;
            contributed = true;

            if let (Some(&pa), Some(&pb)) = (index.get(&a), index.get(&b)) {
                total_length_m += haversine_distance(pa, pb);
                let ia = *graph_ids.entry(a).or_insert_with(|| graph.add_node(a));
                let ib = *graph_ids.entry(b).or_insert_with(|| graph.add_node(b));
                graph.update_edge(ia, ib, ());
            }
        }

        if contributed {
            street_count += 1;
        }
    }

    let mut intersections = Vec::new();
    let mut dead_ends = Vec::new();
    for (&id, &node_degree) in &degree {
        let Some(&position) = index.get(&id) else {
            continue;
        };
        let node = GraphNode {
            id,
            position,
            degree: node_degree,
        };
        match node_degree {
            1 => dead_ends.push(node),
            d if d >= 3 => intersections.push(node),
            _ => {}
        }
    }
    intersections.sort_by_key(|node| node.id);
    dead_ends.sort_by_key(|node| node.id);

    let area_km2 = PI * (radius_m / 1000.0).powi(2);
    let average_block_length_m = if intersections.len() > 1 {
        total_length_m / intersections.len() as f64
    } else {
        total_length_m
    };
    let intersection_density = if area_km2 > 0.0 {
        intersections.len() as f64 / area_km2
    } else {
        0.0
    };
    let component_count = if graph.node_count() == 0 {
        0
    } else {
        connected_components(&graph)
    };

    debug!(
        "Street network: {street_count} ways, {} intersections, {} dead-ends, {:.2} km",
        intersections.len(),
        dead_ends.len(),
        total_length_m / 1000.0
    );

    NetworkGraph {
        intersections,
        dead_ends,
        street_count,
        total_length_km: total_length_m / 1000.0,
        area_km2,
        average_block_length_m,
        intersection_density,
        component_count,
    }
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::model::elements::test_support::way;

    const SPACING_DEG: f64 = 0.001;

    /// Three east-west and three north-south streets on a 5 x 5 lattice of
    /// nodes; streets cross at the inner 3 x 3 points and each end is a stub.
    fn grid() -> (Vec<RawMapElement>, CoordinateIndex) {
        let id = |row: i64, col: i64| row * 10 + col;
        let mut index = CoordinateIndex::new();
        for row in 0..5 {
            for col in 0..5 {
                index.insert(
                    id(row, col),
                    Point::new(col as f64 * SPACING_DEG, row as f64 * SPACING_DEG),
                );
            }
        }

        let mut ways = Vec::new();
        for row in 1..=3 {
            let nodes: Vec<OsmId> = (0..5).map(|col| id(row, col)).collect();
            ways.push(way(100 + row, &nodes, &[("highway", "residential")]));
        }
        for col in 1..=3 {
            let nodes: Vec<OsmId> = (0..5).map(|row| id(row, col)).collect();
            ways.push(way(200 + col, &nodes, &[("highway", "tertiary")]));
        }
        (ways, index)
    }

    #[test]
    fn grid_intersections_and_dead_ends() {
        let (ways, index) = grid();
        let network = build_network_graph(&ways, &index, 1000.0);

        assert_eq!(network.intersection_count(), 9);
        assert_eq!(network.dead_end_count(), 12);
        assert!(network.intersections.iter().all(|n| n.degree == 4));
        assert_eq!(network.street_count, 6);
        assert_eq!(network.component_count, 1);
    }

    #[test]
    fn result_is_independent_of_way_order() {
        let (mut ways, index) = grid();
        let forward = build_network_graph(&ways, &index, 1000.0);
        ways.reverse();
        let backward = build_network_graph(&ways, &index, 1000.0);

        assert_eq!(forward.intersections, backward.intersections);
        assert_eq!(forward.dead_ends, backward.dead_ends);
        assert!((forward.total_length_km - backward.total_length_km).abs() < 1e-9);
    }

    #[test]
    fn footways_do_not_create_intersections() {
        let (mut ways, index) = grid();
        ways.push(way(300, &[11, 22, 33], &[("highway", "footway")]));
        let network = build_network_graph(&ways, &index, 1000.0);
        assert_eq!(network.intersection_count(), 9);
    }

    #[test]
    fn block_length_and_area() {
        let (ways, index) = grid();
        let network = build_network_graph(&ways, &index, 1000.0);
        assert!((network.area_km2 - PI).abs() < 1e-12);
        let expected = network.total_length_m() / 9.0;
        assert!((network.average_block_length_m - expected).abs() < 1e-9);
    }

    #[test]
    fn single_segment_uses_total_length() {
        let index: CoordinateIndex = [(1, Point::new(0.0, 0.0)), (2, Point::new(0.0, 0.001))]
            .into_iter()
            .collect();
        let ways = vec![way(1, &[1, 2], &[("highway", "service")])];
        let network = build_network_graph(&ways, &index, 500.0);

        assert_eq!(network.dead_end_count(), 2);
        assert!((network.average_block_length_m - network.total_length_m()).abs() < 1e-9);
    }

    #[test]
    fn closed_loop_has_no_dead_ends() {
        let index: CoordinateIndex = [
            (1, Point::new(0.0, 0.0)),
            (2, Point::new(0.001, 0.0)),
            (3, Point::new(0.001, 0.001)),
        ]
        .into_iter()
        .collect();
        let ways = vec![way(1, &[1, 2, 3, 1], &[("highway", "residential")])];
        let network = build_network_graph(&ways, &index, 500.0);

        assert_eq!(network.dead_end_count(), 0);
        assert_eq!(network.intersection_count(), 0);
    }

    #[test]
    fn unresolved_node_skips_only_its_segments() {
        let index: CoordinateIndex = [(1, Point::new(0.0, 0.0)), (2, Point::new(0.0, 0.001))]
            .into_iter()
            .collect();
        let ways = vec![way(1, &[1, 2, 99], &[("highway", "residential")])];
        let network = build_network_graph(&ways, &index, 500.0);

        assert!(network.total_length_m() > 100.0 && network.total_length_m() < 120.0);
        assert_eq!(network.dead_end_count(), 1);
    }

    fn line_index() -> CoordinateIndex {
        [
            (1, Point::new(0.0, 0.0)),
            (2, Point::new(0.001, 0.0)),
            (3, Point::new(0.002, 0.0)),
            (4, Point::new(0.001, 0.001)),
            (5, Point::new(0.001, 0.002)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn t_junction_is_an_intersection() {
        let ways = vec![
            way(1, &[1, 2, 3], &[("highway", "residential")]),
            way(2, &[2, 4, 5], &[("highway", "residential")]),
        ];
        let network = build_network_graph(&ways, &line_index(), 500.0);

        let ids = |nodes: &[GraphNode]| nodes.iter().map(|n| (n.id, n.degree)).collect::<Vec<_>>();
        assert_eq!(ids(&network.intersections), vec![(2, 3)]);
        assert_eq!(ids(&network.dead_ends), vec![(1, 1), (4, 1), (5, 1)]);
    }

    #[test]
    fn ways_meeting_end_to_end_pass_through() {
        let ways = vec![
            way(1, &[1, 2], &[("highway", "residential")]),
            way(2, &[2, 3], &[("highway", "residential")]),
        ];
        let network = build_network_graph(&ways, &line_index(), 500.0);

        assert_eq!(network.intersection_count(), 0);
        let dead_ends: Vec<OsmId> = network.dead_ends.iter().map(|n| n.id).collect();
        assert_eq!(dead_ends, vec![1, 3]);
        assert_eq!(network.component_count, 1);
    }
}
