use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use geo::Point;
use safestreets_core::loading::build_network_graph;
use safestreets_core::model::{MapNode, MapWay, RawMapElement, Tags};
use safestreets_core::scoring::{
    AccessibilityScorer, CompositeAggregator, DensityScorer, DomainResults, DomainScorer,
    EconomyScorer, ExternalInputs, FifteenMinuteScorer, LightingScorer, TransitScorer,
};
use safestreets_core::{AnalysisConfig, ElementParser, Location};

const GRID: i64 = 40;
const SPACING_DEG: f64 = 0.0008;

fn tags(pairs: &[(&str, &str)]) -> Tags {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// A street lattice with a shop, a lamp and a crossing on every block
fn synthetic_area() -> Vec<RawMapElement> {
    let id = |row: i64, col: i64| row * GRID + col;
    let mut elements = Vec::new();

    for row in 0..GRID {
        for col in 0..GRID {
            let position = Point::new(col as f64 * SPACING_DEG, row as f64 * SPACING_DEG);
            let pairs: &[(&str, &str)] = match (row + col) % 4 {
                0 => &[("shop", "convenience")],
                1 => &[("highway", "street_lamp")],
                2 => &[("highway", "crossing"), ("kerb", "lowered")],
                _ => &[],
            };
            elements.push(RawMapElement::Node(MapNode {
                id: id(row, col),
                position: Some(position),
                tags: tags(pairs),
            }));
        }
    }

    for row in 0..GRID {
        elements.push(RawMapElement::Way(MapWay {
            id: 1_000_000 + row,
            nodes: (0..GRID).map(|col| id(row, col)).collect(),
            tags: tags(&[("highway", "residential"), ("lit", "yes")]),
            geometry: Vec::new(),
            center: None,
        }));
    }
    for col in 0..GRID {
        elements.push(RawMapElement::Way(MapWay {
            id: 2_000_000 + col,
            nodes: (0..GRID).map(|row| id(row, col)).collect(),
            tags: tags(&[("highway", "tertiary")]),
            geometry: Vec::new(),
            center: None,
        }));
    }

    elements
}

fn bench_pipeline(c: &mut Criterion) {
    let elements = synthetic_area();
    let parser = ElementParser::new(1600.0);
    let location = Location::new(0.016, 0.016).unwrap();
    let data = parser.parse(elements.clone());
    let config = AnalysisConfig::default();

    c.bench_function("parse", |b| {
        b.iter(|| parser.parse(black_box(elements.clone())));
    });

    c.bench_function("network_graph", |b| {
        b.iter(|| build_network_graph(black_box(&data.streets), &data.nodes, 1600.0));
    });

    let fifteen = FifteenMinuteScorer::new(config.tiers);
    c.bench_function("score_fifteen_minute", |b| {
        b.iter(|| fifteen.score(black_box(&location), &data));
    });

    let lighting = LightingScorer::new(config.lighting);
    c.bench_function("score_lighting", |b| {
        b.iter(|| lighting.score(black_box(&location), &data));
    });

    let results = DomainResults {
        fifteen_minute_city: fifteen.score(&location, &data),
        transit_access: TransitScorer::default().score(&location, &data),
        street_lighting: lighting.degraded("bench"),
        accessibility: AccessibilityScorer::default().score(&location, &data),
        building_density: DensityScorer::default().score(&location, &data),
        local_economy: EconomyScorer::default().score(&location, &data),
    };
    let aggregator = CompositeAggregator::new(config.composite);
    c.bench_function("composite", |b| {
        b.iter(|| aggregator.aggregate(black_box(&results), &ExternalInputs::default()));
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
