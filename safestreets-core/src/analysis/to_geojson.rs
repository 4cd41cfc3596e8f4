use geo::Point;
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::{Value, json};

use super::WalkabilityReport;
use crate::Error;

impl WalkabilityReport {
    /// Map layer of the report: the analysed location, street intersections,
    /// dead-ends and dark spots as a `GeoJSON` `FeatureCollection`.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let mut features = vec![point_feature(
            self.location.point(),
            json!({
                "kind": "location",
                "label": self.location.label(),
                "score": self.composite.score,
                "grade": self.composite.grade,
            }),
        )?];

        for node in &self.network.intersections {
            features.push(point_feature(
                node.position,
                json!({ "kind": "intersection", "id": node.id, "degree": node.degree }),
            )?);
        }

        for node in &self.network.dead_ends {
            features.push(point_feature(
                node.position,
                json!({ "kind": "dead_end", "id": node.id }),
            )?);
        }

        for spot in &self.results.street_lighting.dark_spots {
            let Some(position) = spot.position else {
                continue;
            };
            features.push(point_feature(
                position,
                json!({
                    "kind": "dark_spot",
                    "way_id": spot.way_id,
                    "name": spot.name,
                    "highway": spot.highway,
                    "length_m": spot.length_m,
                    "severity": spot.severity,
                }),
            )?);
        }

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }
}

fn point_feature(point: Point<f64>, properties: Value) -> Result<Feature, Error> {
    let geometry = Geometry::new(GeoJsonValue::from(&point));
    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": properties,
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJson(e.to_string()))
}
