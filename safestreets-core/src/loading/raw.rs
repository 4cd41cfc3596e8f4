//! Transport DTOs for Overpass JSON responses.
//!
//! Responses are decoded into these first, checked for structural validity,
//! then mapped into [`RawMapElement`]s in one pass.

use geo::Point;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::{MapNode, MapWay, RawMapElement, Tags};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassResponse {
    pub elements: Vec<ElementDto>,
    /// Set by Overpass when evaluation stopped early
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

/// Body returned by the backend proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyResponse {
    pub data: OverpassResponse,
}

/// Body sent to the backend proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementDto {
    #[serde(rename = "type")]
    pub element_type: String,
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<LatLonDto>,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geometry: Vec<Option<LatLonDto>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LatLonDto {
    pub lat: f64,
    pub lon: f64,
}

impl LatLonDto {
    fn to_point(self) -> Option<Point<f64>> {
        to_point(Some(self.lat), Some(self.lon))
    }
}

fn to_point(lat: Option<f64>, lon: Option<f64>) -> Option<Point<f64>> {
    match (lat, lon) {
        (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
            Some(Point::new(lon, lat))
        }
        _ => None,
    }
}

impl OverpassResponse {
    /// Decodes a response body, rejecting truncated results.
    ///
    /// # Errors
    ///
    /// Returns a description of why the body is not a usable response
    pub fn from_slice(body: &[u8]) -> Result<Self, String> {
        let response: Self =
            serde_json::from_slice(body).map_err(|e| format!("malformed response: {e}"))?;
        response.check()?;
        Ok(response)
    }

    /// Overpass reports timeouts and memory exhaustion in `remark` while
    /// still answering 200 with whatever it had collected.
    pub(crate) fn check(&self) -> Result<(), String> {
        match &self.remark {
            Some(remark) if remark.contains("runtime error") => {
                Err(format!("truncated response: {remark}"))
            }
            _ => Ok(()),
        }
    }

    pub fn into_elements(self) -> Vec<RawMapElement> {
        self.elements
            .into_iter()
            .filter_map(ElementDto::into_element)
            .collect()
    }
}

impl ElementDto {
    fn into_element(self) -> Option<RawMapElement> {
        match self.element_type.as_str() {
            "node" => Some(RawMapElement::Node(MapNode {
                id: self.id,
                position: to_point(self.lat, self.lon),
                tags: self.tags,
            })),
            "way" => Some(RawMapElement::Way(MapWay {
                id: self.id,
                nodes: self.nodes,
                tags: self.tags,
                geometry: self
                    .geometry
                    .into_iter()
                    .map(|point| point.and_then(LatLonDto::to_point))
                    .collect(),
                center: self.center.and_then(LatLonDto::to_point),
            })),
            "relation" => {
                let center = self.center.and_then(LatLonDto::to_point);
                if center.is_none() {
                    debug!("Skipping relation {} without center", self.id);
                    return None;
                }
                Some(RawMapElement::Way(MapWay {
                    id: self.id,
                    nodes: Vec::new(),
                    tags: self.tags,
                    geometry: Vec::new(),
                    center,
                }))
            }
            other => {
                debug!("Skipping element {} of unknown type '{other}'", self.id);
                None
            }
        }
    }
}
