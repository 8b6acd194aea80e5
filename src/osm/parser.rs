use std::collections::HashMap;

use tracing::{debug, warn};

use super::{Element, OverpassResponse};
use crate::domain::{GeoElement, Geometry, Tags};
use crate::error::InputError;

/// Closing-point tolerance in degrees
const CLOSE_EPSILON: f64 = 1e-9;

/// Parse an Overpass JSON document into map elements
///
/// # Algorithm
/// 1. Build node_id → (lat, lon) lookup map from all node elements
/// 2. Tagged nodes become `Point` elements
/// 3. Ways resolve their coordinates from inline geometry or node refs;
///    closed rings become `Area`, everything else `Line`
///
/// Relations are ignored.
pub fn parse_elements(json: &str) -> Result<Vec<GeoElement>, InputError> {
    let response: OverpassResponse = serde_json::from_str(json)?;
    Ok(convert(&response))
}

/// Convert an already-deserialized response
pub fn convert(response: &OverpassResponse) -> Vec<GeoElement> {
    let nodes = build_node_lookup(response);
    let mut elements = Vec::new();

    for element in &response.elements {
        match element.type_.as_str() {
            "node" => {
                let (Some(tags), Some(lat), Some(lon)) = (&element.tags, element.lat, element.lon)
                else {
                    continue;
                };
                if tags.is_empty() {
                    continue;
                }
                elements.push(GeoElement::new(
                    element.id,
                    tags.clone(),
                    Geometry::Point((lat, lon)),
                ));
            }
            "way" => {
                if let Some(way) = convert_way(element, &nodes) {
                    elements.push(way);
                }
            }
            other => debug!(element = element.id, kind = other, "ignoring element"),
        }
    }

    elements
}

fn build_node_lookup(response: &OverpassResponse) -> HashMap<u64, (f64, f64)> {
    response
        .elements
        .iter()
        .filter(|e| e.type_ == "node")
        .filter_map(|e| {
            let lat = e.lat?;
            let lon = e.lon?;
            Some((e.id, (lat, lon)))
        })
        .collect()
}

fn convert_way(element: &Element, nodes: &HashMap<u64, (f64, f64)>) -> Option<GeoElement> {
    let points = resolve_way_points(element, nodes);
    if points.is_empty() {
        warn!(element = element.id, "dropping way with no resolvable points");
        return None;
    }

    let tags: Tags = element.tags.clone().unwrap_or_default();
    let geometry = if is_closed_way(&points) && tags.get("area").map(String::as_str) != Some("no")
    {
        let mut ring = points;
        ring.pop();
        Geometry::Area(ring)
    } else {
        Geometry::Line(points)
    };

    Some(GeoElement::new(element.id, tags, geometry))
}

/// Inline geometry wins over node refs; unresolvable entries are dropped
fn resolve_way_points(element: &Element, nodes: &HashMap<u64, (f64, f64)>) -> Vec<(f64, f64)> {
    if let Some(geometry) = &element.geometry {
        return geometry.iter().flatten().map(|p| (p.lat, p.lon)).collect();
    }

    let node_refs = element.nodes.as_deref().unwrap_or_default();
    let points: Vec<(f64, f64)> = node_refs
        .iter()
        .filter_map(|id| nodes.get(id).copied())
        .collect();
    if points.len() < node_refs.len() {
        debug!(
            element = element.id,
            missing = node_refs.len() - points.len(),
            "dropped unresolved node refs"
        );
    }
    points
}

fn is_closed_way(points: &[(f64, f64)]) -> bool {
    if points.len() < 4 {
        return false;
    }
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return false;
    };
    (first.0 - last.0).abs() < CLOSE_EPSILON && (first.1 - last.1).abs() < CLOSE_EPSILON
}
