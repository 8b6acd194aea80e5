use glam::Vec3;
use tracing::warn;

use super::{TerrainBaseline, dedup_consecutive};
use crate::config::{BridgeConfig, Color, RoadConfig, RoadStyle};
use crate::domain::{Category, GeoElement, Geometry, RoadClass};
use crate::geometry::{Projector, epsilon_for_level, simplify_polyline};
use crate::mesh::MeshBuilder;
use crate::model::{MeshRecord, Transform};

/// Segments shorter than this (generation units) are skipped
const MIN_SEGMENT_LENGTH: f64 = 1e-6;

/// Build one box record per segment of a road polyline
///
/// Each box is laid out along local +X and yawed onto its segment, with its
/// underside on the baseline.
pub fn build_road(
    element: &GeoElement,
    config: &RoadConfig,
    projector: &Projector,
    baseline: TerrainBaseline,
) -> Vec<MeshRecord> {
    let Some(points) = polyline(element, projector, config.simplify) else {
        return Vec::new();
    };
    let style = config.style(road_class(element));

    let deck = Deck {
        width: projector.scale_length(style.width),
        height: projector.scale_length(style.height),
        color: style.color,
        y: baseline.y(),
        category: Category::Road,
    };
    segment_records(element.id, &points, &deck)
}

/// Build an elevated deck plus its pillars
///
/// The deck takes the cross-section of the road class it carries, or the
/// bridge fallback when it carries none. Pillars stand on the baseline and
/// reach exactly to the deck underside.
pub fn build_bridge(
    element: &GeoElement,
    config: &BridgeConfig,
    roads: &RoadConfig,
    projector: &Projector,
    baseline: TerrainBaseline,
) -> Vec<MeshRecord> {
    let Some(points) = polyline(element, projector, roads.simplify) else {
        return Vec::new();
    };
    let style: &RoadStyle = match road_class(element) {
        Some(class) => roads.style(Some(class)),
        None => &config.fallback,
    };

    let clearance = projector.scale_length(config.clearance).max(0.0);
    let deck = Deck {
        width: projector.scale_length(style.width),
        height: projector.scale_length(style.height),
        color: config.color,
        y: baseline.y() + clearance,
        category: Category::Bridge,
    };

    let mut records = segment_records(element.id, &points, &deck);
    if records.is_empty() || !config.pillars || clearance <= 0.0 {
        return records;
    }

    let size = projector.scale_length(config.pillar_size);
    if size <= 0.0 || config.pillar_spacing <= 0.0 {
        return records;
    }

    let half = size / 2.0;
    for pair in points.windows(2) {
        let (x0, z0) = pair[0];
        let (x1, z1) = pair[1];
        let distance_m = (x1 - x0).hypot(z1 - z0) / projector.scale();
        let count = (distance_m / config.pillar_spacing).floor() as usize;

        for k in 0..count {
            let t = (k as f64 + 0.5) / count as f64;
            let position = Vec3::new(
                (x0 + (x1 - x0) * t) as f32,
                baseline.y(),
                (z0 + (z1 - z0) * t) as f32,
            );

            let mut builder = MeshBuilder::new();
            builder.add_box([-half, 0.0, -half], [half, clearance, half]);
            let (positions, indices) = builder.finish();
            records.push(
                MeshRecord::new(
                    Category::Bridge,
                    config.color,
                    positions,
                    Some(indices),
                    Transform::at(position),
                )
                .from_element(element.id),
            );
        }
    }

    records
}

struct Deck {
    width: f32,
    height: f32,
    color: Color,
    /// World Y of the segment underside
    y: f32,
    category: Category,
}

fn road_class(element: &GeoElement) -> Option<RoadClass> {
    element.tag("highway").and_then(RoadClass::from_highway_tag)
}

/// Deduplicated, projected and optionally simplified polyline
fn polyline(
    element: &GeoElement,
    projector: &Projector,
    simplify: u8,
) -> Option<Vec<(f64, f64)>> {
    let mut points = dedup_consecutive(element.points());
    // closed ways (roundabouts) keep their closing segment
    if matches!(element.geometry, Geometry::Area(_)) && points.len() > 2 {
        points.push(points[0]);
    }
    if points.len() < 2 {
        warn!(
            element = element.id,
            points = points.len(),
            "skipping road: needs at least 2 points"
        );
        return None;
    }

    let projected = projector.project_points(&points);
    let epsilon = epsilon_for_level(simplify) * projector.scale();
    Some(simplify_polyline(&projected, epsilon))
}

fn segment_records(element_id: u64, points: &[(f64, f64)], deck: &Deck) -> Vec<MeshRecord> {
    let mut records = Vec::with_capacity(points.len().saturating_sub(1));

    for (i, pair) in points.windows(2).enumerate() {
        let (x0, z0) = pair[0];
        let (x1, z1) = pair[1];
        let (dx, dz) = (x1 - x0, z1 - z0);
        let length = dx.hypot(dz);
        if !(length > MIN_SEGMENT_LENGTH) {
            warn!(
                element = element_id,
                segment = i,
                "skipping zero-length segment"
            );
            continue;
        }

        let mut builder = MeshBuilder::new();
        builder.add_oriented_box(
            (0.0, 0.0),
            (1.0, 0.0),
            (length / 2.0) as f32,
            deck.width / 2.0,
            0.0,
            deck.height,
        );
        let (positions, indices) = builder.finish();

        let center = Vec3::new(((x0 + x1) / 2.0) as f32, deck.y, ((z0 + z1) / 2.0) as f32);
        let yaw = (-dz).atan2(dx) as f32;
        records.push(
            MeshRecord::new(
                deck.category,
                deck.color,
                positions,
                Some(indices),
                Transform::with_yaw(center, yaw),
            )
            .from_element(element_id),
        );
    }

    if records.is_empty() {
        warn!(element = element_id, "skipping road: every segment is degenerate");
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Geometry, element::tags};

    fn projector() -> Projector {
        Projector::new((39.905, 116.395), 0.1).unwrap()
    }

    fn local_extent(record: &MeshRecord, axis: usize) -> f32 {
        let values: Vec<f32> = record.positions.chunks_exact(3).map(|v| v[axis]).collect();
        let hi = values.iter().cloned().fold(f32::MIN, f32::max);
        let lo = values.iter().cloned().fold(f32::MAX, f32::min);
        hi - lo
    }

    #[test]
    fn test_residential_segments() {
        let element = GeoElement::new(
            3,
            tags([("highway", "residential")]),
            Geometry::Line(vec![(39.90, 116.39), (39.905, 116.395), (39.91, 116.40)]),
        );
        let config = RoadConfig::default();
        let baseline = TerrainBaseline::for_tests(2.0);
        let records = build_road(&element, &config, &projector(), baseline);

        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.category, Category::Road);
            assert_eq!(record.color, config.residential.color);
            assert!((local_extent(record, 2) - 0.6).abs() < 1e-5);
            assert!((local_extent(record, 1) - 0.04).abs() < 1e-6);
            let (lo, _) = record.world_bounds().unwrap();
            assert_eq!(lo[1], baseline.y());
        }
    }

    #[test]
    fn test_segment_follows_direction() {
        // due north: local +X must map onto world -Z
        let element = GeoElement::new(
            1,
            tags([("highway", "primary")]),
            Geometry::Line(vec![(39.904, 116.395), (39.906, 116.395)]),
        );
        let records = build_road(
            &element,
            &RoadConfig::default(),
            &projector(),
            TerrainBaseline::for_tests(0.0),
        );
        let (lo, hi) = records[0].world_bounds().unwrap();
        let length = 0.002 * 111_320.0 * 0.1;
        assert!(((hi[2] - lo[2]) as f64 - length).abs() < 1e-2);
        assert!((hi[0] - lo[0] - 1.4).abs() < 1e-3);
    }

    #[test]
    fn test_zero_length_segment_skipped() {
        let element = GeoElement::new(
            4,
            tags([("highway", "service")]),
            Geometry::Line(vec![
                (39.904, 116.394),
                (39.904 + 1e-13, 116.394),
                (39.905, 116.394),
            ]),
        );
        let records = build_road(
            &element,
            &RoadConfig::default(),
            &projector(),
            TerrainBaseline::for_tests(2.0),
        );
        assert_eq!(records.len(), 1);

        let single = GeoElement::new(
            5,
            tags([("highway", "service")]),
            Geometry::Line(vec![(39.904, 116.394), (39.904, 116.394)]),
        );
        assert!(
            build_road(
                &single,
                &RoadConfig::default(),
                &projector(),
                TerrainBaseline::for_tests(2.0)
            )
            .is_empty()
        );
    }

    #[test]
    fn test_closed_way_keeps_closing_segment() {
        let ring = vec![(39.904, 116.394), (39.904, 116.395), (39.905, 116.395)];
        let element = GeoElement::new(8, tags([("highway", "primary")]), Geometry::Area(ring));
        let records = build_road(
            &element,
            &RoadConfig::default(),
            &projector(),
            TerrainBaseline::for_tests(2.0),
        );
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_unknown_class_uses_fallback() {
        let element = GeoElement::new(
            6,
            tags([("highway", "raceway")]),
            Geometry::Line(vec![(39.904, 116.394), (39.905, 116.394)]),
        );
        let config = RoadConfig::default();
        let records = build_road(&element, &config, &projector(), TerrainBaseline::for_tests(2.0));
        assert_eq!(records[0].color, config.fallback.color);
        assert!((local_extent(&records[0], 2) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_bridge_deck_and_pillars() {
        // about 105.75 m long, so 5 pillars at 20 m spacing
        let element = GeoElement::new(
            9,
            tags([("bridge", "yes"), ("highway", "secondary")]),
            Geometry::Line(vec![(39.9040, 116.395), (39.90495, 116.395)]),
        );
        let bridges = BridgeConfig::default();
        let roads = RoadConfig::default();
        let baseline = TerrainBaseline::for_tests(2.0);
        let records = build_bridge(&element, &bridges, &roads, &projector(), baseline);

        assert_eq!(records.len(), 6);
        assert!(records.iter().all(|r| r.category == Category::Bridge));

        let deck = &records[0];
        let underside = baseline.y() + 0.6;
        assert!((deck.transform.position.y - underside).abs() < 1e-6);
        // secondary cross-section, bridge color
        assert!((local_extent(deck, 2) - 1.0).abs() < 1e-5);
        assert_eq!(deck.color, bridges.color);

        for pillar in &records[1..] {
            let (lo, hi) = pillar.world_bounds().unwrap();
            assert_eq!(lo[1], baseline.y());
            assert!((hi[1] - deck.transform.position.y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_bridge_without_pillars() {
        let element = GeoElement::new(
            9,
            tags([("man_made", "bridge")]),
            Geometry::Line(vec![(39.9040, 116.395), (39.90495, 116.395)]),
        );
        let bridges = BridgeConfig {
            pillars: false,
            ..BridgeConfig::default()
        };
        let records = build_bridge(
            &element,
            &bridges,
            &RoadConfig::default(),
            &projector(),
            TerrainBaseline::for_tests(2.0),
        );
        assert_eq!(records.len(), 1);
        // no road class, so the bridge fallback width
        assert!((local_extent(&records[0], 2) - 0.8).abs() < 1e-5);
    }
}
