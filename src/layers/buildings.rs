use geo::{Area, LineString, Polygon};
use glam::Vec3;
use tracing::{debug, warn};

use super::{TerrainBaseline, dedup_points, local_ring};
use crate::config::BuildingConfig;
use crate::domain::{BuildingKind, Category, GeoElement, Tags};
use crate::geometry::Projector;
use crate::mesh::{MeshBuilder, extrude_polygon, orient_ring, triangulate_ring};
use crate::model::{MeshRecord, Transform};

/// Floors that receive window decorations at most
const MAX_DECORATED_FLOORS: usize = 40;
/// Windows per wall at most
const MAX_WINDOWS_PER_WALL: usize = 8;

// Decoration dimensions in meters
const WINDOW_SPACING: f64 = 4.0;
const WINDOW_SIZE: f64 = 1.2;
const WINDOW_DEPTH: f64 = 0.2;
const BALCONY_DEPTH: f64 = 1.2;
const BALCONY_WIDTH: f64 = 3.0;
const BALCONY_THICKNESS: f64 = 0.3;
const GLAZING_DEPTH: f64 = 0.15;

/// Share of the inscribed square a roof stack may use
const ROOF_MARGIN: f32 = 0.9;
/// Roof stacks shrunk below this fraction of their size are dropped
const MIN_ROOF_FIT: f32 = 0.25;

/// Extrude a building footprint, based flush on the terrain
///
/// The footprint is re-centered on its vertex centroid and extruded from
/// local y = 0; the record's transform puts that floor on the baseline.
pub fn build_building(
    element: &GeoElement,
    config: &BuildingConfig,
    projector: &Projector,
    baseline: TerrainBaseline,
) -> Option<MeshRecord> {
    let points = dedup_points(element.points());
    if points.len() < 3 {
        warn!(
            element = element.id,
            points = points.len(),
            "skipping building: footprint needs at least 3 points"
        );
        return None;
    }

    let area = footprint_area(&points, projector);
    if area < config.min_footprint_area {
        debug!(
            element = element.id,
            area, "skipping building: footprint below minimum area"
        );
        return None;
    }

    let height = projector.scale_length(resolve_height(&element.tags, config));
    let (center, ring) = local_ring(projector, &points);

    let mut builder = MeshBuilder::new();
    if !extrude_polygon(&mut builder, &ring, 0.0, height) {
        warn!(
            element = element.id,
            "skipping building: footprint could not be triangulated"
        );
        return None;
    }

    if config.decorations {
        let kind = BuildingKind::from_tags(&element.tags);
        decorate(&mut builder, kind, &orient_ring(&ring), height, projector, config);
    }

    let (positions, indices) = builder.finish();
    let position = Vec3::new(center.0 as f32, baseline.y(), center.1 as f32);
    Some(
        MeshRecord::new(
            Category::Building,
            config.color,
            positions,
            Some(indices),
            Transform::at(position),
        )
        .from_element(element.id),
    )
}

/// Real-world building height in meters
///
/// An explicit `height` tag wins; otherwise
/// `max(base_height, levels * level_height, min_height)` where levels come
/// from `levels` or `building:levels`.
pub fn resolve_height(tags: &Tags, config: &BuildingConfig) -> f64 {
    if let Some(height) = tags.get("height").and_then(|v| parse_meters(v)) {
        return height;
    }

    let levels = ["levels", "building:levels"]
        .iter()
        .find_map(|key| tags.get(*key))
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|l| l.is_finite() && *l >= 0.0)
        .unwrap_or(config.default_levels);

    config
        .base_height
        .max(levels * config.level_height)
        .max(config.min_height)
}

/// Parse "12", "12.5m" or "12 m"
fn parse_meters(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix('m').unwrap_or(value).trim_end();
    number
        .parse::<f64>()
        .ok()
        .filter(|h| h.is_finite() && *h > 0.0)
}

/// Footprint area in square meters
///
/// Shoelace on raw lat/lon, converted with the meters-per-degree factors at
/// the projection center. Good enough at city scale.
fn footprint_area(points: &[(f64, f64)], projector: &Projector) -> f64 {
    let ring: Vec<(f64, f64)> = points.iter().map(|&(lat, lon)| (lon, lat)).collect();
    let polygon = Polygon::new(LineString::from(ring), vec![]);
    polygon.unsigned_area() * projector.square_meters_per_square_degree()
}

/// Attach the surface details of a building kind
///
/// `ring` must be oriented with [`orient_ring`] so wall normals are known.
/// Nothing here goes below local y = 0.
fn decorate(
    builder: &mut MeshBuilder,
    kind: BuildingKind,
    ring: &[(f32, f32)],
    height: f32,
    projector: &Projector,
    config: &BuildingConfig,
) {
    let m = |meters: f64| projector.scale_length(meters);
    let level = m(config.level_height);
    let floors = if level > 0.0 {
        ((height / level).floor() as usize).clamp(1, MAX_DECORATED_FLOORS)
    } else {
        1
    };

    let anchor = roof_anchor(ring);

    match kind {
        BuildingKind::Residential => {
            add_windows(builder, ring, floors, level, height, projector);
            if floors >= 2 {
                add_balcony(builder, ring, level, projector);
            }
            add_chimney(builder, anchor, height, m(1.0), m(2.0));
        }
        BuildingKind::Educational => {
            add_windows(builder, ring, floors, level, height, projector);
        }
        BuildingKind::Commercial => {
            add_glazing(builder, ring, level * 0.5, height - m(0.5), projector);
        }
        BuildingKind::Industrial => {
            add_chimney(builder, anchor, height, m(2.0), m(8.0));
        }
        BuildingKind::Religious => {
            if let Some((center, half)) = fit_on_roof(anchor, m(3.0)) {
                builder.add_pyramid(center, half, height, height + m(10.0));
            }
        }
        BuildingKind::Generic => {}
    }
}

/// Unit direction, outward normal and length of the wall from `a` to `b`
fn wall_frame(a: (f32, f32), b: (f32, f32)) -> Option<((f32, f32), (f32, f32), f32)> {
    let (dx, dz) = (b.0 - a.0, b.1 - a.1);
    let len = dx.hypot(dz);
    if len <= f32::EPSILON {
        return None;
    }
    let dir = (dx / len, dz / len);
    Some((dir, (-dir.1, dir.0), len))
}

/// Box flush against the outside of a wall, centered at fraction `t` along it
#[allow(clippy::too_many_arguments)]
fn add_wall_box(
    builder: &mut MeshBuilder,
    a: (f32, f32),
    dir: (f32, f32),
    normal: (f32, f32),
    along: f32,
    width: f32,
    depth: f32,
    y_bottom: f32,
    y_top: f32,
) {
    let center = (
        a.0 + dir.0 * along + normal.0 * depth / 2.0,
        a.1 + dir.1 * along + normal.1 * depth / 2.0,
    );
    builder.add_oriented_box(center, dir, width / 2.0, depth / 2.0, y_bottom, y_top);
}

fn walls(ring: &[(f32, f32)]) -> impl Iterator<Item = ((f32, f32), (f32, f32))> + '_ {
    (0..ring.len()).map(move |i| (ring[i], ring[(i + 1) % ring.len()]))
}

fn longest_wall(ring: &[(f32, f32)]) -> Option<((f32, f32), (f32, f32), f32)> {
    walls(ring)
        .filter_map(|(a, b)| wall_frame(a, b).map(|(_, _, len)| (a, b, len)))
        .max_by(|x, y| x.2.total_cmp(&y.2))
}

fn add_windows(
    builder: &mut MeshBuilder,
    ring: &[(f32, f32)],
    floors: usize,
    level: f32,
    height: f32,
    projector: &Projector,
) {
    let spacing = projector.scale_length(WINDOW_SPACING);
    let size = projector.scale_length(WINDOW_SIZE);
    let depth = projector.scale_length(WINDOW_DEPTH);

    for (a, b) in walls(ring) {
        let Some((dir, normal, len)) = wall_frame(a, b) else {
            continue;
        };
        let count = ((len / spacing).floor() as usize).min(MAX_WINDOWS_PER_WALL);
        for floor in 0..floors {
            let y_center = (floor as f32 + 0.5) * level;
            let (y_bottom, y_top) = (y_center - size / 2.0, y_center + size / 2.0);
            if y_bottom < 0.0 || y_top > height {
                continue;
            }
            for k in 0..count {
                let along = len * (k as f32 + 0.5) / count as f32;
                add_wall_box(builder, a, dir, normal, along, size, depth, y_bottom, y_top);
            }
        }
    }
}

fn add_balcony(builder: &mut MeshBuilder, ring: &[(f32, f32)], level: f32, projector: &Projector) {
    let Some((a, b, len)) = longest_wall(ring) else {
        return;
    };
    let Some((dir, normal, _)) = wall_frame(a, b) else {
        return;
    };
    let width = projector.scale_length(BALCONY_WIDTH).min(len * 0.5);
    let depth = projector.scale_length(BALCONY_DEPTH);
    let thickness = projector.scale_length(BALCONY_THICKNESS);
    add_wall_box(
        builder,
        a,
        dir,
        normal,
        len / 2.0,
        width,
        depth,
        level,
        level + thickness,
    );
}

fn add_glazing(
    builder: &mut MeshBuilder,
    ring: &[(f32, f32)],
    y_bottom: f32,
    y_top: f32,
    projector: &Projector,
) {
    if y_top <= y_bottom {
        return;
    }
    let Some((a, b, len)) = longest_wall(ring) else {
        return;
    };
    let Some((dir, normal, _)) = wall_frame(a, b) else {
        return;
    };
    let depth = projector.scale_length(GLAZING_DEPTH);
    add_wall_box(
        builder,
        a,
        dir,
        normal,
        len / 2.0,
        len * 0.8,
        depth,
        y_bottom,
        y_top,
    );
}

/// Center and half size of the largest square known to lie on the roof
///
/// The square is inscribed in the incircle of the ear-clipped triangle with
/// the largest inradius, so it stays inside the footprint even when the
/// footprint is concave and its centroid falls outside it.
fn roof_anchor(ring: &[(f32, f32)]) -> Option<((f32, f32), f32)> {
    triangulate_ring(ring)
        .chunks_exact(3)
        .filter_map(|t| incircle(ring[t[0]], ring[t[1]], ring[t[2]]))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(center, radius)| (center, radius * ROOF_MARGIN / std::f32::consts::SQRT_2))
}

/// Incenter and inradius of a triangle, None when degenerate
fn incircle(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> Option<((f32, f32), f32)> {
    let la = (c.0 - b.0).hypot(c.1 - b.1);
    let lb = (a.0 - c.0).hypot(a.1 - c.1);
    let lc = (b.0 - a.0).hypot(b.1 - a.1);
    let perimeter = la + lb + lc;
    let twice_area = ((b.0 - a.0) * (c.1 - a.1) - (c.0 - a.0) * (b.1 - a.1)).abs();
    if perimeter <= f32::EPSILON || twice_area <= f32::EPSILON {
        return None;
    }
    let center = (
        (la * a.0 + lb * b.0 + lc * c.0) / perimeter,
        (la * a.1 + lb * b.1 + lc * c.1) / perimeter,
    );
    Some((center, twice_area / perimeter))
}

/// Shrink a roof stack of half size `wanted` to fit the anchor square
///
/// None when there is no anchor or the stack would shrink too far.
fn fit_on_roof(anchor: Option<((f32, f32), f32)>, wanted: f32) -> Option<((f32, f32), f32)> {
    let (center, max_half) = anchor?;
    let half = wanted.min(max_half);
    (half > 0.0 && half >= wanted * MIN_ROOF_FIT).then_some((center, half))
}

/// Square stack standing on the roof at the anchor
fn add_chimney(
    builder: &mut MeshBuilder,
    anchor: Option<((f32, f32), f32)>,
    roof: f32,
    size: f32,
    rise: f32,
) {
    let Some(((cx, cz), half)) = fit_on_roof(anchor, size / 2.0) else {
        return;
    };
    builder.add_box([cx - half, roof, cz - half], [cx + half, roof + rise, cz + half]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Geometry, element::tags};
    use crate::geometry::filter::point_in_polygon;

    fn projector() -> Projector {
        Projector::new((39.905, 116.395), 0.1).unwrap()
    }

    fn footprint() -> Vec<(f64, f64)> {
        vec![
            (39.9040, 116.3940),
            (39.9040, 116.3944),
            (39.9044, 116.3944),
            (39.9044, 116.3940),
        ]
    }

    fn building(pairs: &[(&str, &str)]) -> GeoElement {
        GeoElement::new(7, tags(pairs.iter().copied()), Geometry::Area(footprint()))
    }

    fn y_range(record: &MeshRecord) -> (f32, f32) {
        let (lo, hi) = record.world_bounds().unwrap();
        (lo[1], hi[1])
    }

    #[test]
    fn test_levels_height_and_flush_base() {
        let baseline = TerrainBaseline::for_tests(2.0);
        let element = building(&[("building", "yes"), ("levels", "5")]);
        let record =
            build_building(&element, &BuildingConfig::default(), &projector(), baseline).unwrap();

        assert_eq!(record.category, Category::Building);
        assert_eq!(record.element_id, Some(7));
        let (bottom, top) = y_range(&record);
        assert_eq!(bottom, baseline.y());
        assert!((top - bottom - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_resolve_height() {
        let config = BuildingConfig::default();
        assert_eq!(resolve_height(&tags([("height", "12 m")]), &config), 12.0);
        assert_eq!(resolve_height(&tags([("height", "7.5m")]), &config), 7.5);
        assert_eq!(resolve_height(&tags([("levels", "4")]), &config), 12.0);
        assert_eq!(resolve_height(&tags([("building:levels", "2")]), &config), 6.0);
        // default levels
        assert_eq!(resolve_height(&tags([("building", "yes")]), &config), 9.0);
        // unparseable height falls back to levels; 0 levels clamps to the minimum
        assert_eq!(
            resolve_height(&tags([("height", "tall"), ("levels", "0")]), &config),
            3.0
        );
    }

    #[test]
    fn test_too_few_points() {
        let element = GeoElement::new(
            1,
            tags([("building", "yes")]),
            Geometry::Line(vec![(39.904, 116.394), (39.905, 116.395)]),
        );
        let baseline = TerrainBaseline::for_tests(2.0);
        assert!(
            build_building(&element, &BuildingConfig::default(), &projector(), baseline).is_none()
        );
    }

    #[test]
    fn test_small_footprint_is_ignored() {
        // roughly 1 m by 1 m
        let tiny = vec![
            (39.90400, 116.39400),
            (39.90400, 116.39401),
            (39.90401, 116.39401),
            (39.90401, 116.39400),
        ];
        let element = GeoElement::new(1, tags([("building", "yes")]), Geometry::Area(tiny));
        let baseline = TerrainBaseline::for_tests(2.0);
        let config = BuildingConfig::default();
        assert!(build_building(&element, &config, &projector(), baseline).is_none());

        let permissive = BuildingConfig {
            min_footprint_area: 0.0,
            ..config
        };
        assert!(build_building(&element, &permissive, &projector(), baseline).is_some());
    }

    #[test]
    fn test_footprint_area() {
        // 0.0004 deg of latitude by 0.0004 deg of longitude at 39.905 N
        let area = footprint_area(&footprint(), &projector());
        let expected = (0.0004 * 111_320.0) * (0.0004 * 111_320.0 * 39.905f64.to_radians().cos());
        assert!((area - expected).abs() / expected < 1e-6);
    }

    #[test]
    fn test_decorations_stay_above_base() {
        let baseline = TerrainBaseline::for_tests(2.0);
        let config = BuildingConfig::default();
        let plain = build_building(
            &building(&[("building", "yes"), ("levels", "5")]),
            &config,
            &projector(),
            baseline,
        )
        .unwrap();

        for kind in ["apartments", "commercial", "industrial", "church", "school"] {
            let element = building(&[("building", kind), ("levels", "5")]);
            let record = build_building(&element, &config, &projector(), baseline).unwrap();
            assert!(
                record.triangle_count() > plain.triangle_count(),
                "{kind} has no decorations"
            );
            assert_eq!(y_range(&record).0, baseline.y(), "{kind} floats or sinks");
        }
    }

    #[test]
    fn test_spire_rises_above_roof() {
        let baseline = TerrainBaseline::for_tests(2.0);
        let element = building(&[("building", "church"), ("levels", "5")]);
        let record =
            build_building(&element, &BuildingConfig::default(), &projector(), baseline).unwrap();
        let (_, top) = y_range(&record);
        assert!((top - baseline.y() - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_decorations_disabled() {
        let baseline = TerrainBaseline::for_tests(2.0);
        let config = BuildingConfig {
            decorations: false,
            ..BuildingConfig::default()
        };
        let element = building(&[("building", "apartments")]);
        let record = build_building(&element, &config, &projector(), baseline).unwrap();
        // a 4-sided prism: 2 top, 2 bottom, 8 wall triangles
        assert_eq!(record.triangle_count(), 12);
    }

    /// Footprint given in meters east/north of the projection center
    fn footprint_from_meters(corners: &[(f64, f64)]) -> Vec<(f64, f64)> {
        let meters_per_lon = 111_320.0 * 39.905f64.to_radians().cos();
        corners
            .iter()
            .map(|&(east, north)| (39.905 + north / 111_320.0, 116.395 + east / meters_per_lon))
            .collect()
    }

    /// 60 x 60 m with a 40 m wide, 45 m deep notch; its vertex centroid is in the notch
    fn u_shape() -> Vec<(f64, f64)> {
        footprint_from_meters(&[
            (0.0, 0.0),
            (60.0, 0.0),
            (60.0, 60.0),
            (50.0, 60.0),
            (50.0, 15.0),
            (10.0, 15.0),
            (10.0, 60.0),
            (0.0, 60.0),
        ])
    }

    /// Vertices above the roof whose plan position is off the footprint
    fn overhanging(record: &MeshRecord, points: &[(f64, f64)], roof: f32) -> usize {
        let outline = projector().project_points(points);
        record
            .world_vertices()
            .iter()
            .filter(|v| v[1] > roof + 1e-4)
            .filter(|v| !point_in_polygon((v[0] as f64, v[2] as f64), &outline))
            .count()
    }

    #[test]
    fn test_roof_stacks_stay_on_concave_footprint() {
        let baseline = TerrainBaseline::for_tests(2.0);
        let config = BuildingConfig::default();
        let points = u_shape();
        let roof = baseline.y() + 1.5;

        for kind in ["church", "industrial"] {
            let tagged = tags([("building", kind), ("levels", "5")]);
            let element = GeoElement::new(9, tagged, Geometry::Area(points.clone()));
            let record = build_building(&element, &config, &projector(), baseline).unwrap();

            let (_, top) = y_range(&record);
            assert!(top > roof + 0.1, "{kind} lost its roof stack");
            assert_eq!(overhanging(&record, &points, roof), 0, "{kind} overhangs the footprint");
        }
    }

    #[test]
    fn test_spire_shrinks_on_narrow_footprint() {
        let baseline = TerrainBaseline::for_tests(2.0);
        let points = footprint_from_meters(&[(0.0, 0.0), (4.0, 0.0), (4.0, 30.0), (0.0, 30.0)]);
        let element = GeoElement::new(
            11,
            tags([("building", "chapel"), ("levels", "2")]),
            Geometry::Area(points.clone()),
        );
        let config = BuildingConfig {
            min_footprint_area: 0.0,
            ..BuildingConfig::default()
        };
        let record = build_building(&element, &config, &projector(), baseline).unwrap();
        let roof = baseline.y() + 0.6;
        let (_, top) = y_range(&record);
        assert!((top - roof - 1.0).abs() < 1e-4, "spire missing");
        assert_eq!(overhanging(&record, &points, roof), 0);
    }

    #[test]
    fn test_roof_anchor_inside_triangle() {
        let ((x, z), half) = roof_anchor(&[(0.0, 0.0), (3.0, 0.0), (0.0, 4.0)]).unwrap();
        // 3-4-5 triangle: inradius 1 at (1, 1)
        assert!((x - 1.0).abs() < 1e-5 && (z - 1.0).abs() < 1e-5);
        assert!((half - ROOF_MARGIN / std::f32::consts::SQRT_2).abs() < 1e-5);
        assert!(roof_anchor(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]).is_none());
    }
}
