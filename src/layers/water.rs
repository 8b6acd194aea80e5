use glam::Vec3;
use rand::Rng;
use tracing::warn;

use super::{TerrainBaseline, dedup_points, detail_count, detail_rng, local_ring};
use crate::config::WaterConfig;
use crate::domain::{Category, GeoElement};
use crate::geometry::Projector;
use crate::mesh::{MeshBuilder, flat_polygon};
use crate::model::{MeshRecord, Transform};

const RIPPLE_SEGMENTS: usize = 16;
/// Inner radius of a ripple ring as a fraction of its outer radius
const RIPPLE_INNER: f32 = 0.6;

/// Flat water surface on the baseline, plus optional ripple rings
///
/// Ripples are placed at randomly chosen polygon vertices, not inside the
/// area.
pub fn build_water(
    element: &GeoElement,
    config: &WaterConfig,
    projector: &Projector,
    baseline: TerrainBaseline,
    seed: u64,
) -> Vec<MeshRecord> {
    if !element.is_closed_area() {
        warn!(element = element.id, "skipping water: not a closed area");
        return Vec::new();
    }
    let points = dedup_points(element.points());
    if points.len() < 3 {
        warn!(
            element = element.id,
            points = points.len(),
            "skipping water: needs at least 3 points"
        );
        return Vec::new();
    }

    let (center, ring) = local_ring(projector, &points);
    let mut builder = MeshBuilder::new();
    if !flat_polygon(&mut builder, &ring, 0.0) {
        warn!(element = element.id, "skipping water: polygon could not be triangulated");
        return Vec::new();
    }
    let (positions, indices) = builder.finish();

    let mut records = vec![
        MeshRecord::new(
            Category::Water,
            config.color,
            positions,
            Some(indices),
            Transform::at(Vec3::new(center.0 as f32, baseline.y(), center.1 as f32)),
        )
        .from_element(element.id),
    ];

    let radius = projector.scale_length(config.ripple_radius);
    let height = projector.scale_length(config.ripple_height);
    if !config.ripples || radius <= 0.0 || height <= 0.0 {
        return records;
    }

    let count = detail_count(points.len(), config.ripple_density, config.ripple_cap);
    let projected = projector.project_points(&points);
    let mut rng = detail_rng(seed, element.id);

    for _ in 0..count {
        let (x, z) = projected[rng.gen_range(0..projected.len())];

        let mut builder = MeshBuilder::new();
        builder.add_washer(
            (0.0, 0.0),
            radius * RIPPLE_INNER,
            radius,
            0.0,
            height,
            RIPPLE_SEGMENTS,
        );
        let (positions, indices) = builder.finish();
        records.push(
            MeshRecord::new(
                Category::Water,
                config.color,
                positions,
                Some(indices),
                Transform::at(Vec3::new(x as f32, baseline.y(), z as f32)),
            )
            .from_element(element.id),
        );
    }

    records
}
