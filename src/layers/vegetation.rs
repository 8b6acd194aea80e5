use glam::Vec3;
use rand::Rng;
use tracing::warn;

use super::{TerrainBaseline, dedup_points, detail_count, detail_rng, local_ring};
use crate::config::VegetationConfig;
use crate::domain::{Category, GeoElement};
use crate::geometry::Projector;
use crate::mesh::{MeshBuilder, flat_polygon};
use crate::model::{MeshRecord, Transform};

/// Vegetation canopy plane plus optional trees
///
/// The plane sits at half the canopy height above the baseline. Each tree
/// is its own record: a square trunk standing on the baseline topped by a
/// pyramid crown, placed at a randomly chosen polygon vertex.
pub fn build_vegetation(
    element: &GeoElement,
    config: &VegetationConfig,
    projector: &Projector,
    baseline: TerrainBaseline,
    seed: u64,
) -> Vec<MeshRecord> {
    if !element.is_closed_area() {
        warn!(element = element.id, "skipping vegetation: not a closed area");
        return Vec::new();
    }
    let points = dedup_points(element.points());
    if points.len() < 3 {
        warn!(
            element = element.id,
            points = points.len(),
            "skipping vegetation: needs at least 3 points"
        );
        return Vec::new();
    }

    let (center, ring) = local_ring(projector, &points);
    let plane_y = projector.scale_length(config.height) / 2.0;
    let mut builder = MeshBuilder::new();
    if !flat_polygon(&mut builder, &ring, plane_y) {
        warn!(
            element = element.id,
            "skipping vegetation: polygon could not be triangulated"
        );
        return Vec::new();
    }
    let (positions, indices) = builder.finish();

    let mut records = vec![
        MeshRecord::new(
            Category::Vegetation,
            config.color,
            positions,
            Some(indices),
            Transform::at(Vec3::new(center.0 as f32, baseline.y(), center.1 as f32)),
        )
        .from_element(element.id),
    ];

    if !config.trees {
        return records;
    }

    let trunk_half = projector.scale_length(config.trunk_size) / 2.0;
    let trunk_height = projector.scale_length(config.trunk_height);
    let crown_half = projector.scale_length(config.crown_size) / 2.0;
    let crown_height = projector.scale_length(config.crown_height);
    if trunk_half <= 0.0 || trunk_height <= 0.0 {
        return records;
    }

    let count = detail_count(points.len(), config.tree_density, config.tree_cap);
    let projected = projector.project_points(&points);
    let mut rng = detail_rng(seed, element.id);

    for _ in 0..count {
        let (x, z) = projected[rng.gen_range(0..projected.len())];

        let mut builder = MeshBuilder::new();
        builder.add_box(
            [-trunk_half, 0.0, -trunk_half],
            [trunk_half, trunk_height, trunk_half],
        );
        if crown_half > 0.0 && crown_height > 0.0 {
            builder.add_pyramid((0.0, 0.0), crown_half, trunk_height, trunk_height + crown_height);
        }
        let (positions, indices) = builder.finish();

        records.push(
            MeshRecord::new(
                Category::Vegetation,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Geometry, element::tags};

    fn projector() -> Projector {
        Projector::new((39.905, 116.395), 0.1).unwrap()
    }

    fn park(n: usize) -> GeoElement {
        let ring = (0..n)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / n as f64;
                (39.905 + 0.001 * a.sin(), 116.395 + 0.001 * a.cos())
            })
            .collect();
        GeoElement::new(21, tags([("leisure", "park")]), Geometry::Area(ring))
    }

    #[test]
    fn test_canopy_plane_height() {
        let config = VegetationConfig {
            trees: false,
            height: 4.0,
            ..VegetationConfig::default()
        };
        let baseline = TerrainBaseline::for_tests(2.0);
        let records = build_vegetation(&park(8), &config, &projector(), baseline, 42);
        assert_eq!(records.len(), 1);

        let (lo, hi) = records[0].world_bounds().unwrap();
        // 4 m canopy at 0.1 units per meter, plane at half of it
        assert!((lo[1] - 2.2).abs() < 1e-6);
        assert!((hi[1] - 2.2).abs() < 1e-6);
    }

    #[test]
    fn test_trees() {
        let config = VegetationConfig::default();
        let baseline = TerrainBaseline::for_tests(2.0);

        // floor(8 * 0.5) = 4 trees
        let records = build_vegetation(&park(8), &config, &projector(), baseline, 42);
        assert_eq!(records.len(), 1 + 4);

        for tree in &records[1..] {
            assert_eq!(tree.category, Category::Vegetation);
            // trunk box + crown pyramid
            assert_eq!(tree.triangle_count(), 12 + 6);
            let (lo, hi) = tree.world_bounds().unwrap();
            assert_eq!(lo[1], baseline.y());
            assert!((hi[1] - baseline.y() - 0.9).abs() < 1e-5);
        }

        // floor(60 * 0.5) = 30, capped at 20
        let records = build_vegetation(&park(60), &config, &projector(), baseline, 42);
        assert_eq!(records.len(), 1 + 20);
    }

    #[test]
    fn test_seed_changes_placement() {
        let config = VegetationConfig::default();
        let baseline = TerrainBaseline::for_tests(2.0);
        let a = build_vegetation(&park(60), &config, &projector(), baseline, 1);
        let b = build_vegetation(&park(60), &config, &projector(), baseline, 1);
        let c = build_vegetation(&park(60), &config, &projector(), baseline, 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
