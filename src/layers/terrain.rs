use glam::Vec3;
use tracing::debug;

use crate::config::TerrainConfig;
use crate::domain::{BoundingBox, Category};
use crate::error::PassError;
use crate::geometry::{Projector, haversine_distance};
use crate::mesh::MeshBuilder;
use crate::model::{MeshRecord, Transform};

/// Y of the terrain slab's top face; every other layer stands on it
///
/// Only [`build_terrain`] can produce one, so a pass cannot build elements
/// before the terrain exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainBaseline(f32);

impl TerrainBaseline {
    pub fn y(self) -> f32 {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn for_tests(y: f32) -> Self {
        Self(y)
    }
}

/// Build the ground slab covering the bounding box
///
/// The plan size is the great-circle width and depth across the box
/// middle, scaled to generation units and centered on the origin. The slab
/// spans y = 0 to y = thickness, which becomes the baseline.
///
/// Elements are projected equirectangularly at 111 320 m per degree while
/// the slab uses the haversine radius (about 111 195 m per degree), so the
/// slab is roughly 0.1% smaller than the projected box. Geometry on the box
/// edge can overhang the slab by that much.
pub fn build_terrain(
    bbox: &BoundingBox,
    config: &TerrainConfig,
    projector: &Projector,
) -> Result<(MeshRecord, TerrainBaseline), PassError> {
    let thickness = config.thickness;
    if !thickness.is_finite() || thickness <= 0.0 {
        return Err(PassError::NoBaseline("terrain thickness must be positive"));
    }

    let (center_lat, center_lon) = bbox.center();
    let width_m = haversine_distance((center_lat, bbox.west), (center_lat, bbox.east));
    let depth_m = haversine_distance((bbox.south, center_lon), (bbox.north, center_lon));

    let width = projector.scale_length(width_m);
    let depth = projector.scale_length(depth_m);
    if !(width.is_finite() && depth.is_finite() && width > 0.0 && depth > 0.0) {
        return Err(PassError::NoBaseline("terrain footprint is empty"));
    }

    debug!(width_m, depth_m, thickness, "building terrain slab");

    let mut builder = MeshBuilder::new();
    builder.add_box(
        [-width / 2.0, 0.0, -depth / 2.0],
        [width / 2.0, thickness, depth / 2.0],
    );
    let (positions, indices) = builder.finish();

    let record = MeshRecord::new(
        Category::Terrain,
        config.color,
        positions,
        Some(indices),
        Transform::at(Vec3::ZERO),
    );

    Ok((record, TerrainBaseline(thickness)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beijing() -> BoundingBox {
        BoundingBox::new(39.91, 39.90, 116.40, 116.39)
    }

    #[test]
    fn test_terrain_slab() {
        let bbox = beijing();
        let projector = Projector::new(bbox.center(), 0.1).unwrap();
        let (record, baseline) =
            build_terrain(&bbox, &TerrainConfig::default(), &projector).unwrap();

        assert_eq!(baseline.y(), 2.0);
        assert_eq!(record.category, Category::Terrain);
        assert_eq!(record.triangle_count(), 12);

        let (lo, hi) = record.world_bounds().unwrap();
        assert_eq!(lo[1], 0.0);
        assert_eq!(hi[1], baseline.y());
        // 0.01 degrees of latitude is about 1112 m, 111 units at 0.1
        assert!((hi[2] - lo[2] - 111.2).abs() < 0.5);
        // longitude shrinks by cos(39.905)
        assert!((hi[0] - lo[0] - 85.3).abs() < 0.5);
    }

    #[test]
    fn test_slab_tracks_projected_box() {
        let bbox = beijing();
        let projector = Projector::new(bbox.center(), 0.1).unwrap();
        let (record, _) = build_terrain(&bbox, &TerrainConfig::default(), &projector).unwrap();
        let (lo, hi) = record.world_bounds().unwrap();

        let (west, north) = projector.project(bbox.north, bbox.west);
        let (east, south) = projector.project(bbox.south, bbox.east);
        let projected_width = (east - west) as f32;
        let projected_depth = (south - north) as f32;

        let width = hi[0] - lo[0];
        let depth = hi[2] - lo[2];
        assert!(width <= projected_width && depth <= projected_depth);
        assert!((projected_width - width) / projected_width < 0.002);
        assert!((projected_depth - depth) / projected_depth < 0.002);
    }

    #[test]
    fn test_terrain_rejects_bad_thickness() {
        let bbox = beijing();
        let projector = Projector::new(bbox.center(), 0.1).unwrap();
        let config = TerrainConfig {
            thickness: 0.0,
            ..TerrainConfig::default()
        };
        assert!(matches!(
            build_terrain(&bbox, &config, &projector),
            Err(PassError::NoBaseline(_))
        ));
    }
}
