//! Per-category mesh builders.
//!
//! Every builder reads the element, its category config, the pass projector
//! and the terrain baseline, and returns zero or more records. An empty result
//! means the element was skipped; the reason has already been logged.

pub mod buildings;
pub mod roads;
pub mod terrain;
pub mod vegetation;
pub mod water;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::GenerationConfig;
use crate::domain::{Category, GeoElement};
use crate::geometry::Projector;
use crate::model::MeshRecord;

pub use buildings::{build_building, resolve_height};
pub use roads::{build_bridge, build_road};
pub use terrain::{TerrainBaseline, build_terrain};
pub use vegetation::build_vegetation;
pub use water::build_water;

/// Hand a classified element to its category builder
pub fn build_element(
    element: &GeoElement,
    category: Category,
    config: &GenerationConfig,
    projector: &Projector,
    baseline: TerrainBaseline,
) -> Vec<MeshRecord> {
    match category {
        Category::Building => build_building(element, &config.buildings, projector, baseline)
            .into_iter()
            .collect(),
        Category::Road => build_road(element, &config.roads, projector, baseline),
        Category::Bridge => {
            build_bridge(element, &config.bridges, &config.roads, projector, baseline)
        }
        Category::Water => build_water(element, &config.water, projector, baseline, config.seed),
        Category::Vegetation => {
            build_vegetation(element, &config.vegetation, projector, baseline, config.seed)
        }
        Category::Terrain | Category::Unclassified => Vec::new(),
    }
}

/// Drop consecutive duplicate points
pub(crate) fn dedup_consecutive(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut out: Vec<(f64, f64)> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last() != Some(&p) {
            out.push(p);
        }
    }
    out
}

/// Drop consecutive duplicate points and a repeated closing point
pub(crate) fn dedup_points(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut out = dedup_consecutive(points);
    if out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// Project a ring and re-center it on its vertex centroid
///
/// Returns the centroid in projected units and the ring relative to it.
pub(crate) fn local_ring(
    projector: &Projector,
    points: &[(f64, f64)],
) -> ((f64, f64), Vec<(f32, f32)>) {
    let projected = projector.project_points(points);
    let n = projected.len().max(1) as f64;
    let (sx, sz) = projected
        .iter()
        .fold((0.0, 0.0), |(sx, sz), &(x, z)| (sx + x, sz + z));
    let center = (sx / n, sz / n);

    let ring = projected
        .iter()
        .map(|&(x, z)| ((x - center.0) as f32, (z - center.1) as f32))
        .collect();
    (center, ring)
}

/// Number of detail objects for a polygon: `min(cap, floor(points * density))`
pub(crate) fn detail_count(points: usize, density: f64, cap: usize) -> usize {
    let wanted = points as f64 * density;
    if !wanted.is_finite() || wanted < 1.0 {
        return 0;
    }
    (wanted.floor() as usize).min(cap)
}

/// Deterministic per-element generator for detail placement
pub(crate) fn detail_rng(seed: u64, element_id: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed ^ element_id.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}
