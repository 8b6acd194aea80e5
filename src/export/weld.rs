//! Tolerance-based vertex welding.
//!
//! Vertices are snapped to a grid of cell size `tolerance`; all vertices in one
//! cell collapse onto the first one seen. A welded vertex may move by up to
//! one cell diagonal (`tolerance * sqrt(3)`), which is the documented
//! precision loss. Vertices that straddle a cell boundary are not merged even
//! when closer than `tolerance`.

use std::collections::HashMap;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeldStats {
    pub vertices_before: usize,
    pub vertices_after: usize,
    /// Triangles that collapsed onto an edge or a point
    pub triangles_dropped: usize,
}

/// Merge near-duplicate vertices and drop triangles that collapse
///
/// A non-positive or non-finite tolerance leaves the mesh untouched.
pub fn weld(
    vertices: &[[f32; 3]],
    triangles: &[[u32; 3]],
    tolerance: f32,
) -> (Vec<[f32; 3]>, Vec<[u32; 3]>, WeldStats) {
    if !tolerance.is_finite() || tolerance <= 0.0 {
        let stats = WeldStats {
            vertices_before: vertices.len(),
            vertices_after: vertices.len(),
            triangles_dropped: 0,
        };
        return (vertices.to_vec(), triangles.to_vec(), stats);
    }

    let mut cells: HashMap<[i64; 3], u32> = HashMap::with_capacity(vertices.len());
    let mut welded: Vec<[f32; 3]> = Vec::with_capacity(vertices.len());
    let remap: Vec<u32> = vertices
        .iter()
        .map(|v| {
            let key = v.map(|c| (c / tolerance).round() as i64);
            *cells.entry(key).or_insert_with(|| {
                welded.push(*v);
                (welded.len() - 1) as u32
            })
        })
        .collect();

    let mut out = Vec::with_capacity(triangles.len());
    for tri in triangles {
        let [a, b, c] = tri.map(|i| remap[i as usize]);
        if a != b && b != c && a != c {
            out.push([a, b, c]);
        }
    }

    let stats = WeldStats {
        vertices_before: vertices.len(),
        vertices_after: welded.len(),
        triangles_dropped: triangles.len() - out.len(),
    };
    debug!(
        before = stats.vertices_before,
        after = stats.vertices_after,
        dropped = stats.triangles_dropped,
        "welded vertices"
    );

    (welded, out, stats)
}
