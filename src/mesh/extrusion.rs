use super::MeshBuilder;
use super::triangulation::{signed_area, triangulate_ring};

/// Rewind an (x, z) ring so it runs counter-clockwise seen from above
///
/// With that winding, `(p1 bottom, p2 bottom, p2 top)` wall triangles face outward.
pub fn orient_ring(ring: &[(f32, f32)]) -> Vec<(f32, f32)> {
    if signed_area(ring) > 0.0 {
        ring.iter().rev().copied().collect()
    } else {
        ring.to_vec()
    }
}

/// Extrude an (x, z) footprint into a closed prism between two heights
///
/// Returns false (adding nothing) if the ring cannot be triangulated.
pub fn extrude_polygon(
    builder: &mut MeshBuilder,
    ring: &[(f32, f32)],
    y_bottom: f32,
    y_top: f32,
) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let ring = orient_ring(ring);
    let indices = triangulate_ring(&ring);
    if indices.is_empty() {
        return false;
    }

    for tri in indices.chunks_exact(3) {
        let p0 = ring[tri[0]];
        let p1 = ring[tri[1]];
        let p2 = ring[tri[2]];

        builder.add_horizontal_triangle(
            [p0.0, y_top, p0.1],
            [p1.0, y_top, p1.1],
            [p2.0, y_top, p2.1],
            true,
        );
        builder.add_horizontal_triangle(
            [p0.0, y_bottom, p0.1],
            [p1.0, y_bottom, p1.1],
            [p2.0, y_bottom, p2.1],
            false,
        );
    }

    add_side_walls(builder, &ring, y_bottom, y_top);
    true
}

/// Triangulate an (x, z) ring as a single upward-facing surface at `y`
pub fn flat_polygon(builder: &mut MeshBuilder, ring: &[(f32, f32)], y: f32) -> bool {
    let indices = triangulate_ring(ring);
    if indices.is_empty() {
        return false;
    }

    for tri in indices.chunks_exact(3) {
        let p0 = ring[tri[0]];
        let p1 = ring[tri[1]];
        let p2 = ring[tri[2]];
        builder.add_horizontal_triangle([p0.0, y, p0.1], [p1.0, y, p1.1], [p2.0, y, p2.1], true);
    }
    true
}

fn add_side_walls(builder: &mut MeshBuilder, ring: &[(f32, f32)], y_bottom: f32, y_top: f32) {
    let n = ring.len();

    for i in 0..n {
        let p1 = ring[i];
        let p2 = ring[(i + 1) % n];

        builder.add_quad(
            [p1.0, y_bottom, p1.1],
            [p2.0, y_bottom, p2.1],
            [p2.0, y_top, p2.1],
            [p1.0, y_top, p1.1],
        );
    }
}
