use earcutr::earcut;

/// Ear-clip a simple ring of (x, z) points, returning vertex index triples
///
/// Winding of the returned triangles is not guaranteed; callers orient them.
pub fn triangulate_ring(ring: &[(f32, f32)]) -> Vec<usize> {
    if ring.len() < 3 {
        return Vec::new();
    }

    let vertices: Vec<f64> = ring
        .iter()
        .flat_map(|&(x, z)| [x as f64, z as f64])
        .collect();

    earcut(&vertices, &[], 2).unwrap_or_default()
}

/// Signed shoelace area of an (x, z) ring
///
/// Negative means the ring winds counter-clockwise when seen from above (+Y).
pub fn signed_area(ring: &[(f32, f32)]) -> f32 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n)
        .map(|i| {
            let (x0, z0) = ring[i];
            let (x1, z1) = ring[(i + 1) % n];
            x0 * z1 - x1 * z0
        })
        .sum();
    twice / 2.0
}
