use geo::{LineString, Simplify};

/// Ramer-Douglas-Peucker simplification of a projected (x, z) polyline
///
/// Endpoints are always kept; polylines with fewer than 3 points are returned as-is.
pub fn simplify_polyline(points: &[(f64, f64)], epsilon: f64) -> Vec<(f64, f64)> {
    if points.len() < 3 || epsilon <= 0.0 {
        return points.to_vec();
    }

    let line: LineString<f64> = points
        .iter()
        .map(|&(x, z)| geo::coord! { x: x, y: z })
        .collect();

    let simplified = line.simplify(&epsilon);

    simplified.0.into_iter().map(|c| (c.x, c.y)).collect()
}

/// Simplification tolerance in meters for a level 0..=3
pub fn epsilon_for_level(level: u8) -> f64 {
    match level {
        0 => 0.0,
        1 => 1.0,
        2 => 3.0,
        _ => 6.0,
    }
}
