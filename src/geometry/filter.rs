//! Spatial filtering of elements against the selection region.
//!
//! All tests run on raw (lat, lon) coordinates, before projection.

use crate::domain::{BoundingBox, GeoElement};

/// Decide whether an element touches the selection region
///
/// # Algorithm
/// 1. Reject if the element's own bounds do not overlap `bbox`
/// 2. Accept if any vertex lies inside `bbox` (inclusive)
/// 3. Accept if any edge's bounds overlap `bbox` (closing edge only for closed areas)
/// 4. Accept if a closed area contains all four corners of `bbox`
pub fn intersects(element: &GeoElement, bbox: &BoundingBox) -> bool {
    let points = element.points();

    let Some(bounds) = BoundingBox::from_points(points) else {
        return false;
    };
    if !bounds.overlaps(bbox) {
        return false;
    }

    if points.iter().any(|&(lat, lon)| bbox.contains(lat, lon)) {
        return true;
    }

    let closed = element.is_closed_area();

    if points.len() >= 2
        && edges(points, closed).any(|(a, b)| segment_bounds_overlap(a, b, bbox))
    {
        return true;
    }

    closed
        && points.len() >= 3
        && bbox
            .corners()
            .iter()
            .all(|&corner| point_in_polygon(corner, points))
}

/// Consecutive edges of a point list, plus the closing edge when `closed`
fn edges(
    points: &[(f64, f64)],
    closed: bool,
) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
    let open = points.windows(2).map(|w| (w[0], w[1]));
    let closing = match (closed, points.first(), points.last()) {
        (true, Some(&first), Some(&last)) if points.len() >= 3 => Some((last, first)),
        _ => None,
    };
    open.chain(closing)
}

/// Coarse segment/rectangle test: compares the segment's bounds with the box
fn segment_bounds_overlap(a: (f64, f64), b: (f64, f64), bbox: &BoundingBox) -> bool {
    let segment = BoundingBox::new(a.0.max(b.0), a.0.min(b.0), a.1.max(b.1), a.1.min(b.1));
    segment.overlaps(bbox)
}

/// Ray-casting point-in-polygon test on (lat, lon) pairs
pub fn point_in_polygon(point: (f64, f64), ring: &[(f64, f64)]) -> bool {
    let (py, px) = point;
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);

    for i in 0..ring.len() {
        let (yi, xi) = ring[i];
        let (yj, xj) = ring[j];

        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::element::tags;
    use crate::domain::{Geometry, Tags};

    fn bbox() -> BoundingBox {
        BoundingBox::new(39.91, 39.90, 116.40, 116.39)
    }

    fn line(points: Vec<(f64, f64)>) -> GeoElement {
        GeoElement::new(1, Tags::new(), Geometry::Line(points))
    }

    fn area(points: Vec<(f64, f64)>) -> GeoElement {
        GeoElement::new(2, tags([("natural", "water")]), Geometry::Area(points))
    }

    #[test]
    fn test_empty_geometry_rejected() {
        assert!(!intersects(&line(vec![]), &bbox()));
    }

    #[test]
    fn test_fully_outside_rejected() {
        let element = line(vec![(40.0, 117.0), (40.1, 117.1)]);
        assert!(!intersects(&element, &bbox()));
    }

    #[test]
    fn test_single_vertex_inside_accepted() {
        let element = line(vec![(39.905, 116.395), (40.5, 117.5)]);
        assert!(intersects(&element, &bbox()));

        let point = GeoElement::new(3, Tags::new(), Geometry::Point((39.905, 116.395)));
        assert!(intersects(&point, &bbox()));
    }

    #[test]
    fn test_crossing_edge_accepted() {
        // Runs straight through the box without a vertex inside it
        let element = line(vec![(39.905, 116.38), (39.905, 116.41)]);
        assert!(intersects(&element, &bbox()));
    }

    #[test]
    fn test_corner_hugging_line_rejected() {
        // Overall bounds overlap the box, but each edge stays clear of it
        let element = line(vec![(39.92, 116.38), (39.92, 116.41), (39.89, 116.41)]);
        assert!(!intersects(&element, &bbox()));
    }

    #[test]
    fn test_containing_area_accepted() {
        let ring = vec![(39.8, 116.3), (39.8, 116.5), (40.0, 116.5), (40.0, 116.3)];
        assert!(intersects(&area(ring.clone()), &bbox()));

        // the same ring tagged area=no has no interior
        let open = GeoElement::new(4, tags([("area", "no")]), Geometry::Area(ring));
        assert!(!intersects(&open, &bbox()));
    }

    #[test]
    fn test_closing_edge_only_counts_when_closed() {
        // Only the last -> first edge passes through the box
        let ring = vec![
            (39.905, 116.41),
            (39.95, 116.41),
            (39.95, 116.38),
            (39.905, 116.38),
        ];
        assert!(intersects(&area(ring.clone()), &bbox()));

        let open = GeoElement::new(
            5,
            tags([("natural", "water"), ("area", "no")]),
            Geometry::Area(ring),
        );
        assert!(!intersects(&open, &bbox()));
    }

    #[test]
    fn test_point_in_polygon() {
        let square = vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];
        assert!(point_in_polygon((0.5, 0.5), &square));
        assert!(!point_in_polygon((1.5, 0.5), &square));
        assert!(!point_in_polygon((0.5, 0.5), &[]));
    }
}
