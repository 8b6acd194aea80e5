//! Geometry validation for mesh records and exported triangles
//!
//! Records are checked before they enter the registry and again before export:
//! - a position buffer must exist and hold whole (x, y, z) triples
//! - every coordinate (and the transform) must be finite
//! - an index buffer, when present, must hold whole triangles
//!
//! Triangle-level checks (degenerate area, non-finite corners) run during export.

use std::fmt;

use crate::model::MeshRecord;

/// Minimum area threshold for non-degenerate triangles (in square units)
const MIN_TRIANGLE_AREA: f32 = 1e-10;

/// Why a record was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    NoPositions,
    RaggedPositions(usize),
    NonFiniteCoordinate(usize),
    NonFiniteTransform,
    RaggedIndices(usize),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::NoPositions => write!(f, "no position data"),
            ValidationIssue::RaggedPositions(len) => {
                write!(f, "position buffer length {} is not a multiple of 3", len)
            }
            ValidationIssue::NonFiniteCoordinate(i) => {
                write!(f, "coordinate {} is NaN or infinite", i)
            }
            ValidationIssue::NonFiniteTransform => write!(f, "transform is NaN or infinite"),
            ValidationIssue::RaggedIndices(len) => {
                write!(f, "index buffer length {} is not a multiple of 3", len)
            }
        }
    }
}

/// Check a record, reporting the first issue found
pub fn check(record: &MeshRecord) -> Result<(), ValidationIssue> {
    let positions = &record.positions;
    if positions.is_empty() {
        return Err(ValidationIssue::NoPositions);
    }
    if positions.len() % 3 != 0 {
        return Err(ValidationIssue::RaggedPositions(positions.len()));
    }
    if let Some(i) = positions.iter().position(|c| !c.is_finite()) {
        return Err(ValidationIssue::NonFiniteCoordinate(i));
    }
    if !record.transform.is_finite() {
        return Err(ValidationIssue::NonFiniteTransform);
    }
    if let Some(indices) = &record.indices
        && indices.len() % 3 != 0
    {
        return Err(ValidationIssue::RaggedIndices(indices.len()));
    }
    Ok(())
}

/// Accept or reject a record
pub fn validate(record: &MeshRecord) -> bool {
    check(record).is_ok()
}

/// Check if a triangle has any invalid (NaN/Inf) coordinates
pub fn has_invalid_coords(vertices: &[[f32; 3]; 3]) -> bool {
    vertices
        .iter()
        .any(|vertex| vertex.iter().any(|coord| !coord.is_finite()))
}

/// Check if a triangle is degenerate (zero or near-zero area)
pub fn is_degenerate(vertices: &[[f32; 3]; 3]) -> bool {
    triangle_area(vertices) < MIN_TRIANGLE_AREA
}

/// Calculate the area of a triangle from its vertices
fn triangle_area(vertices: &[[f32; 3]; 3]) -> f32 {
    let v0 = vertices[0];
    let v1 = vertices[1];
    let v2 = vertices[2];

    let edge_a = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
    let edge_b = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];

    let cx = edge_a[1] * edge_b[2] - edge_a[2] * edge_b[1];
    let cy = edge_a[2] * edge_b[0] - edge_a[0] * edge_b[2];
    let cz = edge_a[0] * edge_b[1] - edge_a[1] * edge_b[0];

    0.5 * (cx * cx + cy * cy + cz * cz).sqrt()
}
