use std::io::{Cursor, Write};

use super::buffer::ExportBuffer;
use super::to_print_space;
use crate::error::ExportError;
use crate::mesh::Triangle;

/// Flatten a buffer into print-space facets with normals
pub fn facets(buffer: &ExportBuffer, millimeters_per_unit: f32) -> Vec<Triangle> {
    let mut facets = Vec::with_capacity(buffer.triangle_count());
    for object in &buffer.objects {
        for tri in &object.triangles {
            let [a, b, c] =
                tri.map(|i| to_print_space(object.vertices[i as usize], millimeters_per_unit));
            facets.push(Triangle::new(a, b, c));
        }
    }
    facets
}

/// Write an ASCII STL document
///
/// ```text
/// solid <name>
///   facet normal nx ny nz
///     outer loop
///       vertex x y z   (x3)
///     endloop
///   endfacet
/// endsolid <name>
/// ```
pub fn write_ascii(
    buffer: &ExportBuffer,
    millimeters_per_unit: f32,
    name: &str,
) -> Result<Vec<u8>, ExportError> {
    let facets = facets(buffer, millimeters_per_unit);
    // ~250 bytes of text per facet
    let mut out = Vec::with_capacity(facets.len() * 256 + 64);

    writeln!(out, "solid {name}")?;
    for facet in &facets {
        let [nx, ny, nz] = facet.normal;
        writeln!(out, "  facet normal {nx:.6} {ny:.6} {nz:.6}")?;
        writeln!(out, "    outer loop")?;
        for [x, y, z] in &facet.vertices {
            writeln!(out, "      vertex {x:.6} {y:.6} {z:.6}")?;
        }
        writeln!(out, "    endloop")?;
        writeln!(out, "  endfacet")?;
    }
    writeln!(out, "endsolid {name}")?;

    Ok(out)
}

/// Write a binary STL document with the same facets as [`write_ascii`]
pub fn write_binary(
    buffer: &ExportBuffer,
    millimeters_per_unit: f32,
) -> Result<Vec<u8>, ExportError> {
    let facets = facets(buffer, millimeters_per_unit);
    let mut cursor = Cursor::new(Vec::with_capacity(estimate_stl_size(facets.len())));

    let mesh = facets.iter().map(|facet| stl_io::Triangle {
        normal: stl_io::Normal::new(facet.normal),
        vertices: facet.vertices.map(stl_io::Vertex::new),
    });
    stl_io::write_stl(&mut cursor, mesh)?;

    Ok(cursor.into_inner())
}

/// Get the file size of a binary STL with the given number of triangles
pub fn estimate_stl_size(triangle_count: usize) -> usize {
    // 80 (header) + 4 (count) + triangles * (12 normal + 36 vertices + 2 attribute)
    80 + 4 + triangle_count * 50
}
