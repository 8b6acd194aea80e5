/// A triangle with its facet normal, as written to STL
#[derive(Debug, Clone)]
pub struct Triangle {
    /// Three vertices: [[x, y, z], [x, y, z], [x, y, z]]
    pub vertices: [[f32; 3]; 3],
    /// Normal vector [nx, ny, nz]
    pub normal: [f32; 3],
}

impl Triangle {
    /// Create a new triangle and calculate its normal
    pub fn new(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> Self {
        let normal = calculate_normal(v0, v1, v2);
        Self {
            vertices: [v0, v1, v2],
            normal,
        }
    }
}

/// Calculate the normal vector for a triangle using the cross product
pub fn calculate_normal(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> [f32; 3] {
    let n = cross(v0, v1, v2);

    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > 1e-10 {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0, 0.0, 1.0] // Default to up (print frame) for degenerate triangles
    }
}

/// Unnormalized (v1 - v0) x (v2 - v0)
fn cross(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> [f32; 3] {
    let u = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
    let v = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];

    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

/// Accumulates an indexed triangle mesh in the local Y-up frame
///
/// Positions are flat `f32` triples, indices are `u32` triples.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    positions: Vec<f32>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex and return its index
    pub fn add_vertex(&mut self, v: [f32; 3]) -> u32 {
        let index = (self.positions.len() / 3) as u32;
        self.positions.extend_from_slice(&v);
        index
    }

    /// Add a triangle from three vertices
    pub fn add_triangle(&mut self, v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) {
        let a = self.add_vertex(v0);
        let b = self.add_vertex(v1);
        let c = self.add_vertex(v2);
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Add a triangle, flipping its winding so the normal points up (+Y) or down
    pub fn add_horizontal_triangle(
        &mut self,
        v0: [f32; 3],
        v1: [f32; 3],
        v2: [f32; 3],
        facing_up: bool,
    ) {
        let points_up = cross(v0, v1, v2)[1] >= 0.0;
        if points_up == facing_up {
            self.add_triangle(v0, v1, v2);
        } else {
            self.add_triangle(v0, v2, v1);
        }
    }

    /// Add a quad (two triangles) from four vertices in winding order
    pub fn add_quad(&mut self, v0: [f32; 3], v1: [f32; 3], v2: [f32; 3], v3: [f32; 3]) {
        self.add_triangle(v0, v1, v2);
        self.add_triangle(v0, v2, v3);
    }

    /// Axis-aligned box between two corners, 8 vertices and 12 outward-facing triangles
    pub fn add_box(&mut self, min: [f32; 3], max: [f32; 3]) {
        let center = ((min[0] + max[0]) / 2.0, (min[2] + max[2]) / 2.0);
        self.add_oriented_box(
            center,
            (1.0, 0.0),
            (max[0] - min[0]) / 2.0,
            (max[2] - min[2]) / 2.0,
            min[1],
            max[1],
        );
    }

    /// Box rotated about Y
    ///
    /// `direction` is the unit (x, z) vector of the box's length axis; the
    /// width axis is its left-handed perpendicular so winding stays outward.
    pub fn add_oriented_box(
        &mut self,
        center: (f32, f32),
        direction: (f32, f32),
        half_length: f32,
        half_width: f32,
        y_bottom: f32,
        y_top: f32,
    ) {
        let (ux, uz) = direction;
        let (vx, vz) = (-uz, ux);
        let corner = |sl: f32, sw: f32| {
            (
                center.0 + sl * half_length * ux + sw * half_width * vx,
                center.1 + sl * half_length * uz + sw * half_width * vz,
            )
        };

        let footprint = [
            corner(-1.0, -1.0),
            corner(1.0, -1.0),
            corner(1.0, 1.0),
            corner(-1.0, 1.0),
        ];

        let base = (self.positions.len() / 3) as u32;
        for y in [y_bottom, y_top] {
            for &(x, z) in &footprint {
                self.add_vertex([x, y, z]);
            }
        }

        const BOX_TRIANGLES: [[u32; 3]; 12] = [
            [0, 1, 2],
            [0, 2, 3], // bottom
            [4, 7, 6],
            [4, 6, 5], // top
            [0, 4, 5],
            [0, 5, 1], // -width side
            [3, 2, 6],
            [3, 6, 7], // +width side
            [0, 3, 7],
            [0, 7, 4], // -length end
            [1, 5, 6],
            [1, 6, 2], // +length end
        ];
        for tri in BOX_TRIANGLES {
            self.indices
                .extend_from_slice(&[base + tri[0], base + tri[1], base + tri[2]]);
        }
    }

    /// Square pyramid with its base on `y_bottom` and apex at `y_top`
    pub fn add_pyramid(&mut self, center: (f32, f32), half_size: f32, y_bottom: f32, y_top: f32) {
        let (cx, cz) = center;
        let b0 = [cx - half_size, y_bottom, cz - half_size];
        let b1 = [cx + half_size, y_bottom, cz - half_size];
        let b2 = [cx + half_size, y_bottom, cz + half_size];
        let b3 = [cx - half_size, y_bottom, cz + half_size];
        let apex = [cx, y_top, cz];

        self.add_triangle(b0, b1, b2);
        self.add_triangle(b0, b2, b3);
        self.add_triangle(b0, apex, b1);
        self.add_triangle(b1, apex, b2);
        self.add_triangle(b2, apex, b3);
        self.add_triangle(b3, apex, b0);
    }

    /// Solid annulus (flat washer) between two heights
    ///
    /// The outer wall faces away from `center`, the inner wall faces the hole.
    pub fn add_washer(
        &mut self,
        center: (f32, f32),
        inner_radius: f32,
        outer_radius: f32,
        y_bottom: f32,
        y_top: f32,
        segments: usize,
    ) {
        let segments = segments.max(3);
        let point = |radius: f32, i: usize, y: f32| {
            let angle = std::f32::consts::TAU * (i % segments) as f32 / segments as f32;
            [
                center.0 + radius * angle.cos(),
                y,
                center.1 + radius * angle.sin(),
            ]
        };

        for i in 0..segments {
            for (y, facing_up) in [(y_top, true), (y_bottom, false)] {
                let o0 = point(outer_radius, i, y);
                let o1 = point(outer_radius, i + 1, y);
                let i0 = point(inner_radius, i, y);
                let i1 = point(inner_radius, i + 1, y);
                self.add_horizontal_triangle(o0, o1, i1, facing_up);
                self.add_horizontal_triangle(o0, i1, i0, facing_up);
            }

            self.add_quad(
                point(outer_radius, i + 1, y_bottom),
                point(outer_radius, i, y_bottom),
                point(outer_radius, i, y_top),
                point(outer_radius, i + 1, y_top),
            );
            self.add_quad(
                point(inner_radius, i, y_bottom),
                point(inner_radius, i + 1, y_bottom),
                point(inner_radius, i + 1, y_top),
                point(inner_radius, i, y_top),
            );
        }
    }

    /// Get the number of triangles
    pub fn len(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Consume the builder and return (positions, indices)
    pub fn finish(self) -> (Vec<f32>, Vec<u32>) {
        (self.positions, self.indices)
    }
}
