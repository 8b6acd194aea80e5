use glam::{Quat, Vec3};

use crate::config::Color;
use crate::domain::Category;

/// Local-to-world placement of a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Translation only
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Translation plus a rotation about the vertical (Y) axis
    pub fn with_yaw(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_rotation_y(yaw),
        }
    }

    pub fn apply(&self, v: [f32; 3]) -> [f32; 3] {
        (self.rotation * Vec3::from_array(v) + self.position).to_array()
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One generated mesh, owned by the registry once inserted
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRecord {
    /// Assigned by the registry on insertion
    pub id: u64,
    /// Source element, if the record was built from one
    pub element_id: Option<u64>,
    pub category: Category,
    pub color: Color,
    /// Local-frame vertex positions as flat (x, y, z) triples
    pub positions: Vec<f32>,
    /// Triangle index triples; absent means every 3 vertices form a triangle
    pub indices: Option<Vec<u32>>,
    pub transform: Transform,
}

impl MeshRecord {
    pub fn new(
        category: Category,
        color: Color,
        positions: Vec<f32>,
        indices: Option<Vec<u32>>,
        transform: Transform,
    ) -> Self {
        Self {
            id: 0,
            element_id: None,
            category,
            color,
            positions,
            indices,
            transform,
        }
    }

    pub fn from_element(mut self, element_id: u64) -> Self {
        self.element_id = Some(element_id);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.vertex_count() / 3,
        }
    }

    /// Vertices with the local transform applied
    pub fn world_vertices(&self) -> Vec<[f32; 3]> {
        self.positions
            .chunks_exact(3)
            .map(|v| self.transform.apply([v[0], v[1], v[2]]))
            .collect()
    }

    /// (min, max) world-space corners, None for an empty record
    pub fn world_bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let vertices = self.world_vertices();
        let first = *vertices.first()?;
        Some(vertices.iter().fold((first, first), |(mut lo, mut hi), v| {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(v[axis]);
                hi[axis] = hi[axis].max(v[axis]);
            }
            (lo, hi)
        }))
    }
}
