use tracing::{debug, warn};

use super::ExportOptions;
use super::weld::weld;
use crate::domain::Category;
use crate::mesh::validation::{self, has_invalid_coords, is_degenerate};
use crate::model::MeshRecord;

/// One record ready for encoding, in the shared world frame
#[derive(Debug, Clone, PartialEq)]
pub struct ExportObject {
    pub record_id: u64,
    pub category: Category,
    pub vertices: Vec<[f32; 3]>,
    pub triangles: Vec<[u32; 3]>,
}

/// Everything one export writes; dropped once the bytes are produced
#[derive(Debug, Default)]
pub struct ExportBuffer {
    pub objects: Vec<ExportObject>,
    /// Records left out of the output
    pub skipped: usize,
}

impl ExportBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_record(&mut self, record: &MeshRecord, options: &ExportOptions) {
        match prepare_record(record, options) {
            Some(object) => self.objects.push(object),
            None => self.skipped += 1,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.objects.iter().map(|o| o.triangles.len()).sum()
    }

    /// Distinct categories in the order they first appear
    pub fn categories(&self) -> Vec<Category> {
        let mut seen = Vec::new();
        for object in &self.objects {
            if !seen.contains(&object.category) {
                seen.push(object.category);
            }
        }
        seen
    }
}

/// Transform, index and clean one record
///
/// Returns `None` (after logging) when the record fails validation or
/// nothing valid is left of it.
pub fn prepare_record(record: &MeshRecord, options: &ExportOptions) -> Option<ExportObject> {
    if let Err(issue) = validation::check(record) {
        warn!(record = record.id, %issue, "omitting invalid record from export");
        return None;
    }

    let vertices = record.world_vertices();
    let count = vertices.len();

    let raw: Vec<[u32; 3]> = match &record.indices {
        Some(indices) => indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect(),
        None => (0..(count / 3) as u32)
            .map(|t| [t * 3, t * 3 + 1, t * 3 + 2])
            .collect(),
    };

    let mut triangles = Vec::with_capacity(raw.len());
    for tri in &raw {
        if tri.iter().any(|&i| i as usize >= count) {
            continue;
        }
        let corners = tri.map(|i| vertices[i as usize]);
        if has_invalid_coords(&corners) || is_degenerate(&corners) {
            continue;
        }
        triangles.push(*tri);
    }
    if triangles.len() < raw.len() {
        debug!(
            record = record.id,
            dropped = raw.len() - triangles.len(),
            "dropped invalid triangles"
        );
    }

    let (vertices, triangles) = if options.weld && count > options.weld_threshold {
        let (vertices, triangles, _) = weld(&vertices, &triangles, options.weld_tolerance);
        (vertices, triangles)
    } else {
        (vertices, triangles)
    };

    if vertices.is_empty() || triangles.is_empty() {
        warn!(
            record = record.id,
            category = record.category.name(),
            "omitting record with no valid triangles from export"
        );
        return None;
    }

    Some(ExportObject {
        record_id: record.id,
        category: record.category,
        vertices,
        triangles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Color;
    use crate::model::Transform;
    use glam::Vec3;

    fn record(positions: Vec<f32>, indices: Option<Vec<u32>>) -> MeshRecord {
        MeshRecord::new(
            Category::Water,
            Color::rgb(0, 0, 255),
            positions,
            indices,
            Transform::at(Vec3::new(0.0, 2.0, 0.0)),
        )
    }

    #[test]
    fn test_sequential_indices_and_transform() {
        let r = record(
            vec![
                0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, //
                0.0, 0.0, 0.0, 0.0, 0.0, 1.0, -1.0, 0.0, 0.0,
            ],
            None,
        );
        let object = prepare_record(&r, &ExportOptions::default()).unwrap();
        assert_eq!(object.triangles, vec![[0, 1, 2], [3, 4, 5]]);
        assert!(object.vertices.iter().all(|v| v[1] == 2.0));
    }

    #[test]
    fn test_bad_triangles_dropped() {
        let r = record(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 0.0, 0.0],
            // valid, out of range, degenerate (collinear)
            Some(vec![0, 1, 2, 0, 1, 9, 0, 1, 3]),
        );
        let object = prepare_record(&r, &ExportOptions::default()).unwrap();
        assert_eq!(object.triangles, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_nothing_left_is_skipped() {
        let collinear = record(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0], None);
        assert!(prepare_record(&collinear, &ExportOptions::default()).is_none());

        let mut nan = record(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0], None);
        nan.positions[0] = f32::NAN;
        let mut buffer = ExportBuffer::new();
        buffer.push_record(&nan, &ExportOptions::default());
        assert!(buffer.objects.is_empty());
        assert_eq!(buffer.skipped, 1);
    }

    #[test]
    fn test_weld_above_threshold() {
        let positions = vec![
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, //
            0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0,
        ];
        let options = ExportOptions {
            weld_threshold: 3,
            ..ExportOptions::default()
        };
        let object = prepare_record(&record(positions.clone(), None), &options).unwrap();
        assert_eq!(object.vertices.len(), 4);
        assert_eq!(object.triangles.len(), 2);

        // at or below the threshold nothing is merged
        let options = ExportOptions {
            weld_threshold: 6,
            ..ExportOptions::default()
        };
        let object = prepare_record(&record(positions, None), &options).unwrap();
        assert_eq!(object.vertices.len(), 6);
    }

    #[test]
    fn test_categories_in_first_seen_order() {
        let mut buffer = ExportBuffer::new();
        let tri = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        for category in [Category::Road, Category::Terrain, Category::Road] {
            let mut r = record(tri.clone(), None);
            r.category = category;
            buffer.push_record(&r, &ExportOptions::default());
        }
        assert_eq!(buffer.categories(), vec![Category::Road, Category::Terrain]);
        assert_eq!(buffer.triangle_count(), 3);
    }
}
