use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use super::MeshRecord;
use crate::domain::Category;
use crate::mesh::validation;

/// All mesh records of one generation pass, plus running counters
///
/// Records are never mutated after insertion; `clear` drops everything at once.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    records: Vec<MeshRecord>,
    counts: [usize; Category::ALL.len()],
    total_vertices: usize,
    total_triangles: usize,
    next_id: u64,
}

/// Serializable summary of a registry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryStats {
    pub records: usize,
    pub per_category: BTreeMap<Category, usize>,
    pub total_vertices: usize,
    pub total_triangles: usize,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispose of every record and reset all counters
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Validate and store a record, returning its assigned id
    ///
    /// Invalid records are logged and dropped.
    pub fn insert(&mut self, mut record: MeshRecord) -> Option<u64> {
        if let Err(issue) = validation::check(&record) {
            warn!(
                element = ?record.element_id,
                category = record.category.name(),
                %issue,
                "rejecting invalid mesh record"
            );
            return None;
        }

        self.next_id += 1;
        record.id = self.next_id;

        self.counts[record.category.index()] += 1;
        self.total_vertices += record.vertex_count();
        self.total_triangles += record.triangle_count();
        self.records.push(record);

        Some(self.next_id)
    }

    pub fn records(&self) -> &[MeshRecord] {
        &self.records
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &MeshRecord> {
        self.records.iter().filter(move |r| r.category == category)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count(&self, category: Category) -> usize {
        self.counts[category.index()]
    }

    pub fn total_vertices(&self) -> usize {
        self.total_vertices
    }

    pub fn total_triangles(&self) -> usize {
        self.total_triangles
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            records: self.records.len(),
            per_category: Category::ALL
                .iter()
                .filter(|&&c| self.count(c) > 0)
                .map(|&c| (c, self.count(c)))
                .collect(),
            total_vertices: self.total_vertices,
            total_triangles: self.total_triangles,
        }
    }
}
