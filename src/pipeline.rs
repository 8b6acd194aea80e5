//! One generation pass: projector, terrain, then every element in turn.

use std::borrow::Borrow;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::GenerationConfig;
use crate::domain::{BoundingBox, Category, GeoElement, classify};
use crate::error::PassError;
use crate::geometry::{Projector, intersects};
use crate::layers::{build_element, build_terrain};
use crate::model::ModelRegistry;

/// What happened to the elements of one pass
///
/// Per-element problems are counted here, never returned as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub elements_seen: usize,
    /// Elements that produced at least one record
    pub built: usize,
    /// Elements outside the bounding box
    pub filtered_out: usize,
    pub unclassified: usize,
    /// Elements whose category is turned off
    pub disabled: usize,
    /// Elements a builder declined (degenerate or below a size policy)
    pub skipped: usize,
    /// Records that failed validation on insertion
    pub rejected: usize,
    pub warnings: usize,
}

/// Run a pass into a fresh registry
///
/// Fails only on pass-level preconditions, in which case no registry is
/// returned at all.
pub fn generate<I>(
    config: &GenerationConfig,
    bbox: &BoundingBox,
    elements: I,
) -> Result<(ModelRegistry, GenerationReport), PassError>
where
    I: IntoIterator,
    I::Item: Borrow<GeoElement>,
{
    let mut registry = ModelRegistry::new();
    let report = run_pass(config, bbox, elements, &mut registry)?;
    Ok((registry, report))
}

/// Owns a registry across repeated passes
///
/// `regenerate` clears the previous geometry before inserting anything new,
/// and leaves the registry empty when the pass fails.
#[derive(Debug)]
pub struct Generator {
    config: GenerationConfig,
    registry: ModelRegistry,
}

impl Generator {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            registry: ModelRegistry::new(),
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Replace the config used by the next pass
    pub fn set_config(&mut self, config: GenerationConfig) {
        self.config = config;
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn regenerate<I>(
        &mut self,
        bbox: &BoundingBox,
        elements: I,
    ) -> Result<GenerationReport, PassError>
    where
        I: IntoIterator,
        I::Item: Borrow<GeoElement>,
    {
        let result = run_pass(&self.config, bbox, elements, &mut self.registry);
        if result.is_err() {
            self.registry.clear();
        }
        result
    }

    pub fn into_registry(self) -> ModelRegistry {
        self.registry
    }
}

fn run_pass<I>(
    config: &GenerationConfig,
    bbox: &BoundingBox,
    elements: I,
    registry: &mut ModelRegistry,
) -> Result<GenerationReport, PassError>
where
    I: IntoIterator,
    I::Item: Borrow<GeoElement>,
{
    registry.clear();

    bbox.validate()?;
    let projector = Projector::new(bbox.center(), config.projection.scale)?;

    let (terrain, baseline) = build_terrain(bbox, &config.terrain, &projector)?;
    if registry.insert(terrain).is_none() {
        return Err(PassError::NoBaseline("terrain mesh failed validation"));
    }

    let mut report = GenerationReport::default();
    for element in elements {
        let element: &GeoElement = element.borrow();
        report.elements_seen += 1;

        let category = classify(&element.tags);
        if category == Category::Unclassified {
            report.unclassified += 1;
            continue;
        }
        if !config.is_enabled(category) {
            report.disabled += 1;
            continue;
        }
        if !intersects(element, bbox) {
            debug!(element = element.id, "outside bounding box");
            report.filtered_out += 1;
            continue;
        }

        let records = build_element(element, category, config, &projector, baseline);
        if records.is_empty() {
            report.skipped += 1;
            continue;
        }

        let mut inserted = 0;
        for record in records {
            match registry.insert(record) {
                Some(_) => inserted += 1,
                None => report.rejected += 1,
            }
        }
        if inserted > 0 {
            report.built += 1;
        }
    }

    report.warnings = report.skipped + report.rejected;
    info!(
        elements = report.elements_seen,
        built = report.built,
        records = registry.len(),
        vertices = registry.total_vertices(),
        triangles = registry.total_triangles(),
        warnings = report.warnings,
        "generation pass complete"
    );

    Ok(report)
}
