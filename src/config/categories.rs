//! Per-category generation knobs.
//!
//! Real-world lengths (heights, widths, clearances, spacings, radii) are in
//! meters and are multiplied by the projection scale at build time. The
//! terrain thickness is given directly in generation units.

use serde::{Deserialize, Serialize};

use super::Color;
use crate::domain::{Category, RoadClass};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Generation units per real-world meter
    pub scale: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { scale: 0.1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Slab thickness in generation units; its top face is the terrain baseline
    pub thickness: f32,
    pub color: Color,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            thickness: 2.0,
            color: Color::rgb(0xC8, 0xB8, 0x9A),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingConfig {
    pub enabled: bool,
    pub base_height: f64,
    pub min_height: f64,
    /// Levels assumed when neither `height` nor `levels` is tagged
    pub default_levels: f64,
    pub level_height: f64,
    /// Footprints smaller than this (square meters) are ignored
    pub min_footprint_area: f64,
    /// Attach windows, balconies, chimneys and spires by building kind
    pub decorations: bool,
    pub color: Color,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_height: 3.0,
            min_height: 3.0,
            default_levels: 3.0,
            level_height: 3.0,
            min_footprint_area: 20.0,
            decorations: true,
            color: Color::rgb(0xD9, 0xD0, 0xC9),
        }
    }
}

/// Cross-section and color of one road class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadStyle {
    pub width: f64,
    pub height: f64,
    pub color: Color,
}

impl RoadStyle {
    pub const fn new(width: f64, height: f64, color: Color) -> Self {
        Self {
            width,
            height,
            color,
        }
    }
}

impl Default for RoadStyle {
    fn default() -> Self {
        Self::new(5.0, 0.4, Color::rgb(0x9A, 0x9A, 0x9A))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadConfig {
    pub enabled: bool,
    /// Used for highway values without a class entry
    pub fallback: RoadStyle,
    pub motorway: RoadStyle,
    pub trunk: RoadStyle,
    pub primary: RoadStyle,
    pub secondary: RoadStyle,
    pub residential: RoadStyle,
    pub footway: RoadStyle,
    /// Polyline simplification level, 0 (off) to 3
    pub simplify: u8,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fallback: RoadStyle::default(),
            motorway: RoadStyle::new(24.0, 1.2, Color::rgb(0xE8, 0x92, 0xA2)),
            trunk: RoadStyle::new(18.0, 1.0, Color::rgb(0xF9, 0xB2, 0x9C)),
            primary: RoadStyle::new(14.0, 0.8, Color::rgb(0xFC, 0xD6, 0xA4)),
            secondary: RoadStyle::new(10.0, 0.6, Color::rgb(0xF7, 0xFA, 0xBF)),
            residential: RoadStyle::new(6.0, 0.4, Color::rgb(0xFF, 0xFF, 0xFF)),
            footway: RoadStyle::new(2.0, 0.2, Color::rgb(0xFA, 0x80, 0x72)),
            simplify: 0,
        }
    }
}

impl RoadConfig {
    /// Style for a road class, falling back for unknown classes
    pub fn style(&self, class: Option<RoadClass>) -> &RoadStyle {
        match class {
            Some(RoadClass::Motorway) => &self.motorway,
            Some(RoadClass::Trunk) => &self.trunk,
            Some(RoadClass::Primary) => &self.primary,
            Some(RoadClass::Secondary) => &self.secondary,
            Some(RoadClass::Residential) => &self.residential,
            Some(RoadClass::Footway) => &self.footway,
            None => &self.fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub enabled: bool,
    /// Gap between the terrain baseline and the deck underside
    pub clearance: f64,
    pub pillars: bool,
    pub pillar_spacing: f64,
    pub pillar_size: f64,
    /// Deck cross-section when the bridge carries no known road class
    pub fallback: RoadStyle,
    pub color: Color,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            clearance: 6.0,
            pillars: true,
            pillar_spacing: 20.0,
            pillar_size: 1.5,
            fallback: RoadStyle::new(8.0, 0.8, Color::rgb(0x8C, 0x8C, 0x8C)),
            color: Color::rgb(0x8C, 0x8C, 0x8C),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    pub enabled: bool,
    pub color: Color,
    pub ripples: bool,
    /// Ripples per polygon vertex
    pub ripple_density: f64,
    pub ripple_cap: usize,
    pub ripple_radius: f64,
    /// Height of ripple rings above the water plane
    pub ripple_height: f64,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Color::rgb(0x7F, 0xB8, 0xE6),
            ripples: true,
            ripple_density: 0.25,
            ripple_cap: 8,
            ripple_radius: 4.0,
            ripple_height: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationConfig {
    pub enabled: bool,
    pub color: Color,
    /// Canopy height; the vegetation plane sits at half of it
    pub height: f64,
    pub trees: bool,
    /// Trees per polygon vertex
    pub tree_density: f64,
    pub tree_cap: usize,
    pub trunk_height: f64,
    pub trunk_size: f64,
    pub crown_height: f64,
    pub crown_size: f64,
}

impl Default for VegetationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Color::rgb(0x8F, 0xC9, 0x7A),
            height: 1.0,
            trees: true,
            tree_density: 0.5,
            tree_cap: 20,
            trunk_height: 3.0,
            trunk_size: 0.8,
            crown_height: 6.0,
            crown_size: 2.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub millimeters_per_unit: f64,
    /// Merge near-duplicate vertices of large records
    pub weld: bool,
    /// Weld tolerance in real-world meters
    ///
    /// Scaled by the projection like any other length: 0.001 m is 0.0001
    /// units at the default scale, so only coincident seams merge. Vertices
    /// that are distinct on the ground stay distinct in the print.
    pub weld_tolerance: f64,
    /// Only records with more vertices than this are welded
    pub weld_threshold: usize,
    /// Solid name for STL, object name prefix for 3MF metadata
    pub name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            millimeters_per_unit: 1.0,
            weld: true,
            weld_tolerance: 0.001,
            weld_threshold: 10_000,
            name: "mapmesh".to_string(),
        }
    }
}

/// Everything one generation pass reads; never changes during the pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Seed for detail placement (ripples, trees)
    pub seed: u64,
    pub projection: ProjectionConfig,
    pub terrain: TerrainConfig,
    pub buildings: BuildingConfig,
    pub roads: RoadConfig,
    pub bridges: BridgeConfig,
    pub water: WaterConfig,
    pub vegetation: VegetationConfig,
    pub export: ExportConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            projection: ProjectionConfig::default(),
            terrain: TerrainConfig::default(),
            buildings: BuildingConfig::default(),
            roads: RoadConfig::default(),
            bridges: BridgeConfig::default(),
            water: WaterConfig::default(),
            vegetation: VegetationConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl GenerationConfig {
    /// Whether elements of this category are built at all
    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Terrain => true,
            Category::Building => self.buildings.enabled,
            Category::Road => self.roads.enabled,
            Category::Bridge => self.bridges.enabled,
            Category::Water => self.water.enabled,
            Category::Vegetation => self.vegetation.enabled,
            Category::Unclassified => false,
        }
    }

    /// Turn every element category off; terrain is always built
    pub fn only_terrain(mut self) -> Self {
        self.buildings.enabled = false;
        self.roads.enabled = false;
        self.bridges.enabled = false;
        self.water.enabled = false;
        self.vegetation.enabled = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_road_style_lookup() {
        let config = RoadConfig::default();
        assert_eq!(config.style(Some(RoadClass::Motorway)).width, 24.0);
        assert_eq!(config.style(Some(RoadClass::Residential)).height, 0.4);
        assert_eq!(config.style(None), &config.fallback);
    }

    #[test]
    fn test_enabled_flags() {
        let config = GenerationConfig::default().only_terrain();
        assert!(config.is_enabled(Category::Terrain));
        assert!(!config.is_enabled(Category::Building));
        assert!(!config.is_enabled(Category::Unclassified));
    }

    #[test]
    fn test_partial_toml() {
        let config: GenerationConfig = toml::from_str(
            r##"
            seed = 7

            [buildings]
            min_footprint_area = 0.0

            [roads.residential]
            width = 8.0
            height = 0.5
            color = "#333333"
            "##,
        )
        .unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.buildings.min_footprint_area, 0.0);
        assert!(config.buildings.enabled);
        assert_eq!(config.roads.residential.width, 8.0);
        assert_eq!(config.roads.residential.color, Color::rgb(0x33, 0x33, 0x33));
        assert_eq!(config.roads.motorway.width, 24.0);
    }

    #[test]
    fn test_bad_color_rejected() {
        let result: Result<GenerationConfig, _> = toml::from_str(
            r##"
            [water]
            color = "blue"
            "##,
        );
        assert!(result.is_err());
    }
}
