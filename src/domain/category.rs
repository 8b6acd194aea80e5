use serde::{Deserialize, Serialize};

use super::element::Tags;

/// Mesh category an element is built as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Terrain,
    Building,
    Road,
    Bridge,
    Water,
    Vegetation,
    Unclassified,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Terrain,
        Category::Building,
        Category::Road,
        Category::Bridge,
        Category::Water,
        Category::Vegetation,
        Category::Unclassified,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Terrain => "terrain",
            Category::Building => "building",
            Category::Road => "road",
            Category::Bridge => "bridge",
            Category::Water => "water",
            Category::Vegetation => "vegetation",
            Category::Unclassified => "unclassified",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

type Matcher = fn(&Tags) -> bool;

/// Classification precedence; the first matching entry wins
const PRECEDENCE: [(Category, Matcher); 5] = [
    (Category::Building, is_building),
    (Category::Road, is_road),
    (Category::Bridge, is_bridge),
    (Category::Water, is_water),
    (Category::Vegetation, is_vegetation),
];

/// Map a tag set to exactly one category
///
/// Total and deterministic: anything that matches nothing is `Unclassified`.
/// Terrain is never produced here, it is derived from the selection region.
pub fn classify(tags: &Tags) -> Category {
    PRECEDENCE
        .iter()
        .find(|(_, matches)| matches(tags))
        .map(|&(category, _)| category)
        .unwrap_or(Category::Unclassified)
}

fn has_value(tags: &Tags, key: &str) -> bool {
    tags.get(key).is_some_and(|v| v != "no")
}

fn value_in(tags: &Tags, key: &str, values: &[&str]) -> bool {
    tags.get(key).is_some_and(|v| values.contains(&v.as_str()))
}

fn is_building(tags: &Tags) -> bool {
    has_value(tags, "building") || has_value(tags, "building:part")
}

fn is_road(tags: &Tags) -> bool {
    tags.contains_key("highway") && !is_bridge(tags)
}

fn is_bridge(tags: &Tags) -> bool {
    has_value(tags, "bridge") || value_in(tags, "man_made", &["bridge"])
}

fn is_water(tags: &Tags) -> bool {
    value_in(tags, "natural", &["water", "bay", "wetland"])
        || value_in(tags, "waterway", &["riverbank", "dock"])
        || value_in(tags, "landuse", &["reservoir", "basin"])
        || tags.contains_key("water")
}

fn is_vegetation(tags: &Tags) -> bool {
    value_in(tags, "leisure", &["park", "garden", "nature_reserve"])
        || value_in(
            tags,
            "landuse",
            &[
                "forest",
                "grass",
                "meadow",
                "recreation_ground",
                "village_green",
                "orchard",
            ],
        )
        || value_in(tags, "natural", &["wood", "scrub", "grassland", "heath"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::element::tags;

    #[test]
    fn test_building_beats_highway() {
        let t = tags([("building", "yes"), ("highway", "residential")]);
        assert_eq!(classify(&t), Category::Building);
    }

    #[test]
    fn test_road_and_bridge() {
        assert_eq!(classify(&tags([("highway", "primary")])), Category::Road);
        assert_eq!(
            classify(&tags([("highway", "primary"), ("bridge", "yes")])),
            Category::Bridge
        );
        assert_eq!(
            classify(&tags([("highway", "primary"), ("bridge", "no")])),
            Category::Road
        );
        assert_eq!(classify(&tags([("man_made", "bridge")])), Category::Bridge);
    }

    #[test]
    fn test_water_and_vegetation() {
        assert_eq!(classify(&tags([("natural", "water")])), Category::Water);
        assert_eq!(classify(&tags([("landuse", "reservoir")])), Category::Water);
        assert_eq!(classify(&tags([("leisure", "park")])), Category::Vegetation);
        assert_eq!(classify(&tags([("natural", "wood")])), Category::Vegetation);
        // water wins over vegetation
        assert_eq!(
            classify(&tags([("natural", "water"), ("leisure", "park")])),
            Category::Water
        );
    }

    #[test]
    fn test_unclassified() {
        assert_eq!(classify(&Tags::new()), Category::Unclassified);
        assert_eq!(classify(&tags([("amenity", "bench")])), Category::Unclassified);
        assert_eq!(classify(&tags([("building", "no")])), Category::Unclassified);
    }
}
