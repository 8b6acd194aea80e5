use serde::{Deserialize, Serialize};

/// Road classification based on OSM highway tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Residential,
    Footway,
}

impl RoadClass {
    /// Classify a highway tag value into a RoadClass
    ///
    /// Unknown values return `None` and fall back to the category defaults.
    pub fn from_highway_tag(tag: &str) -> Option<RoadClass> {
        match tag {
            "motorway" | "motorway_link" => Some(RoadClass::Motorway),
            "trunk" | "trunk_link" => Some(RoadClass::Trunk),
            "primary" | "primary_link" => Some(RoadClass::Primary),
            "secondary" | "secondary_link" | "tertiary" | "tertiary_link" => {
                Some(RoadClass::Secondary)
            }
            "residential" | "living_street" | "unclassified" | "service" => {
                Some(RoadClass::Residential)
            }
            "footway" | "path" | "cycleway" | "pedestrian" | "steps" | "track" => {
                Some(RoadClass::Footway)
            }
            _ => None,
        }
    }
}
