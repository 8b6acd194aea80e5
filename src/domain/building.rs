use super::element::Tags;

/// Building sub-variant; selects which surface decorations are attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildingKind {
    Residential,
    Commercial,
    Industrial,
    Religious,
    Educational,
    Generic,
}

impl BuildingKind {
    pub fn from_tags(tags: &Tags) -> BuildingKind {
        let building = tags.get("building").map(String::as_str).unwrap_or("yes");
        let amenity = tags.get("amenity").map(String::as_str);

        match (building, amenity) {
            ("church" | "cathedral" | "chapel" | "mosque" | "temple" | "synagogue" | "shrine", _)
            | (_, Some("place_of_worship")) => BuildingKind::Religious,
            ("school" | "university" | "college" | "kindergarten", _)
            | (_, Some("school" | "university" | "college" | "kindergarten")) => {
                BuildingKind::Educational
            }
            ("industrial" | "warehouse" | "factory" | "manufacture", _) => BuildingKind::Industrial,
            ("commercial" | "retail" | "office" | "supermarket" | "hotel", _) => {
                BuildingKind::Commercial
            }
            _ if tags.contains_key("shop") || tags.contains_key("office") => {
                BuildingKind::Commercial
            }
            ("residential" | "house" | "apartments" | "detached" | "terrace" | "dormitory", _) => {
                BuildingKind::Residential
            }
            _ => BuildingKind::Generic,
        }
    }
}
