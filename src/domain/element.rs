use std::collections::HashMap;

/// String-keyed OSM tag map
pub type Tags = HashMap<String, String>;

/// Element geometry, all points as (lat, lon) in WGS84
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point((f64, f64)),
    Line(Vec<(f64, f64)>),
    /// Closed ring, stored without the repeated closing point
    Area(Vec<(f64, f64)>),
}

/// A tagged map element as delivered by the geodata source
#[derive(Debug, Clone, PartialEq)]
pub struct GeoElement {
    pub id: u64,
    pub tags: Tags,
    pub geometry: Geometry,
}

impl GeoElement {
    pub fn new(id: u64, tags: Tags, geometry: Geometry) -> Self {
        Self { id, tags, geometry }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// All geometry points, in order
    pub fn points(&self) -> &[(f64, f64)] {
        match &self.geometry {
            Geometry::Point(p) => std::slice::from_ref(p),
            Geometry::Line(points) | Geometry::Area(points) => points,
        }
    }

    /// An area ring counts as closed unless it is explicitly tagged `area=no`
    pub fn is_closed_area(&self) -> bool {
        matches!(self.geometry, Geometry::Area(_)) && self.tag("area") != Some("no")
    }
}

/// Build a tag map from literal pairs
pub fn tags<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Tags {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
