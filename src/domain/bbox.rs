use serde::{Deserialize, Serialize};

use crate::error::PassError;

/// Geographic bounding box in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Tightest box around a set of (lat, lon) points
    pub fn from_points(points: &[(f64, f64)]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let mut north = f64::MIN;
        let mut south = f64::MAX;
        let mut east = f64::MIN;
        let mut west = f64::MAX;

        for &(lat, lon) in points {
            north = north.max(lat);
            south = south.min(lat);
            east = east.max(lon);
            west = west.min(lon);
        }

        Some(Self {
            north,
            south,
            east,
            west,
        })
    }

    /// Check the pass-level preconditions: finite, non-empty, in range
    pub fn validate(&self) -> Result<(), PassError> {
        let fail = |reason| PassError::InvalidBoundingBox {
            north: self.north,
            south: self.south,
            east: self.east,
            west: self.west,
            reason,
        };

        if ![self.north, self.south, self.east, self.west]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(fail("coordinates must be finite"));
        }
        if self.north <= self.south {
            return Err(fail("north must be greater than south"));
        }
        if self.east <= self.west {
            return Err(fail("east must be greater than west"));
        }
        if self.north > 90.0 || self.south < -90.0 {
            return Err(fail("latitude out of range"));
        }
        if self.east > 180.0 || self.west < -180.0 {
            return Err(fail("longitude out of range"));
        }
        Ok(())
    }

    /// Center point as (lat, lon)
    pub fn center(&self) -> (f64, f64) {
        (
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }

    /// Inclusive point test
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.south && lat <= self.north && lon >= self.west && lon <= self.east
    }

    /// Inclusive overlap test between two boxes
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.west <= other.east
            && self.east >= other.west
            && self.south <= other.north
            && self.north >= other.south
    }

    /// Corners as (lat, lon): SW, SE, NE, NW
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.south, self.west),
            (self.south, self.east),
            (self.north, self.east),
            (self.north, self.west),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beijing() -> BoundingBox {
        BoundingBox::new(39.91, 39.90, 116.40, 116.39)
    }

    #[test]
    fn test_validate_ok() {
        assert!(beijing().validate().is_ok());
    }

    #[test]
    fn test_validate_inverted() {
        let bbox = BoundingBox::new(39.90, 39.91, 116.40, 116.39);
        assert!(matches!(
            bbox.validate(),
            Err(PassError::InvalidBoundingBox { .. })
        ));

        let flat = BoundingBox::new(39.91, 39.90, 116.39, 116.39);
        assert!(flat.validate().is_err());
    }

    #[test]
    fn test_validate_non_finite() {
        let bbox = BoundingBox::new(f64::NAN, 39.90, 116.40, 116.39);
        assert!(bbox.validate().is_err());
    }

    #[test]
    fn test_contains_inclusive() {
        let bbox = beijing();
        assert!(bbox.contains(39.905, 116.395));
        assert!(bbox.contains(39.91, 116.40));
        assert!(!bbox.contains(39.92, 116.395));
    }

    #[test]
    fn test_from_points() {
        let bbox = BoundingBox::from_points(&[(1.0, 2.0), (3.0, -1.0), (2.0, 0.0)]).unwrap();
        assert_eq!(bbox.north, 3.0);
        assert_eq!(bbox.south, 1.0);
        assert_eq!(bbox.east, 2.0);
        assert_eq!(bbox.west, -1.0);
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_overlaps() {
        let a = beijing();
        let b = BoundingBox::new(39.95, 39.905, 116.45, 116.395);
        let c = BoundingBox::new(40.0, 39.95, 116.5, 116.45);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }
}
