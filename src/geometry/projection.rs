use geo::{Distance, Haversine, Point};

use crate::error::PassError;

/// Meters per degree of latitude (constant in the equirectangular model)
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Equirectangular projection from WGS84 to the local Y-up mesh frame
///
/// - x = (lon - center_lon) * meters_per_degree_lon(center_lat) * scale
/// - z = -(lat - center_lat) * meters_per_degree_lat * scale
///
/// This is a flat-earth approximation, only valid for city-block to
/// city-district sized regions. It is not geodesically exact.
///
/// The center and scale are fixed at construction; a pass builds exactly one
/// projector and never changes it, otherwise relative positions drift.
#[derive(Debug, Clone)]
pub struct Projector {
    center_lat: f64,
    center_lon: f64,
    meters_per_degree_lon: f64,
    scale: f64,
}

impl Projector {
    /// Create a projector centered at (lat, lon) producing `scale` units per meter
    pub fn new(center: (f64, f64), scale: f64) -> Result<Self, PassError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(PassError::InvalidScale(scale));
        }
        let (lat, lon) = center;
        Ok(Self {
            center_lat: lat,
            center_lon: lon,
            meters_per_degree_lon: METERS_PER_DEGREE_LAT * lat.to_radians().cos(),
            scale,
        })
    }

    /// Project a lat/lon point to local (x, z) generation units
    pub fn project(&self, lat: f64, lon: f64) -> (f64, f64) {
        let x = (lon - self.center_lon) * self.meters_per_degree_lon * self.scale;
        let z = -(lat - self.center_lat) * METERS_PER_DEGREE_LAT * self.scale;
        (x, z)
    }

    /// Project a slice of lat/lon points
    pub fn project_points(&self, points: &[(f64, f64)]) -> Vec<(f64, f64)> {
        points
            .iter()
            .map(|&(lat, lon)| self.project(lat, lon))
            .collect()
    }

    /// Convert a real-world length in meters to generation units
    pub fn scale_length(&self, meters: f64) -> f32 {
        (meters * self.scale) as f32
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn center(&self) -> (f64, f64) {
        (self.center_lat, self.center_lon)
    }

    /// Square meters covered by one square degree at the projection center
    pub fn square_meters_per_square_degree(&self) -> f64 {
        METERS_PER_DEGREE_LAT * self.meters_per_degree_lon
    }
}

/// Great-circle distance in meters between two (lat, lon) points
pub fn haversine_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    Haversine::distance(Point::new(a.1, a.0), Point::new(b.1, b.0))
}
