pub mod builder;
pub mod extrusion;
pub mod triangulation;
pub mod validation;

pub use builder::{MeshBuilder, Triangle, calculate_normal};
pub use extrusion::{extrude_polygon, flat_polygon, orient_ring};
pub use triangulation::{signed_area, triangulate_ring};
pub use validation::{ValidationIssue, validate};
