pub mod filter;
pub mod projection;
pub mod simplify;

pub use filter::intersects;
pub use projection::{Projector, haversine_distance};
pub use simplify::{epsilon_for_level, simplify_polyline};
