pub mod bbox;
pub mod building;
pub mod category;
pub mod element;
pub mod road;

pub use bbox::BoundingBox;
pub use building::BuildingKind;
pub use category::{Category, classify};
pub use element::{GeoElement, Geometry, Tags};
pub use road::RoadClass;
