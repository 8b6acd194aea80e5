//! mapmesh - Turn OpenStreetMap elements into terrain-anchored 3D-printable meshes

pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod geometry;
pub mod layers;
pub mod mesh;
pub mod model;
pub mod osm;
pub mod pipeline;

pub use pipeline::{GenerationReport, Generator, generate};
