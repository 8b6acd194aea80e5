pub mod record;
pub mod registry;

pub use record::{MeshRecord, Transform};
pub use registry::{ModelRegistry, RegistryStats};
