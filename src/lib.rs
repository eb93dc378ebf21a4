pub mod config;
pub mod ecs;
pub mod model;
pub mod registry;
pub mod sync;
pub mod visual;

pub use model::{ExposureState, HazardType, Vec3, ZoneDefinition};
pub use registry::{FlatTerrain, Terrain, ZoneHit, ZoneRegistry};
