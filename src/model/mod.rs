pub mod exposure;
pub mod geometry;
pub mod zone;

pub use exposure::{EXPOSURE_SAVE_VERSION, ExposureSave, ExposureState};
pub use geometry::{Vec3, parse_position};
pub use zone::{HazardType, ZoneDefinition, generate_zone_id, normalize_color, normalize_density};
