pub mod affliction;
pub mod containment;
pub mod exposure;

pub use affliction::sweep_afflictions;
pub use containment::resolve_containment;
pub use exposure::{ProtectionAssessment, apply_exposure};
