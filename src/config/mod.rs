pub mod admins;
pub mod anchors;
pub mod settings;
pub mod store;

pub use admins::AdminRoster;
pub use anchors::AnchorSettings;
pub use settings::{BlurTierProfile, EffectRule, GasTypeProfile, HazardSettings, TierProfile};
pub use store::ConfigStore;
