use bevy_ecs::component::Component;
use serde::{Deserialize, Serialize};

/// Current version of the exposure save blob.
pub const EXPOSURE_SAVE_VERSION: u32 = 1;

/// Per-entity accumulated exposure and affliction latches.
///
/// Lives on every actor as a component and survives restarts through
/// [`ExposureSave`]. Roll cooldown timestamps are transient and reset to
/// zero on load.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct ExposureState {
    /// Accumulated nerve agent exposure. Monotone non-decreasing except
    /// through treatment.
    pub nerve_exposure: f32,
    /// One-way latch: permanent nerve damage. Never cleared, only suppressed.
    pub nerve_permanent: bool,
    /// Suppression window end (epinephrine). Suppressed while `now < this`.
    pub nerve_suppressed_until_ms: u64,
    /// Accumulated biological contamination.
    pub bio_exposure: f32,
    /// Latched biological infection. Cleared only by antidote treatment.
    pub bio_infected: bool,

    // Roll pacing, not persisted.
    pub next_bleed_roll_ms: u64,
    pub next_bio_roll_ms: u64,
    pub next_cough_ms: u64,
    pub next_sneeze_ms: u64,
    pub bio_next_symptom_ms: u64,
}

impl ExposureState {
    /// Whether nerve damage is currently suppressed by treatment.
    pub fn nerve_suppressed(&self, now_ms: u64) -> bool {
        now_ms < self.nerve_suppressed_until_ms
    }

    /// Whether permanent nerve damage is active (latched and unsuppressed).
    pub fn nerve_active(&self, now_ms: u64) -> bool {
        self.nerve_permanent && !self.nerve_suppressed(now_ms)
    }

    pub fn to_save(&self) -> ExposureSave {
        ExposureSave {
            version: EXPOSURE_SAVE_VERSION,
            nerve_exposure: self.nerve_exposure,
            nerve_permanent: self.nerve_permanent,
            nerve_suppressed_until_ms: self.nerve_suppressed_until_ms,
            bio_exposure: self.bio_exposure,
            bio_infected: self.bio_infected,
        }
    }

    /// Serialize to the versioned save blob.
    pub fn encode(&self) -> String {
        // A struct of plain scalars cannot fail to serialize.
        serde_json::to_string(&self.to_save()).unwrap_or_default()
    }

    /// Restore from a stored blob. An absent blob, a parse failure, or a
    /// version mismatch all yield defaults rather than an error.
    pub fn decode(blob: Option<&str>) -> Self {
        let Some(text) = blob else {
            return Self::default();
        };
        match serde_json::from_str::<ExposureSave>(text) {
            Ok(save) if save.version == EXPOSURE_SAVE_VERSION => Self {
                nerve_exposure: save.nerve_exposure,
                nerve_permanent: save.nerve_permanent,
                nerve_suppressed_until_ms: save.nerve_suppressed_until_ms,
                bio_exposure: save.bio_exposure,
                bio_infected: save.bio_infected,
                ..Self::default()
            },
            Ok(save) => {
                tracing::warn!(version = save.version, "unknown exposure save version");
                Self::default()
            }
            Err(err) => {
                tracing::warn!(%err, "malformed exposure save blob");
                Self::default()
            }
        }
    }
}

/// Versioned persistence form of [`ExposureState`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureSave {
    pub version: u32,
    pub nerve_exposure: f32,
    pub nerve_permanent: bool,
    pub nerve_suppressed_until_ms: u64,
    pub bio_exposure: f32,
    pub bio_infected: bool,
}

impl Default for ExposureSave {
    fn default() -> Self {
        Self {
            version: 0,
            nerve_exposure: 0.0,
            nerve_permanent: false,
            nerve_suppressed_until_ms: 0,
            bio_exposure: 0.0,
            bio_infected: false,
        }
    }
}
