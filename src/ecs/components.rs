use bevy_ecs::component::Component;

use crate::config::HazardSettings;
use crate::model::HazardType;
use crate::model::zone::{MAX_TIER, MIN_TIER};

pub use crate::model::ExposureState;

/// Marker for a live simulated actor (player or NPC subject to gas).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Actor;

/// World position of an actor.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Position(pub crate::model::Vec3);

/// Core vital pools. Damage clamps at zero; death is `health == 0`.
#[derive(Component, Debug, Clone)]
pub struct Vitals {
    pub health: f32,
    pub max_health: f32,
    pub blood: f32,
    pub max_blood: f32,
    pub shock: f32,
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            health: 100.0,
            max_health: 100.0,
            blood: 5000.0,
            max_blood: 5000.0,
            shock: 100.0,
        }
    }
}

impl Vitals {
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn damage(&mut self, health: f32, blood: f32, shock: f32) {
        self.health = (self.health - health).max(0.0);
        self.blood = (self.blood - blood).max(0.0);
        self.shock = (self.shock - shock).max(0.0);
    }
}

#[derive(Component, Debug, Clone)]
pub struct Stamina {
    pub current: f32,
    pub max: f32,
}

impl Default for Stamina {
    fn default() -> Self {
        Self {
            current: 100.0,
            max: 100.0,
        }
    }
}

impl Stamina {
    pub fn drain(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }
}

/// A protective suit in the body slot.
#[derive(Debug, Clone, PartialEq)]
pub struct GearItem {
    pub class_name: String,
    pub health: f32,
    pub max_health: f32,
    /// Item-level protection tier override; takes precedence over the
    /// configured class map and the legacy class-name fallback.
    pub capability_tier: Option<u8>,
}

impl GearItem {
    pub fn integrity(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }
}

/// A filter cartridge attached to a mask.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterItem {
    pub quantity: f32,
    pub max_quantity: f32,
}

/// A gas mask in the face slot, optionally holding a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskItem {
    pub class_name: String,
    pub ruined: bool,
    pub durability: f32,
    pub max_durability: f32,
    pub filter: Option<FilterItem>,
}

impl MaskItem {
    pub fn functional(&self) -> bool {
        !self.ruined
    }
}

/// Worn protection gear of one actor.
#[derive(Component, Debug, Clone, Default)]
pub struct Equipment {
    pub suit: Option<GearItem>,
    pub mask: Option<MaskItem>,
    /// Blanket gas immunity flag. Skips all acute exposure effects.
    pub immune: bool,
}

/// Legacy protection tier from a class name containing `Tier1`..`Tier4`.
fn legacy_class_tier(class_name: &str) -> u8 {
    for tier in (MIN_TIER..=MAX_TIER).rev() {
        if class_name.contains(&format!("Tier{tier}")) {
            return tier;
        }
    }
    0
}

impl Equipment {
    /// Protection tier of the worn suit, resolved through the ordered
    /// chain: item capability override, configured class map, legacy
    /// `TierN` class-name substring. No suit resolves to 0.
    pub fn suit_tier(&self, settings: &HazardSettings) -> u8 {
        let Some(suit) = &self.suit else {
            return 0;
        };
        if let Some(tier) = suit.capability_tier {
            return tier.min(MAX_TIER);
        }
        if let Some(&tier) = settings.protection.class_tiers.get(&suit.class_name) {
            return tier.min(MAX_TIER);
        }
        legacy_class_tier(&suit.class_name)
    }

    pub fn mask_functional(&self) -> bool {
        self.mask.as_ref().is_some_and(MaskItem::functional)
    }
}

/// Transient per-tick containment result, written by the containment
/// system and read by exposure. `synced` tracks the last tuple pushed to
/// the owning observer for change detection.
#[derive(Component, Debug, Clone, Default)]
pub struct GasStatus {
    pub in_zone: bool,
    pub zone_id: String,
    pub tier: u8,
    pub hazard: HazardType,
    pub mask_required: bool,
    pub synced: Option<(bool, u8, HazardType, bool)>,
    pub next_keepalive_ms: u64,
}

/// Host sickness presentation, reconciled from the affliction latches.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sickness {
    pub stage: u8,
}

/// Sickness agent intensity per stage.
pub const SICKNESS_AGENT_LEVELS: [u32; 4] = [0, 350, 650, 950];

impl Sickness {
    pub fn agent_level(&self) -> u32 {
        SICKNESS_AGENT_LEVELS[(self.stage as usize).min(SICKNESS_AGENT_LEVELS.len() - 1)]
    }
}

/// Open wounds inflicted by toxic exposure.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Wounds {
    pub bleeding: u32,
    pub infected: u32,
}
