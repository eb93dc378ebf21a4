use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::HazardType;
use crate::model::zone::{MAX_TIER, MIN_TIER};

/// Per-hazard damage and drain rates, applied per second of exposure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasTypeProfile {
    pub health_damage: f32,
    pub blood_damage: f32,
    pub shock_damage: f32,
    /// Filter quantity drained per second (before tier scaling).
    pub filter_drain: f32,
    pub cough: bool,
    pub blur: bool,
    pub color: [f32; 4],
}

impl Default for GasTypeProfile {
    fn default() -> Self {
        Self::toxic()
    }
}

impl GasTypeProfile {
    pub fn toxic() -> Self {
        Self {
            health_damage: 6.0,
            blood_damage: 0.0,
            shock_damage: 0.0,
            filter_drain: 1.0,
            cough: true,
            blur: true,
            color: [0.55, 0.65, 0.35, 0.5],
        }
    }

    pub fn nerve() -> Self {
        Self {
            health_damage: 4.0,
            blood_damage: 2.5,
            shock_damage: 2.0,
            filter_drain: 1.2,
            cough: false,
            blur: true,
            color: [0.75, 0.6, 0.2, 0.5],
        }
    }

    pub fn bio() -> Self {
        Self {
            health_damage: 2.0,
            blood_damage: 4.0,
            shock_damage: 0.0,
            filter_drain: 0.8,
            cough: true,
            blur: false,
            color: [0.4, 0.7, 0.4, 0.5],
        }
    }
}

/// Tier scaling factors. Tier N defaults: damage `0.5 + 0.5·N`,
/// filter drain `1.0 + 0.25·N`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierProfile {
    pub damage_multiplier: f32,
    pub filter_multiplier: f32,
}

impl Default for TierProfile {
    fn default() -> Self {
        TierProfile::for_tier(1)
    }
}

impl TierProfile {
    pub fn for_tier(tier: u8) -> Self {
        let t = tier as f32;
        Self {
            damage_multiplier: 0.5 + 0.5 * t,
            filter_multiplier: 1.0 + 0.25 * t,
        }
    }
}

/// Gate for a tier-dependent effect: enabled flag plus the minimum zone
/// tier at which the effect applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectRule {
    pub enabled: bool,
    pub min_tier: u8,
}

impl Default for EffectRule {
    fn default() -> Self {
        Self {
            enabled: true,
            min_tier: 1,
        }
    }
}

impl EffectRule {
    pub fn new(enabled: bool, min_tier: u8) -> Self {
        Self { enabled, min_tier }
    }

    pub fn allows(&self, tier: u8) -> bool {
        self.enabled && tier >= self.min_tier
    }
}

/// Per-tier screen blur intensities for the observer-side blur driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurTierProfile {
    /// Steady blur while standing in a blur-flagged gas.
    pub gas_blur: f32,
    /// Blur floor while permanent nerve damage is active.
    pub nerve_blur_min: f32,
    /// Raised floor during a nerve blur spike.
    pub nerve_blur_spike_min: f32,
}

impl Default for BlurTierProfile {
    fn default() -> Self {
        Self::for_tier(1)
    }
}

impl BlurTierProfile {
    pub fn for_tier(tier: u8) -> Self {
        match tier {
            1 => Self {
                gas_blur: 0.15,
                nerve_blur_min: 0.22,
                nerve_blur_spike_min: 0.30,
            },
            2 => Self {
                gas_blur: 0.25,
                nerve_blur_min: 0.28,
                nerve_blur_spike_min: 0.38,
            },
            3 => Self {
                gas_blur: 0.35,
                nerve_blur_min: 0.34,
                nerve_blur_spike_min: 0.46,
            },
            _ => Self {
                gas_blur: 0.45,
                nerve_blur_min: 0.40,
                nerve_blur_spike_min: 0.55,
            },
        }
    }
}

fn default_protection_slot() -> String {
    "Body".to_string()
}

/// Protection gear resolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectionConfig {
    /// Inventory slot searched for the protective item. Consumed by the
    /// host integration when populating `Equipment`.
    #[serde(default = "default_protection_slot")]
    pub slot: String,
    /// Map of gear class name to protection tier, consulted after the
    /// item's own capability override.
    pub class_tiers: BTreeMap<String, u8>,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        Self {
            slot: default_protection_slot(),
            class_tiers: BTreeMap::new(),
        }
    }
}

fn default_leak_threshold() -> f32 {
    0.30
}
fn default_min_suit_health_fraction() -> f32 {
    0.20
}
fn default_suit_wear_rate() -> f32 {
    0.20
}
fn default_mask_fallback_drain_ratio() -> f32 {
    0.10
}
fn default_nerve_latch_threshold() -> f32 {
    180.0
}
fn default_bio_latch_threshold() -> f32 {
    15.0
}
fn default_nerve_stamina_base() -> f32 {
    5.0
}
fn default_nerve_stamina_per_tier() -> f32 {
    2.0
}
fn default_max_bleeding_wounds() -> u32 {
    5
}
fn default_bleed_chance() -> [f32; 4] {
    [0.15, 0.25, 0.50, 0.75]
}
fn default_bleed_chance_cap() -> f32 {
    0.50
}
fn default_bio_chance() -> [f32; 4] {
    [0.05, 0.10, 0.15, 0.20]
}
fn default_bio_chance_cap() -> f32 {
    0.20
}
fn default_wound_infect_chance() -> [f32; 4] {
    [0.2, 0.3, 0.6, 0.8]
}
fn default_wound_infect_cap() -> f32 {
    0.75
}
fn default_cough_interval_seconds() -> [f32; 4] {
    [22.0, 16.0, 12.0, 9.0]
}
fn default_toxic_profile() -> GasTypeProfile {
    GasTypeProfile::toxic()
}
fn default_nerve_profile() -> GasTypeProfile {
    GasTypeProfile::nerve()
}
fn default_bio_profile() -> GasTypeProfile {
    GasTypeProfile::bio()
}
fn default_tiers() -> Vec<TierProfile> {
    (MIN_TIER..=MAX_TIER).map(TierProfile::for_tier).collect()
}
fn default_cough_rule() -> EffectRule {
    EffectRule::new(true, 1)
}
fn default_nerve_permanent_rule() -> EffectRule {
    EffectRule::new(true, 3)
}
fn default_bio_infection_rule() -> EffectRule {
    EffectRule::new(true, 2)
}
fn default_toxic_wound_rule() -> EffectRule {
    EffectRule::new(true, 2)
}
fn default_blur_rule() -> EffectRule {
    EffectRule::new(true, 1)
}
fn default_blur_tiers() -> Vec<BlurTierProfile> {
    (MIN_TIER..=MAX_TIER).map(BlurTierProfile::for_tier).collect()
}

/// Top-level hazard configuration (`settings.json`).
///
/// Every field carries a serde default so that files written by older
/// versions gain new fields on load and are rewritten in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardSettings {
    /// Suit integrity fraction below which the suit starts leaking.
    #[serde(default = "default_leak_threshold")]
    pub leak_threshold: f32,
    /// Wear never takes a suit below this fraction of its max health.
    #[serde(default = "default_min_suit_health_fraction")]
    pub min_suit_health_fraction: f32,
    /// Base suit wear per second when undertiered.
    #[serde(default = "default_suit_wear_rate")]
    pub suit_wear_rate: f32,
    /// Fraction of the filter drain applied to mask durability when no
    /// filter is attached.
    #[serde(default = "default_mask_fallback_drain_ratio")]
    pub mask_fallback_drain_ratio: f32,

    #[serde(default = "default_nerve_latch_threshold")]
    pub nerve_latch_threshold: f32,
    #[serde(default = "default_bio_latch_threshold")]
    pub bio_latch_threshold: f32,
    #[serde(default = "default_nerve_stamina_base")]
    pub nerve_stamina_base: f32,
    #[serde(default = "default_nerve_stamina_per_tier")]
    pub nerve_stamina_per_tier: f32,

    #[serde(default = "default_max_bleeding_wounds")]
    pub max_bleeding_wounds: u32,
    #[serde(default = "default_bleed_chance")]
    pub bleed_chance: [f32; 4],
    #[serde(default = "default_bleed_chance_cap")]
    pub bleed_chance_cap: f32,
    #[serde(default = "default_bio_chance")]
    pub bio_chance: [f32; 4],
    #[serde(default = "default_bio_chance_cap")]
    pub bio_chance_cap: f32,
    #[serde(default = "default_wound_infect_chance")]
    pub wound_infect_chance: [f32; 4],
    #[serde(default = "default_wound_infect_cap")]
    pub wound_infect_cap: f32,
    #[serde(default = "default_cough_interval_seconds")]
    pub cough_interval_seconds: [f32; 4],

    #[serde(default = "default_toxic_profile")]
    pub toxic: GasTypeProfile,
    #[serde(default = "default_nerve_profile")]
    pub nerve: GasTypeProfile,
    #[serde(default = "default_bio_profile")]
    pub bio: GasTypeProfile,

    /// Tier profiles for tiers 1..=4, in order.
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TierProfile>,

    #[serde(default = "default_cough_rule")]
    pub cough_rule: EffectRule,
    #[serde(default = "default_nerve_permanent_rule")]
    pub nerve_permanent_rule: EffectRule,
    #[serde(default = "default_bio_infection_rule")]
    pub bio_infection_rule: EffectRule,
    #[serde(default = "default_toxic_wound_rule")]
    pub toxic_wound_rule: EffectRule,
    #[serde(default = "default_blur_rule")]
    pub blur_rule: EffectRule,

    /// Blur profiles for tiers 1..=4, in order.
    #[serde(default = "default_blur_tiers")]
    pub blur_tiers: Vec<BlurTierProfile>,

    pub protection: ProtectionConfig,
}

impl Default for HazardSettings {
    fn default() -> Self {
        Self {
            leak_threshold: default_leak_threshold(),
            min_suit_health_fraction: default_min_suit_health_fraction(),
            suit_wear_rate: default_suit_wear_rate(),
            mask_fallback_drain_ratio: default_mask_fallback_drain_ratio(),
            nerve_latch_threshold: default_nerve_latch_threshold(),
            bio_latch_threshold: default_bio_latch_threshold(),
            nerve_stamina_base: default_nerve_stamina_base(),
            nerve_stamina_per_tier: default_nerve_stamina_per_tier(),
            max_bleeding_wounds: default_max_bleeding_wounds(),
            bleed_chance: default_bleed_chance(),
            bleed_chance_cap: default_bleed_chance_cap(),
            bio_chance: default_bio_chance(),
            bio_chance_cap: default_bio_chance_cap(),
            wound_infect_chance: default_wound_infect_chance(),
            wound_infect_cap: default_wound_infect_cap(),
            cough_interval_seconds: default_cough_interval_seconds(),
            toxic: GasTypeProfile::toxic(),
            nerve: GasTypeProfile::nerve(),
            bio: GasTypeProfile::bio(),
            tiers: default_tiers(),
            cough_rule: default_cough_rule(),
            nerve_permanent_rule: default_nerve_permanent_rule(),
            bio_infection_rule: default_bio_infection_rule(),
            toxic_wound_rule: default_toxic_wound_rule(),
            blur_rule: default_blur_rule(),
            blur_tiers: default_blur_tiers(),
            protection: ProtectionConfig::default(),
        }
    }
}

impl HazardSettings {
    pub fn profile(&self, hazard: HazardType) -> &GasTypeProfile {
        match hazard {
            HazardType::Toxic => &self.toxic,
            HazardType::Nerve => &self.nerve,
            HazardType::Bio => &self.bio,
        }
    }

    /// Tier profile for a zone tier, clamped to [1,4]. A short `tiers`
    /// table falls back to the hardcoded tier defaults.
    pub fn tier_profile(&self, tier: u8) -> TierProfile {
        let tier = tier.clamp(MIN_TIER, MAX_TIER);
        self.tiers
            .get((tier - 1) as usize)
            .copied()
            .unwrap_or_else(|| TierProfile::for_tier(tier))
    }

    /// Index a per-tier chance table by zone tier (clamped).
    pub fn tier_chance(table: &[f32; 4], tier: u8) -> f32 {
        table[(tier.clamp(MIN_TIER, MAX_TIER) - 1) as usize]
    }

    /// Blur profile for a zone tier, clamped to [1,4]. A short
    /// `blur_tiers` table falls back to the hardcoded tier defaults.
    pub fn blur_profile(&self, tier: u8) -> BlurTierProfile {
        let tier = tier.clamp(MIN_TIER, MAX_TIER);
        self.blur_tiers
            .get((tier - 1) as usize)
            .copied()
            .unwrap_or_else(|| BlurTierProfile::for_tier(tier))
    }
}
