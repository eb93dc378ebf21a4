use bevy_ecs::entity::Entity;
use bevy_ecs::message::MessageWriter;
use bevy_ecs::query::With;
use bevy_ecs::system::{Query, Res, ResMut};
use rand::Rng;

use crate::config::HazardSettings;
use crate::ecs::clock::SimClock;
use crate::ecs::components::{Actor, Equipment, GasStatus, Stamina, Vitals, Wounds};
use crate::ecs::events::HazardEvent;
use crate::ecs::resources::{ExposureRng, HazardConfig};
use crate::model::{ExposureState, HazardType};

// ---------------------------------------------------------------------------
// Constants — roll pacing
// ---------------------------------------------------------------------------

/// Minimum gap between probabilistic bleed/bio rolls.
const ROLL_COOLDOWN_MS: u64 = 5_000;

// ---------------------------------------------------------------------------
// Constants — cough chance
// ---------------------------------------------------------------------------

const COUGH_CHANCE_BASE: f32 = 0.35;
const COUGH_CHANCE_PER_LEAK: f32 = 0.45;
const COUGH_CHANCE_CAP: f32 = 0.90;

// ---------------------------------------------------------------------------
// Constants — nerve/bio accumulation
// ---------------------------------------------------------------------------

/// Per-tier scaling of exposure accumulation: `1 + 0.25·tier`.
const ACCUMULATION_TIER_SLOPE: f32 = 0.25;

/// Leak fraction of an exposed actor.
///
/// No suit at all leaks fully. A required mask that is absent or broken
/// leaks fully regardless of the suit. Otherwise the suit only leaks once
/// integrity falls below the threshold, ramping linearly to full leak at
/// zero integrity. A non-positive threshold (invalid config) means any
/// damage at all leaks fully.
pub fn compute_leak(
    suit_tier: u8,
    integrity: f32,
    mask_required: bool,
    mask_functional: bool,
    threshold: f32,
) -> f32 {
    if suit_tier == 0 {
        return 1.0;
    }
    if mask_required && !mask_functional {
        return 1.0;
    }
    if threshold <= 0.0 {
        return if integrity < 1.0 { 1.0 } else { 0.0 };
    }
    if integrity >= threshold {
        return 0.0;
    }
    ((threshold - integrity) / threshold).clamp(0.0, 1.0)
}

/// Derived per-tick view of one actor's protection against a zone,
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtectionAssessment {
    /// Tier of the worn suit, before mask adjustment.
    pub suit_tier: u8,
    /// Suit tier with a missing required mask voiding it to 0.
    pub effective_tier: u8,
    /// Suit integrity 0..1 (0 without a suit).
    pub integrity: f32,
    pub sealed: bool,
    pub leak: f32,
}

impl ProtectionAssessment {
    pub fn assess(equipment: &Equipment, settings: &HazardSettings, mask_required: bool) -> Self {
        let suit_tier = equipment.suit_tier(settings);
        let mask_functional = equipment.mask_functional();
        let effective_tier = if mask_required && !mask_functional {
            0
        } else {
            suit_tier
        };
        let integrity = equipment.suit.as_ref().map_or(0.0, |s| s.integrity());
        let leak = compute_leak(
            suit_tier,
            integrity,
            mask_required,
            mask_functional,
            settings.leak_threshold,
        );
        Self {
            suit_tier,
            effective_tier,
            integrity,
            sealed: leak <= 0.0,
            leak,
        }
    }

    /// Fully protected: adequate mask-adjusted tier and no leak. A suit
    /// of adequate tier that is worn below the leak threshold is not
    /// immune and takes the partial-leak effects instead.
    pub fn immune_to(&self, zone_tier: u8) -> bool {
        self.effective_tier >= zone_tier && self.effective_tier > 0 && self.sealed
    }
}

/// Drain the mask's filter by the hazard/tier rate; without a filter the
/// mask's own durability takes a fraction of the drain instead.
fn drain_filter(
    equipment: &mut Equipment,
    settings: &HazardSettings,
    hazard: HazardType,
    zone_tier: u8,
    dt: f32,
) {
    let Some(mask) = &mut equipment.mask else {
        return;
    };
    let amount =
        settings.profile(hazard).filter_drain * settings.tier_profile(zone_tier).filter_multiplier
            * dt;

    match &mut mask.filter {
        Some(filter) => {
            filter.quantity = (filter.quantity - amount).max(0.0);
        }
        None => {
            mask.durability =
                (mask.durability - amount * settings.mask_fallback_drain_ratio).max(0.0);
            if mask.durability <= 0.0 {
                mask.ruined = true;
            }
        }
    }
}

/// The per-tick acute exposure state machine.
///
/// Runs on the authority only, for every live actor whose containment
/// resolved to a zone this tick. Ordering inside one entity:
/// immunity, protection resolution, leak, sealed early-return (with
/// filter drain), suit wear, acute effects, final filter drain.
#[allow(clippy::too_many_arguments)]
pub fn apply_exposure(
    clock: Res<SimClock>,
    config: Res<HazardConfig>,
    mut rng: ResMut<ExposureRng>,
    mut events: MessageWriter<HazardEvent>,
    mut actors: Query<
        (
            Entity,
            &mut Vitals,
            &mut Stamina,
            &mut Equipment,
            &mut ExposureState,
            &mut Wounds,
            &GasStatus,
        ),
        With<Actor>,
    >,
) {
    let settings = &config.0;
    let now = clock.now_ms();
    let dt = clock.dt_seconds();
    let rng = &mut rng.0;

    for (entity, mut vitals, mut stamina, mut equipment, mut exposure, mut wounds, status) in
        actors.iter_mut()
    {
        if !status.in_zone || !vitals.is_alive() {
            continue;
        }
        if equipment.immune {
            continue;
        }

        let zone_tier = status.tier;
        let hazard = status.hazard;
        let mask_required = status.mask_required;

        let assessment = ProtectionAssessment::assess(&equipment, settings, mask_required);

        // Fully protected and still sealed: the filter still drains,
        // nothing else happens. The early-return is what keeps the
        // drain single per tick.
        if assessment.immune_to(zone_tier) {
            if mask_required {
                drain_filter(&mut equipment, settings, hazard, zone_tier, dt);
            }
            continue;
        }

        // Undertiered protection takes wear, floored at the configured
        // fraction. A missing required mask zeroes the effective tier,
        // which also suspends wear.
        if assessment.effective_tier > 0 && zone_tier > assessment.effective_tier {
            if let Some(suit) = &mut equipment.suit {
                let diff = (zone_tier - assessment.effective_tier) as f32;
                let wear = settings.suit_wear_rate
                    * (1.0 + diff)
                    * (1.0 + 0.25 * zone_tier as f32)
                    * settings.tier_profile(zone_tier).damage_multiplier
                    * dt;
                let floor = settings.min_suit_health_fraction * suit.max_health;
                if suit.health > floor {
                    suit.health = (suit.health - wear).max(floor);
                }
            }
        }

        // Re-assessed after wear so damage taken this tick counts.
        let leak = ProtectionAssessment::assess(&equipment, settings, mask_required).leak;

        if leak > 0.0 {
            let profile = settings.profile(hazard);
            let mult = settings.tier_profile(zone_tier).damage_multiplier * leak;

            vitals.damage(
                profile.health_damage * mult * dt,
                profile.blood_damage * mult * dt,
                profile.shock_damage * mult * dt,
            );

            // Coughing fits, paced per tier.
            if profile.cough
                && settings.cough_rule.allows(zone_tier)
                && now >= exposure.next_cough_ms
            {
                let interval =
                    HazardSettings::tier_chance(&settings.cough_interval_seconds, zone_tier);
                exposure.next_cough_ms = now + (interval * 1000.0) as u64;
                let chance = (COUGH_CHANCE_BASE + COUGH_CHANCE_PER_LEAK * leak)
                    .min(COUGH_CHANCE_CAP);
                if rng.random_range(0.0..1.0) < chance {
                    events.write(HazardEvent::CoughTriggered { entity });
                }
            }

            let accumulation_scale = 1.0 + ACCUMULATION_TIER_SLOPE * zone_tier as f32;

            match hazard {
                HazardType::Nerve => {
                    stamina.drain(
                        (settings.nerve_stamina_base
                            + settings.nerve_stamina_per_tier * zone_tier as f32)
                            * mult
                            * dt,
                    );
                    if settings.nerve_permanent_rule.allows(zone_tier) {
                        exposure.nerve_exposure += leak * dt * accumulation_scale;
                        if exposure.nerve_exposure >= settings.nerve_latch_threshold
                            && !exposure.nerve_permanent
                        {
                            exposure.nerve_permanent = true;
                            events.write(HazardEvent::NervePermanentLatched { entity });
                        }
                    }
                }
                HazardType::Bio => {
                    if settings.bio_infection_rule.allows(zone_tier) {
                        exposure.bio_exposure += leak * dt * accumulation_scale;
                        let mut latched = false;
                        if exposure.bio_exposure >= settings.bio_latch_threshold
                            && !exposure.bio_infected
                        {
                            latched = true;
                        }
                        if now >= exposure.next_bio_roll_ms {
                            exposure.next_bio_roll_ms = now + ROLL_COOLDOWN_MS;
                            let chance =
                                (HazardSettings::tier_chance(&settings.bio_chance, zone_tier)
                                    * leak)
                                    .min(settings.bio_chance_cap);
                            if !exposure.bio_infected
                                && rng.random_range(0.0..1.0) < chance
                            {
                                latched = true;
                            }
                        }
                        if latched && !exposure.bio_infected {
                            exposure.bio_infected = true;
                            events.write(HazardEvent::BioInfectionLatched { entity });
                        }
                    }
                }
                HazardType::Toxic => {
                    if now >= exposure.next_bleed_roll_ms {
                        exposure.next_bleed_roll_ms = now + ROLL_COOLDOWN_MS;
                        let chance =
                            (HazardSettings::tier_chance(&settings.bleed_chance, zone_tier)
                                * leak)
                                .min(settings.bleed_chance_cap);
                        if wounds.bleeding < settings.max_bleeding_wounds
                            && rng.random_range(0.0..1.0) < chance
                        {
                            wounds.bleeding += 1;
                            events.write(HazardEvent::BleedingWound { entity });

                            if settings.toxic_wound_rule.allows(zone_tier) {
                                let infect_chance = (HazardSettings::tier_chance(
                                    &settings.wound_infect_chance,
                                    zone_tier,
                                ) * leak)
                                    .min(settings.wound_infect_cap);
                                if rng.random_range(0.0..1.0) < infect_chance {
                                    wounds.infected += 1;
                                    events.write(HazardEvent::WoundInfected { entity });
                                }
                            }
                        }
                    }
                }
            }
        }

        // Reached only on the non-immune path.
        if mask_required {
            drain_filter(&mut equipment, settings, hazard, zone_tier, dt);
        }
    }
}
