use bevy_ecs::entity::Entity;
use bevy_ecs::message::MessageWriter;
use bevy_ecs::query::With;
use bevy_ecs::system::{Query, Res, ResMut};
use rand::Rng;

use crate::ecs::clock::SimClock;
use crate::ecs::commands::desired_sick_stage;
use crate::ecs::components::{Actor, Sickness, Stamina, Vitals};
use crate::ecs::events::HazardEvent;
use crate::ecs::resources::AfflictionRng;
use crate::model::ExposureState;

// ---------------------------------------------------------------------------
// Constants — sick symptom pacing
// ---------------------------------------------------------------------------

const SICK_COUGH_MIN_MS: u64 = 20_000;
const SICK_COUGH_MAX_MS: u64 = 40_000;
const SICK_COUGH_CHANCE: f32 = 0.45;

const SICK_SNEEZE_MIN_MS: u64 = 25_000;
const SICK_SNEEZE_MAX_MS: u64 = 55_000;
const SICK_SNEEZE_CHANCE: f32 = 0.35;

// ---------------------------------------------------------------------------
// Constants — bio infection chip damage
// ---------------------------------------------------------------------------

const BIO_DAMAGE_INTERVAL_MS: u64 = 30_000;
const BIO_HEALTH_CHIP: f32 = 0.2;
const BIO_SHOCK_CHIP: f32 = 30.0;
const BIO_STAMINA_CHIP: f32 = 0.5;

// ---------------------------------------------------------------------------
// Constants — nerve damage
// ---------------------------------------------------------------------------

/// Usable stamina fraction while permanent nerve damage is active.
const NERVE_STAMINA_CAP_FRACTION: f32 = 0.5;

/// Persistent affliction sweep.
///
/// Runs every tick for every living actor regardless of containment:
/// reconciles the sickness stage against the latches, paces sick-stage
/// symptoms, applies bio infection chip damage, and clamps stamina while
/// permanent nerve damage is unsuppressed.
pub fn sweep_afflictions(
    clock: Res<SimClock>,
    mut rng: ResMut<AfflictionRng>,
    mut events: MessageWriter<HazardEvent>,
    mut actors: Query<
        (
            Entity,
            &mut Vitals,
            &mut Stamina,
            &mut ExposureState,
            &mut Sickness,
        ),
        With<Actor>,
    >,
) {
    let now = clock.now_ms();
    let rng = &mut rng.0;

    for (entity, mut vitals, mut stamina, mut exposure, mut sickness) in actors.iter_mut() {
        if !vitals.is_alive() {
            continue;
        }

        // Reconcile only on change so host-side sickness agents are not
        // re-applied every tick.
        let desired = desired_sick_stage(&exposure, now);
        if sickness.stage != desired {
            sickness.stage = desired;
            events.write(HazardEvent::SicknessStageChanged {
                entity,
                stage: desired,
            });
        }

        if sickness.stage > 0 {
            if now >= exposure.next_cough_ms {
                exposure.next_cough_ms =
                    now + rng.random_range(SICK_COUGH_MIN_MS..=SICK_COUGH_MAX_MS);
                if rng.random_range(0.0..1.0) < SICK_COUGH_CHANCE {
                    events.write(HazardEvent::CoughTriggered { entity });
                }
            }
            if now >= exposure.next_sneeze_ms {
                exposure.next_sneeze_ms =
                    now + rng.random_range(SICK_SNEEZE_MIN_MS..=SICK_SNEEZE_MAX_MS);
                if rng.random_range(0.0..1.0) < SICK_SNEEZE_CHANCE {
                    events.write(HazardEvent::SneezeTriggered { entity });
                }
            }
        }

        if exposure.bio_infected && now >= exposure.bio_next_symptom_ms {
            exposure.bio_next_symptom_ms = now + BIO_DAMAGE_INTERVAL_MS;
            vitals.damage(BIO_HEALTH_CHIP, 0.0, BIO_SHOCK_CHIP);
            stamina.drain(BIO_STAMINA_CHIP);
        }

        if exposure.nerve_active(now) {
            let cap = stamina.max * NERVE_STAMINA_CAP_FRACTION;
            if stamina.current > cap {
                stamina.current = cap;
            }
        }
    }
}
