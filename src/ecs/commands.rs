use bevy_ecs::entity::Entity;
use bevy_ecs::message::{Message, Messages};
use bevy_ecs::world::World;

use crate::ecs::clock::SimClock;
use crate::ecs::components::Sickness;
use crate::ecs::events::HazardEvent;
use crate::model::ExposureState;

/// Suppression window granted by epinephrine treatment.
pub const NERVE_SUPPRESS_MS: u64 = 600_000;

/// A treatment or state-change intent targeting one actor.
///
/// Systems and external callers emit these via `MessageWriter<SimCommand>`
/// (or by writing into `Messages<SimCommand>` directly); the centralized
/// applicator in `SimPhase::PostUpdate` applies them.
#[derive(Message, Clone, Debug)]
pub enum SimCommand {
    /// Epinephrine: open a suppression window. Does not clear the
    /// accumulated exposure or the permanent latch.
    SuppressNerve {
        entity: Entity,
        duration_ms: u64,
    },
    /// Antidote: clear the bio infection latch and reset accumulation.
    CureBio {
        entity: Entity,
    },
}

/// Exclusive system that drains pending `SimCommand` messages and applies
/// them. Sickness stage is re-reconciled immediately so a treatment takes
/// visible effect within the same tick.
///
/// Runs in `SimPhase::PostUpdate`.
pub fn apply_sim_commands(world: &mut World) {
    let commands: Vec<SimCommand> = {
        let Some(mut messages) = world.get_resource_mut::<Messages<SimCommand>>() else {
            return;
        };
        messages.drain().collect()
    };

    if commands.is_empty() {
        return;
    }

    let now_ms = world.resource::<SimClock>().now_ms();

    for command in commands {
        match command {
            SimCommand::SuppressNerve {
                entity,
                duration_ms,
            } => {
                let Some(mut exposure) = world.get_mut::<ExposureState>(entity) else {
                    tracing::warn!(?entity, "suppress nerve on unknown entity");
                    continue;
                };
                exposure.nerve_suppressed_until_ms = now_ms + duration_ms;
                reconcile_sickness(world, entity, now_ms);
            }
            SimCommand::CureBio { entity } => {
                let Some(mut exposure) = world.get_mut::<ExposureState>(entity) else {
                    tracing::warn!(?entity, "cure bio on unknown entity");
                    continue;
                };
                exposure.bio_infected = false;
                exposure.bio_exposure = 0.0;
                reconcile_sickness(world, entity, now_ms);
            }
        }
    }
}

/// Desired sickness stage for an exposure state: one point for active
/// (unsuppressed) permanent nerve damage, one for bio infection.
pub fn desired_sick_stage(exposure: &ExposureState, now_ms: u64) -> u8 {
    let stage = exposure.nerve_active(now_ms) as u8 + exposure.bio_infected as u8;
    stage.min(3)
}

fn reconcile_sickness(world: &mut World, entity: Entity, now_ms: u64) {
    let Some(exposure) = world.get::<ExposureState>(entity) else {
        return;
    };
    let desired = desired_sick_stage(exposure, now_ms);

    let Some(mut sickness) = world.get_mut::<Sickness>(entity) else {
        return;
    };
    if sickness.stage == desired {
        return;
    }
    sickness.stage = desired;

    if let Some(mut events) = world.get_resource_mut::<Messages<HazardEvent>>() {
        events.write(HazardEvent::SicknessStageChanged {
            entity,
            stage: desired,
        });
    }
}
