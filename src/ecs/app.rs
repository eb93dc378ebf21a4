use std::sync::Arc;

use bevy_app::App;
use bevy_ecs::message::MessageRegistry;
use bevy_ecs::schedule::{ExecutorKind, IntoScheduleConfigs};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::registry::{FlatTerrain, ZoneRegistry};

use super::clock::SimClock;
use super::commands::{SimCommand, apply_sim_commands};
use super::events::HazardEvent;
use super::resources::{
    AfflictionRng, ExposureRng, HazardConfig, OutboundStatus, SimRng, TerrainRes, distribute_rng,
};
use super::schedule::{DomainSet, SimPhase, configure_sim_schedule};
use super::systems::{apply_exposure, resolve_containment, sweep_afflictions};

/// Build a headless Bevy app with the simulation clock, hazard resources,
/// message types, the command applicator, and the three domain systems.
///
/// The app starts with an ephemeral registry, flat terrain, and default
/// hazard settings; callers replace those resources for real deployments.
///
/// Manual tick control:
/// ```no_run
/// # use gaszone_sim::ecs::{build_sim_app, SimTick};
/// let mut app = build_sim_app(42, 1000);
/// for _ in 0..3600 {
///     app.world_mut().run_schedule(SimTick);
/// }
/// ```
pub fn build_sim_app(seed: u64, tick_ms: u64) -> App {
    build_sim_app_with_executor(seed, tick_ms, ExecutorKind::MultiThreaded)
}

/// Build a headless Bevy app with single-threaded executor for reproducible determinism.
///
/// Use this when exact RNG consumption order across ticks must be identical across runs.
pub fn build_sim_app_deterministic(seed: u64, tick_ms: u64) -> App {
    build_sim_app_with_executor(seed, tick_ms, ExecutorKind::SingleThreaded)
}

/// Build a headless Bevy app with a specific executor kind.
pub fn build_sim_app_with_executor(seed: u64, tick_ms: u64, executor: ExecutorKind) -> App {
    let mut app = App::empty();

    // Core resources
    app.insert_resource(SimClock::new(tick_ms));
    app.insert_resource(SimRng {
        rng: SmallRng::seed_from_u64(seed),
        seed,
    });
    app.insert_resource(HazardConfig::default());
    app.insert_resource(ZoneRegistry::ephemeral());
    app.insert_resource(TerrainRes(Arc::new(FlatTerrain(0.0))));
    app.init_resource::<OutboundStatus>();

    // Per-domain RNG resources (reseeded each tick by distribute_rng)
    app.init_resource::<ExposureRng>();
    app.init_resource::<AfflictionRng>();

    // Register message types
    MessageRegistry::register_message::<SimCommand>(app.world_mut());
    MessageRegistry::register_message::<HazardEvent>(app.world_mut());

    // Build schedule with message rotation + applicator + RNG distribution
    let mut schedule = configure_sim_schedule(executor);
    schedule.add_systems(bevy_ecs::message::message_update_system.in_set(SimPhase::PreUpdate));
    schedule.add_systems(distribute_rng.in_set(SimPhase::PreUpdate));
    schedule.add_systems(resolve_containment.in_set(DomainSet::Containment));
    schedule.add_systems(apply_exposure.in_set(DomainSet::Exposure));
    schedule.add_systems(sweep_afflictions.in_set(DomainSet::Affliction));
    schedule.add_systems(apply_sim_commands.in_set(SimPhase::PostUpdate));
    app.add_schedule(schedule);
    app
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;
    use crate::ecs::schedule::SimTick;

    #[test]
    fn app_builds_without_panic() {
        let _app = build_sim_app(42, 1000);
    }

    #[test]
    fn clock_advances_per_tick() {
        let mut app = build_sim_app(42, 1000);
        for _ in 0..5 {
            app.world_mut().run_schedule(SimTick);
        }
        let clock = app.world().resource::<SimClock>();
        assert_eq!(clock.now_ms(), 5000);
        assert_eq!(clock.tick_count, 5);
    }

    #[test]
    fn phase_ordering_respected() {
        let log = Arc::new(Mutex::new(Vec::<&'static str>::new()));

        let log1 = log.clone();
        let log2 = log.clone();
        let log3 = log.clone();

        let mut app = build_sim_app(42, 1000);
        app.add_systems(
            SimTick,
            (move || {
                log1.lock().unwrap().push("pre_update");
            })
            .in_set(SimPhase::PreUpdate),
        );
        app.add_systems(
            SimTick,
            (move || {
                log2.lock().unwrap().push("update");
            })
            .in_set(SimPhase::Update),
        );
        app.add_systems(
            SimTick,
            (move || {
                log3.lock().unwrap().push("last");
            })
            .in_set(SimPhase::Last),
        );

        app.world_mut().run_schedule(SimTick);

        let entries = log.lock().unwrap();
        let pre_idx = entries.iter().position(|&s| s == "pre_update").unwrap();
        let update_idx = entries.iter().position(|&s| s == "update").unwrap();
        let last_idx = entries.iter().position(|&s| s == "last").unwrap();
        assert!(pre_idx < update_idx);
        assert!(update_idx < last_idx);
    }

    #[test]
    fn domain_ordering_respected() {
        let log = Arc::new(Mutex::new(Vec::<&'static str>::new()));

        let log1 = log.clone();
        let log2 = log.clone();
        let log3 = log.clone();

        let mut app = build_sim_app(42, 1000);
        app.add_systems(
            SimTick,
            (move || {
                log1.lock().unwrap().push("containment");
            })
            .in_set(DomainSet::Containment),
        );
        app.add_systems(
            SimTick,
            (move || {
                log2.lock().unwrap().push("exposure");
            })
            .in_set(DomainSet::Exposure),
        );
        app.add_systems(
            SimTick,
            (move || {
                log3.lock().unwrap().push("affliction");
            })
            .in_set(DomainSet::Affliction),
        );

        app.world_mut().run_schedule(SimTick);

        let entries = log.lock().unwrap();
        let c = entries.iter().position(|&s| s == "containment").unwrap();
        let e = entries.iter().position(|&s| s == "exposure").unwrap();
        let a = entries.iter().position(|&s| s == "affliction").unwrap();
        assert!(c < e);
        assert!(e < a);
    }
}
