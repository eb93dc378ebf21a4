use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use bevy_ecs::entity::Entity;
use bevy_ecs::resource::Resource;
use bevy_ecs::world::World;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::HazardSettings;
use crate::model::HazardType;
use crate::registry::Terrain;

/// Deterministic RNG for the simulation.
#[derive(Resource)]
pub struct SimRng {
    pub rng: SmallRng,
    pub seed: u64,
}

// ---------------------------------------------------------------------------
// Per-domain RNG resources
// ---------------------------------------------------------------------------

macro_rules! domain_rng {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Resource)]
        pub struct $name(pub SmallRng);

        impl Default for $name {
            fn default() -> Self {
                Self(SmallRng::seed_from_u64(0))
            }
        }
    };
}

domain_rng!(ExposureRng, "Per-domain RNG for Exposure systems.");
domain_rng!(AfflictionRng, "Per-domain RNG for Affliction systems.");

/// Derive a deterministic per-domain seed from the global seed, domain name, and tick count.
fn derive_domain_seed(seed: u64, domain: &str, tick: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    domain.hash(&mut hasher);
    tick.hash(&mut hasher);
    hasher.finish()
}

/// Exclusive system that re-seeds all per-domain RNGs each tick.
/// Runs in `SimPhase::PreUpdate` before any domain systems.
pub fn distribute_rng(world: &mut World) {
    let seed = world.resource::<SimRng>().seed;
    let tick = world.resource::<crate::ecs::clock::SimClock>().tick_count;

    macro_rules! reseed {
        ($res:ty, $label:expr) => {
            world.resource_mut::<$res>().0 =
                SmallRng::seed_from_u64(derive_domain_seed(seed, $label, tick));
        };
    }

    reseed!(ExposureRng, "exposure");
    reseed!(AfflictionRng, "affliction");
}

/// Loaded hazard configuration, shared by the exposure and affliction systems.
#[derive(Resource, Debug, Clone, Default)]
pub struct HazardConfig(pub HazardSettings);

/// Terrain height provider used by containment.
#[derive(Resource, Clone)]
pub struct TerrainRes(pub Arc<dyn Terrain>);

/// One per-entity gas status update bound for the owning observer.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusPush {
    pub entity: Entity,
    pub in_gas: bool,
    pub tier: u8,
    pub hazard: HazardType,
    pub nerve_active: bool,
}

/// Gas status updates produced by containment this tick, drained by the
/// replication layer after the schedule runs.
#[derive(Resource, Debug, Clone, Default)]
pub struct OutboundStatus(pub Vec<StatusPush>);
