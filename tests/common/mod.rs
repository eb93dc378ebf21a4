#![allow(dead_code)]

use bevy_app::App;
use bevy_ecs::entity::Entity;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use gaszone_sim::ecs::{
    Actor, Equipment, ExposureState, FilterItem, GasStatus, GearItem, MaskItem, Position,
    Sickness, SimTick, Stamina, Vitals, Wounds, build_sim_app_deterministic,
};
use gaszone_sim::model::{HazardType, Vec3, ZoneDefinition};
use gaszone_sim::registry::ZoneRegistry;

pub fn test_zone(id: &str, x: f32, z: f32, tier: u8, hazard: HazardType) -> ZoneDefinition {
    ZoneDefinition {
        id: id.to_string(),
        position: Vec3::new(x, 0.0, z),
        radius: 100.0,
        tier,
        hazard,
        mask_required: false,
        ..ZoneDefinition::default()
    }
}

/// Deterministic one-second-tick app with the given zones loaded into an
/// ephemeral registry.
pub fn app_with_zones(zones: Vec<ZoneDefinition>) -> App {
    let mut app = build_sim_app_deterministic(42, 1000);
    let mut registry = ZoneRegistry::ephemeral();
    let mut rng = SmallRng::seed_from_u64(1);
    for zone in zones {
        registry
            .add(zone, 0, &mut rng)
            .expect("ephemeral add cannot fail");
    }
    app.insert_resource(registry);
    app
}

/// Spawn a bare actor with default components at a position.
pub fn spawn_actor(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            Actor,
            Position(position),
            Vitals::default(),
            Stamina::default(),
            Equipment::default(),
            ExposureState::default(),
            GasStatus::default(),
            Sickness::default(),
            Wounds::default(),
        ))
        .id()
}

pub fn tick(app: &mut App, count: u32) {
    for _ in 0..count {
        app.world_mut().run_schedule(SimTick);
    }
}

/// Suit with an explicit capability tier at the given health out of 100.
pub fn suit(tier: u8, health: f32) -> GearItem {
    GearItem {
        class_name: "NbcSuit".to_string(),
        health,
        max_health: 100.0,
        capability_tier: Some(tier),
    }
}

pub fn mask_with_filter(quantity: f32) -> MaskItem {
    MaskItem {
        class_name: "GasMask".to_string(),
        ruined: false,
        durability: 100.0,
        max_durability: 100.0,
        filter: Some(FilterItem {
            quantity,
            max_quantity: 100.0,
        }),
    }
}

pub fn bare_mask() -> MaskItem {
    MaskItem {
        class_name: "GasMask".to_string(),
        ruined: false,
        durability: 100.0,
        max_durability: 100.0,
        filter: None,
    }
}
