pub mod app;
pub mod clock;
pub mod commands;
pub mod components;
pub mod events;
pub mod resources;
pub mod schedule;
pub mod systems;

pub use app::{build_sim_app, build_sim_app_deterministic};
pub use clock::{DEFAULT_TICK_MS, SimClock};
pub use commands::{NERVE_SUPPRESS_MS, SimCommand, apply_sim_commands, desired_sick_stage};
pub use components::{
    Actor, Equipment, ExposureState, FilterItem, GasStatus, GearItem, MaskItem, Position, Sickness,
    Stamina, Vitals, Wounds,
};
pub use events::HazardEvent;
pub use resources::{
    AfflictionRng, ExposureRng, HazardConfig, OutboundStatus, SimRng, StatusPush, TerrainRes,
    distribute_rng,
};
pub use schedule::{DomainSet, SimPhase, SimTick, configure_sim_schedule};
