use bevy_ecs::resource::Resource;
use bevy_ecs::system::ResMut;

/// Default fixed tick interval in milliseconds.
pub const DEFAULT_TICK_MS: u64 = 1000;

/// Simulation clock resource tracking elapsed milliseconds and tick count.
///
/// Advances by one fixed interval per tick. The `advance_clock` system
/// moves the clock forward at the end of each tick (in `SimPhase::Last`),
/// so systems see the current time before it advances. Every cooldown
/// timestamp in the simulation is expressed against `now_ms()`.
#[derive(Resource, Debug, Clone)]
pub struct SimClock {
    now_ms: u64,
    tick_ms: u64,
    pub tick_count: u64,
}

impl SimClock {
    pub fn new(tick_ms: u64) -> Self {
        Self {
            now_ms: 0,
            tick_ms: tick_ms.max(1),
            tick_count: 0,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Tick interval in seconds, the `dt` of every per-second rate.
    pub fn dt_seconds(&self) -> f32 {
        self.tick_ms as f32 / 1000.0
    }

    /// Advance the clock by one tick interval.
    pub fn advance(&mut self) {
        self.now_ms += self.tick_ms;
        self.tick_count += 1;
    }
}

/// Bevy system that advances the simulation clock by one tick interval.
/// Registered in `SimPhase::Last` so all other systems see the current
/// time before it advances.
pub fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.advance();
}
