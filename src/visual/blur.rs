use std::ops::RangeInclusive;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::HazardSettings;
use crate::ecs::resources::StatusPush;

// ---------------------------------------------------------------------------
// Constants — spike pacing and smoothing
// ---------------------------------------------------------------------------

/// Gap to the next permanent-nerve blur spike, randomized per spike.
const SPIKE_GAP_MS: RangeInclusive<u64> = 20_000..=45_000;
/// Duration of one blur spike.
const SPIKE_LEN_MS: RangeInclusive<u64> = 1_500..=3_000;
/// Exponential approach rate of the rendered blur towards its target.
const SMOOTHING_RATE: f32 = 5.0;

/// Observer-side screen blur intensity driver.
///
/// Consumes the replicated gas status tuple and yields a smoothed blur
/// amount in 0..1 for the host's post-processing layer. Standing in a
/// blur-flagged gas sets a steady per-tier target; active permanent nerve
/// damage imposes a floor that periodically spikes higher for a couple of
/// seconds. Spike pacing state lives here, never on the simulated entity.
pub struct BlurDriver {
    rng: SmallRng,
    current: f32,
    target: f32,
    next_spike_ms: u64,
    spike_until_ms: u64,
}

impl BlurDriver {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            current: 0.0,
            target: 0.0,
            next_spike_ms: 0,
            spike_until_ms: 0,
        }
    }

    /// Smoothed blur amount as of the last tick.
    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Advance one frame from the latest replicated status. Returns the
    /// blur amount to render.
    pub fn tick(
        &mut self,
        now_ms: u64,
        dt: f32,
        status: &StatusPush,
        settings: &HazardSettings,
    ) -> f32 {
        let mut target = 0.0;

        if status.in_gas
            && status.tier > 0
            && settings.profile(status.hazard).blur
            && settings.blur_rule.allows(status.tier)
        {
            target = settings.blur_profile(status.tier).gas_blur;
        }

        if status.nerve_active {
            let fx_tier = status.tier.max(1);
            let profile = settings.blur_profile(fx_tier);

            if now_ms >= self.next_spike_ms {
                self.next_spike_ms = now_ms + self.rng.random_range(SPIKE_GAP_MS);
                self.spike_until_ms = now_ms + self.rng.random_range(SPIKE_LEN_MS);
            }

            let mut floor = profile.nerve_blur_min;
            if now_ms < self.spike_until_ms {
                floor = floor.max(profile.nerve_blur_spike_min);
            }
            target = target.max(floor);
        }

        self.target = target;
        let t = (SMOOTHING_RATE * dt).min(1.0);
        self.current += (self.target - self.current) * t;
        self.current
    }
}

#[cfg(test)]
mod tests {
    use bevy_ecs::world::World;

    use crate::config::EffectRule;
    use crate::model::HazardType;

    use super::*;

    fn status(in_gas: bool, tier: u8, hazard: HazardType, nerve_active: bool) -> StatusPush {
        let mut world = World::new();
        StatusPush {
            entity: world.spawn_empty().id(),
            in_gas,
            tier,
            hazard,
            nerve_active,
        }
    }

    #[test]
    fn gas_blur_follows_tier() {
        let settings = HazardSettings::default();
        let mut driver = BlurDriver::new(1);
        // dt 1.0 saturates the smoothing, so current hits the target.
        let blur = driver.tick(0, 1.0, &status(true, 2, HazardType::Toxic, false), &settings);
        assert_eq!(blur, 0.25);
        let blur = driver.tick(100, 1.0, &status(true, 4, HazardType::Toxic, false), &settings);
        assert_eq!(blur, 0.45);
    }

    #[test]
    fn bio_gas_never_blurs() {
        let settings = HazardSettings::default();
        let mut driver = BlurDriver::new(1);
        let blur = driver.tick(0, 1.0, &status(true, 3, HazardType::Bio, false), &settings);
        assert_eq!(blur, 0.0);
    }

    #[test]
    fn blur_rule_gates_by_tier_and_enable() {
        let mut settings = HazardSettings::default();
        settings.blur_rule = EffectRule::new(true, 3);
        let mut driver = BlurDriver::new(1);
        let blur = driver.tick(0, 1.0, &status(true, 2, HazardType::Toxic, false), &settings);
        assert_eq!(blur, 0.0);
        let blur = driver.tick(100, 1.0, &status(true, 3, HazardType::Toxic, false), &settings);
        assert_eq!(blur, 0.35);

        settings.blur_rule = EffectRule::new(false, 1);
        let mut driver = BlurDriver::new(1);
        let blur = driver.tick(0, 1.0, &status(true, 4, HazardType::Toxic, false), &settings);
        assert_eq!(blur, 0.0);
    }

    #[test]
    fn nerve_floor_spikes_then_settles() {
        let settings = HazardSettings::default();
        let mut driver = BlurDriver::new(1);
        let out_of_gas = status(false, 3, HazardType::Nerve, true);

        // The first tick opens a spike window (1.5..=3 s long), so the
        // raised floor applies immediately.
        let blur = driver.tick(0, 1.0, &out_of_gas, &settings);
        assert_eq!(blur, 0.46);

        // 5 s later the spike is over and the next one is at least 20 s
        // out, leaving the steady floor.
        let blur = driver.tick(5_000, 1.0, &out_of_gas, &settings);
        assert_eq!(blur, 0.34);
    }

    #[test]
    fn suppressed_nerve_clears_the_floor() {
        let settings = HazardSettings::default();
        let mut driver = BlurDriver::new(1);
        driver.tick(0, 1.0, &status(false, 3, HazardType::Nerve, true), &settings);
        let blur = driver.tick(1_000, 1.0, &status(false, 3, HazardType::Nerve, false), &settings);
        assert_eq!(blur, 0.0);
    }

    #[test]
    fn nerve_floor_beats_a_weaker_gas_target() {
        let settings = HazardSettings::default();
        let mut driver = BlurDriver::new(1);
        // Tier-1 gas blur is 0.15; the tier-1 nerve floor is 0.22.
        let blur = driver.tick(25_000, 1.0, &status(true, 1, HazardType::Toxic, true), &settings);
        assert!(blur >= 0.22);
    }

    #[test]
    fn blur_approaches_its_target_gradually() {
        let settings = HazardSettings::default();
        let mut driver = BlurDriver::new(1);
        // dt 0.1 gives t = 0.5, so one tick covers half the distance.
        let blur = driver.tick(0, 0.1, &status(true, 2, HazardType::Toxic, false), &settings);
        assert!((blur - 0.125).abs() < 1e-6);
        let blur = driver.tick(100, 0.1, &status(true, 2, HazardType::Toxic, false), &settings);
        assert!((blur - 0.1875).abs() < 1e-6);
    }
}
