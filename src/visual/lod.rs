use std::collections::BTreeMap;

use crate::config::AnchorSettings;
use crate::model::{Vec3, ZoneDefinition};
use crate::registry::{Terrain, ZoneRegistry};

use super::anchors::generate_anchors;

// ---------------------------------------------------------------------------
// Constants — ranges and timing
// ---------------------------------------------------------------------------

pub const SPAWN_RANGE: f32 = 1700.0;
pub const DESPAWN_RANGE: f32 = 2000.0;
pub const HIGH_DETAIL_RANGE: f32 = 600.0;
pub const HIGH_DETAIL_HYSTERESIS: f32 = 25.0;
/// Minimum dwell between LOD switches per zone.
pub const LOD_DWELL_MS: u64 = 8_000;
pub const CROSSFADE_MS: u64 = 10_500;
pub const CHECK_INTERVAL_MS: u64 = 250;

/// Observer-local detail level of one zone's effect batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LodLevel {
    #[default]
    Hidden,
    Low,
    High,
}

/// Effect playback boundary. The driver never touches particles
/// directly; tests observe side effects through this trait.
pub trait EffectSink {
    fn spawn_batch(&mut self, zone_id: &str, key: &str, anchors: &[Vec3]);
    fn stop_batch(&mut self, zone_id: &str, key: &str);
    fn crossfade(
        &mut self,
        zone_id: &str,
        from_key: &str,
        to_key: &str,
        anchors: &[Vec3],
        duration_ms: u64,
    );
    /// Replace the observer's "inside the gas" screen-space effect.
    /// `None` clears it.
    fn set_local_effect(&mut self, key: Option<&str>);
}

/// Cloud batch detail key for a zone's color/density, with a `_low`
/// suffix for the low-detail variant.
pub fn detail_key(color: &str, density: &str, low: bool) -> String {
    if low {
        format!("cloud_{color}_{density}_low")
    } else {
        format!("cloud_{color}_{density}")
    }
}

/// Screen-space effect key used while the observer stands inside a zone.
pub fn local_key(color: &str, density: &str) -> String {
    format!("local_{color}_{density}")
}

#[derive(Debug, Default)]
struct ZoneVisual {
    level: LodLevel,
    active_key: String,
    last_switch_ms: u64,
    next_check_ms: u64,
}

/// Hysteresis band: entering high detail requires coming closer than
/// leaving it requires going away.
fn desired_level(current: LodLevel, distance: f32) -> LodLevel {
    match current {
        LodLevel::High => {
            if distance > HIGH_DETAIL_RANGE + HIGH_DETAIL_HYSTERESIS {
                LodLevel::Low
            } else {
                LodLevel::High
            }
        }
        _ => {
            if distance <= HIGH_DETAIL_RANGE - HIGH_DETAIL_HYSTERESIS {
                LodLevel::High
            } else {
                LodLevel::Low
            }
        }
    }
}

/// Observer-local visual state machine over the replicated zone list.
///
/// Per zone: spawn the effect batch when the observer comes into range,
/// destroy it past the despawn range, and crossfade between detail
/// variants instead of cutting, with a minimum dwell between switches.
/// Also owns the single "inside the gas" local effect, assigned to the
/// highest-tier containing zone.
pub struct VisualDriver {
    settings: AnchorSettings,
    zones: BTreeMap<String, ZoneVisual>,
    local_owner: Option<String>,
}

impl VisualDriver {
    pub fn new(settings: AnchorSettings) -> Self {
        Self {
            settings,
            zones: BTreeMap::new(),
            local_owner: None,
        }
    }

    pub fn level(&self, zone_id: &str) -> LodLevel {
        self.zones.get(zone_id).map_or(LodLevel::Hidden, |v| v.level)
    }

    /// Periodic visual check, driven at `CHECK_INTERVAL_MS` per zone.
    pub fn tick(
        &mut self,
        now_ms: u64,
        observer: &Vec3,
        zones: &[ZoneDefinition],
        terrain: &dyn Terrain,
        sink: &mut dyn EffectSink,
    ) {
        self.prune_stale(zones, sink);

        for zone in zones {
            let vis = self.zones.entry(zone.id.clone()).or_default();
            if now_ms < vis.next_check_ms {
                continue;
            }
            vis.next_check_ms = now_ms + CHECK_INTERVAL_MS;

            let dist_sq = observer.distance_sq(&zone.position);

            match vis.level {
                LodLevel::Hidden => {
                    if dist_sq <= SPAWN_RANGE * SPAWN_RANGE {
                        let level = desired_level(LodLevel::Hidden, dist_sq.sqrt());
                        let key =
                            detail_key(&zone.color, &zone.density, level == LodLevel::Low);
                        let anchors = generate_anchors(zone, &self.settings, terrain);
                        sink.spawn_batch(&zone.id, &key, &anchors);
                        vis.level = level;
                        vis.active_key = key;
                        vis.last_switch_ms = now_ms;
                    }
                }
                LodLevel::Low | LodLevel::High => {
                    if dist_sq > DESPAWN_RANGE * DESPAWN_RANGE {
                        sink.stop_batch(&zone.id, &vis.active_key);
                        *vis = ZoneVisual {
                            next_check_ms: now_ms + CHECK_INTERVAL_MS,
                            ..ZoneVisual::default()
                        };
                        continue;
                    }
                    if now_ms.saturating_sub(vis.last_switch_ms) < LOD_DWELL_MS {
                        continue;
                    }
                    let level = desired_level(vis.level, dist_sq.sqrt());
                    if level != vis.level {
                        let key =
                            detail_key(&zone.color, &zone.density, level == LodLevel::Low);
                        let anchors = generate_anchors(zone, &self.settings, terrain);
                        sink.crossfade(&zone.id, &vis.active_key, &key, &anchors, CROSSFADE_MS);
                        vis.level = level;
                        vis.active_key = key;
                        vis.last_switch_ms = now_ms;
                    }
                }
            }
        }

        self.update_local_effect(observer, zones, terrain, sink);
    }

    /// Stop batches for zones that vanished from the replicated list.
    fn prune_stale(&mut self, zones: &[ZoneDefinition], sink: &mut dyn EffectSink) {
        let live: std::collections::BTreeSet<&str> =
            zones.iter().map(|z| z.id.as_str()).collect();
        let stale: Vec<String> = self
            .zones
            .keys()
            .filter(|id| !live.contains(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            if let Some(vis) = self.zones.remove(&id) {
                if vis.level != LodLevel::Hidden {
                    sink.stop_batch(&id, &vis.active_key);
                }
            }
        }
        if self
            .local_owner
            .as_ref()
            .is_some_and(|id| !live.contains(id.as_str()))
        {
            self.local_owner = None;
            sink.set_local_effect(None);
        }
    }

    /// The highest-tier zone containing the observer owns the local
    /// effect; ties keep the first in list order.
    fn update_local_effect(
        &mut self,
        observer: &Vec3,
        zones: &[ZoneDefinition],
        terrain: &dyn Terrain,
        sink: &mut dyn EffectSink,
    ) {
        let mut owner: Option<&ZoneDefinition> = None;
        for zone in zones {
            if !ZoneRegistry::contains(zone, observer, terrain) {
                continue;
            }
            if owner.is_none_or(|o| zone.tier > o.tier) {
                owner = Some(zone);
            }
        }

        let owner_id = owner.map(|z| z.id.clone());
        if owner_id == self.local_owner {
            return;
        }
        self.local_owner = owner_id;
        match owner {
            Some(zone) => sink.set_local_effect(Some(&local_key(&zone.color, &zone.density))),
            None => sink.set_local_effect(None),
        }
    }
}
