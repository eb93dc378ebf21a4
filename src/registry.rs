use std::fmt;
use std::io;

use bevy_ecs::resource::Resource;
use rand::Rng;

use crate::config::ConfigStore;
use crate::model::{Vec3, ZoneDefinition};
use crate::model::zone::{DEFAULT_ZONE_NAME, HazardType};

pub const ZONES_FILE: &str = "zones.json";

/// Height provider for containment and anchor placement.
pub trait Terrain: Send + Sync {
    /// Terrain surface height at a horizontal coordinate.
    fn surface_y(&self, x: f32, z: f32) -> f32;
}

/// Constant-height terrain, used by tests and headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatTerrain(pub f32);

impl Terrain for FlatTerrain {
    fn surface_y(&self, _x: f32, _z: f32) -> f32 {
        self.0
    }
}

/// Result of strongest-zone resolution at a position.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneHit {
    pub id: String,
    pub tier: u8,
    pub hazard: HazardType,
    pub mask_required: bool,
}

/// Failure modes of registry mutations.
#[derive(Debug)]
pub enum MutateError {
    NotFound,
    Persist(io::Error),
}

impl fmt::Display for MutateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutateError::NotFound => write!(f, "zone not found"),
            MutateError::Persist(err) => write!(f, "failed to persist zones: {err}"),
        }
    }
}

impl std::error::Error for MutateError {}

/// Authoritative zone registry.
///
/// Mutations persist the full zone list before acknowledging, then mark
/// the registry dirty so the replication layer re-broadcasts at the end
/// of the tick. A failed persist rolls the in-memory list back.
#[derive(Resource)]
pub struct ZoneRegistry {
    zones: Vec<ZoneDefinition>,
    store: Option<ConfigStore>,
    dirty: bool,
}

impl ZoneRegistry {
    /// Registry without file backing. Mutations skip persistence.
    pub fn ephemeral() -> Self {
        Self {
            zones: Vec::new(),
            store: None,
            dirty: false,
        }
    }

    /// Load the registry from `zones.json` under the store root.
    ///
    /// Zones are normalized on load (ids generated, names defaulted,
    /// color/density canonicalized, tier clamped); if anything was
    /// patched, or the file was empty and the default zone was created,
    /// the file is rewritten.
    pub fn load(store: ConfigStore, now_ms: u64, rng: &mut impl Rng) -> Self {
        let mut zones: Vec<ZoneDefinition> = store.load_or_create(ZONES_FILE);
        let mut patched = false;

        for zone in &mut zones {
            patched |= zone.normalize(now_ms, rng);
        }

        if zones.is_empty() {
            let mut zone = ZoneDefinition {
                name: DEFAULT_ZONE_NAME.to_string(),
                radius: 50.0,
                tier: 2,
                hazard: HazardType::Toxic,
                mask_required: true,
                ..ZoneDefinition::default()
            };
            zone.normalize(now_ms, rng);
            tracing::info!(id = %zone.id, "zones file empty, seeding default zone");
            zones.push(zone);
            patched = true;
        }

        if patched {
            if let Err(err) = store.save(ZONES_FILE, &zones) {
                tracing::warn!(%err, "failed to rewrite normalized zones");
            }
        }

        Self {
            zones,
            store: Some(store),
            dirty: true,
        }
    }

    pub fn zones(&self) -> &[ZoneDefinition] {
        &self.zones
    }

    pub fn get(&self, id: &str) -> Option<&ZoneDefinition> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Whether a position lies inside a zone's cylinder and vertical band.
    /// Both the radius and the top of the band are inclusive; positions
    /// below the band base are outside.
    pub fn contains(zone: &ZoneDefinition, pos: &Vec3, terrain: &dyn Terrain) -> bool {
        if zone.radius <= 0.0 {
            return false;
        }
        if pos.distance_sq_xz(&zone.position) > zone.radius * zone.radius {
            return false;
        }
        let base_y = terrain.surface_y(zone.position.x, zone.position.z) - zone.bottom_offset;
        let dy = pos.y - base_y;
        dy >= 0.0 && dy <= zone.height + zone.vertical_margin
    }

    /// Strongest (highest tier) zone containing a position. Equal-tier
    /// ties keep the first-registered zone.
    pub fn resolve_strongest(&self, pos: &Vec3, terrain: &dyn Terrain) -> Option<ZoneHit> {
        let mut best: Option<&ZoneDefinition> = None;
        for zone in &self.zones {
            if !Self::contains(zone, pos, terrain) {
                continue;
            }
            if best.is_none_or(|b| zone.tier > b.tier) {
                best = Some(zone);
            }
        }
        best.map(|zone| ZoneHit {
            id: zone.id.clone(),
            tier: zone.tier,
            hazard: zone.hazard,
            mask_required: zone.mask_required,
        })
    }

    /// Add a zone (generating an id if empty), persisting before the
    /// returned acknowledgement. Returns the final zone id.
    pub fn add(
        &mut self,
        mut zone: ZoneDefinition,
        now_ms: u64,
        rng: &mut impl Rng,
    ) -> Result<String, MutateError> {
        zone.normalize(now_ms, rng);
        let id = zone.id.clone();
        self.zones.push(zone);

        if let Err(err) = self.persist() {
            self.zones.pop();
            return Err(MutateError::Persist(err));
        }
        self.dirty = true;
        Ok(id)
    }

    pub fn remove_by_id(&mut self, id: &str) -> Result<ZoneDefinition, MutateError> {
        let index = self
            .zones
            .iter()
            .position(|z| z.id == id)
            .ok_or(MutateError::NotFound)?;
        self.remove_at(index)
    }

    /// Remove the zone nearest to `pos` within `max_distance` (horizontal).
    pub fn remove_nearest(
        &mut self,
        pos: &Vec3,
        max_distance: f32,
    ) -> Result<ZoneDefinition, MutateError> {
        let limit_sq = max_distance * max_distance;
        let index = self
            .zones
            .iter()
            .enumerate()
            .map(|(i, z)| (i, z.position.distance_sq_xz(pos)))
            .filter(|(_, d)| *d <= limit_sq)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .ok_or(MutateError::NotFound)?;
        self.remove_at(index)
    }

    fn remove_at(&mut self, index: usize) -> Result<ZoneDefinition, MutateError> {
        let zone = self.zones.remove(index);
        if let Err(err) = self.persist() {
            self.zones.insert(index, zone);
            return Err(MutateError::Persist(err));
        }
        self.dirty = true;
        Ok(zone)
    }

    /// Re-read the zone list from disk, discarding in-memory state.
    pub fn reload(&mut self, now_ms: u64, rng: &mut impl Rng) {
        let Some(store) = self.store.clone() else {
            return;
        };
        *self = Self::load(store, now_ms, rng);
    }

    fn persist(&self) -> io::Result<()> {
        match &self.store {
            Some(store) => store.save(ZONES_FILE, &self.zones),
            None => Ok(()),
        }
    }

    /// Take the dirty flag, clearing it. The replication layer calls this
    /// once per tick to decide whether to re-broadcast.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
