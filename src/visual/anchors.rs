use std::f32::consts::TAU;
use std::hash::{DefaultHasher, Hash, Hasher};

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::AnchorSettings;
use crate::model::{Vec3, ZoneDefinition};
use crate::registry::Terrain;

/// Minimum emitters per ring, so thin rings still read as a cloud.
const MIN_RING_COUNT: u32 = 6;

/// Radius small enough (relative to spacing) that the center anchor
/// alone covers the zone.
const CENTER_ONLY_FACTOR: f32 = 0.75;

/// Deterministic seed for a zone's anchor layout.
fn anchor_seed(zone: &ZoneDefinition) -> u64 {
    let mut hasher = DefaultHasher::new();
    zone.id.hash(&mut hasher);
    zone.radius.to_bits().hash(&mut hasher);
    zone.density.hash(&mut hasher);
    hasher.finish()
}

/// Generate the emitter anchor layout for a zone: a center anchor plus
/// concentric rings filled outward, each point jittered in the plane and
/// snapped to the terrain surface. Deterministic per (id, radius,
/// density); the count target comes from the banded settings table.
pub fn generate_anchors(
    zone: &ZoneDefinition,
    settings: &AnchorSettings,
    terrain: &dyn Terrain,
) -> Vec<Vec3> {
    let mut rng = SmallRng::seed_from_u64(anchor_seed(zone));

    let spacing = settings.spacing(&zone.density).max(1.0);
    let jitter = settings.jitter(&zone.density).max(0.0);
    let target = settings.target_count(zone.radius, &zone.density) as usize;

    let cx = zone.position.x;
    let cz = zone.position.z;

    let mut anchors = Vec::with_capacity(target.min(1024));
    anchors.push(Vec3::new(cx, terrain.surface_y(cx, cz), cz));

    if zone.radius <= CENTER_ONLY_FACTOR * spacing {
        return anchors;
    }

    let mut ring_r = spacing;
    while ring_r < zone.radius && anchors.len() < target {
        let count = ((TAU * ring_r / spacing) as u32).max(MIN_RING_COUNT);
        for i in 0..count {
            if anchors.len() >= target {
                break;
            }
            let angle = i as f32 * TAU / count as f32;
            let jx = if jitter > 0.0 {
                rng.random_range(-jitter..=jitter)
            } else {
                0.0
            };
            let jz = if jitter > 0.0 {
                rng.random_range(-jitter..=jitter)
            } else {
                0.0
            };
            let x = cx + angle.cos() * ring_r + jx;
            let z = cz + angle.sin() * ring_r + jz;
            anchors.push(Vec3::new(x, terrain.surface_y(x, z), z));
        }
        ring_r += spacing;
    }

    anchors
}
