use bevy_ecs::entity::Entity;
use bevy_ecs::message::MessageWriter;
use bevy_ecs::query::With;
use bevy_ecs::system::{Query, Res, ResMut};

use crate::ecs::clock::SimClock;
use crate::ecs::components::{Actor, GasStatus, Position};
use crate::ecs::events::HazardEvent;
use crate::ecs::resources::{OutboundStatus, StatusPush, TerrainRes};
use crate::model::{ExposureState, HazardType};
use crate::registry::ZoneRegistry;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// A status push is repeated at latest this often even without changes.
const STATUS_KEEPALIVE_MS: u64 = 5_000;

/// Resolve each actor's strongest containing zone into its `GasStatus`.
///
/// Also drives per-entity client sync: when the pushed tuple
/// `(in_gas, tier, hazard, nerve_active)` changes, or the keepalive
/// interval elapses, an update is queued in `OutboundStatus` for the
/// replication layer to deliver.
pub fn resolve_containment(
    clock: Res<SimClock>,
    registry: Res<ZoneRegistry>,
    terrain: Res<TerrainRes>,
    mut outbound: ResMut<OutboundStatus>,
    mut events: MessageWriter<HazardEvent>,
    mut actors: Query<(Entity, &Position, &ExposureState, &mut GasStatus), With<Actor>>,
) {
    let now = clock.now_ms();

    for (entity, position, exposure, mut status) in actors.iter_mut() {
        match registry.resolve_strongest(&position.0, terrain.0.as_ref()) {
            Some(hit) => {
                status.in_zone = true;
                status.zone_id = hit.id;
                status.tier = hit.tier;
                status.hazard = hit.hazard;
                status.mask_required = hit.mask_required;
            }
            None => {
                status.in_zone = false;
                status.zone_id.clear();
                status.tier = 0;
                status.hazard = HazardType::default();
                status.mask_required = false;
            }
        }

        let tuple = (
            status.in_zone,
            status.tier,
            status.hazard,
            exposure.nerve_active(now),
        );
        let changed = status.synced != Some(tuple);

        if changed || now >= status.next_keepalive_ms {
            status.synced = Some(tuple);
            status.next_keepalive_ms = now + STATUS_KEEPALIVE_MS;
            outbound.0.push(StatusPush {
                entity,
                in_gas: tuple.0,
                tier: tuple.1,
                hazard: tuple.2,
                nerve_active: tuple.3,
            });
            if changed {
                events.write(HazardEvent::GasStatusChanged { entity });
            }
        }
    }
}
