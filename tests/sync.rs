mod common;

use bevy_ecs::world::World;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use common::test_zone;
use gaszone_sim::config::{AdminRoster, ConfigStore, HazardSettings};
use gaszone_sim::ecs::{OutboundStatus, StatusPush};
use gaszone_sim::model::{HazardType, Vec3, ZoneDefinition};
use gaszone_sim::registry::ZoneRegistry;
use gaszone_sim::sync::{
    AdminCommand, AdminGateway, CacheHooks, ClientBridge, ObserverCache, ObserverId,
    ObserverTransport, Reassembly, SpawnParams, SyncServer, ZoneSyncMessage, chunk_payload,
    encode_zones,
};

fn sample_registry(ids: &[&str]) -> ZoneRegistry {
    let mut registry = ZoneRegistry::ephemeral();
    let mut rng = SmallRng::seed_from_u64(1);
    for (i, id) in ids.iter().enumerate() {
        registry
            .add(
                test_zone(id, i as f32 * 300.0, 0.0, 2, HazardType::Toxic),
                0,
                &mut rng,
            )
            .unwrap();
    }
    registry
}

// ---------------------------------------------------------------------------
// Chunking and reassembly
// ---------------------------------------------------------------------------

#[test]
fn reassembly_round_trips_every_chunk_size() {
    let registry = sample_registry(&["TGZ-1-000001", "TGZ-1-000002"]);
    let encoded = encode_zones(registry.zones()).unwrap();
    let bytes = encoded.as_bytes();

    for size in 1..=bytes.len() {
        let chunks = chunk_payload(bytes, size);
        let mut session = Reassembly::new();
        let mut assembled = None;
        for message in chunks {
            let ZoneSyncMessage::Chunk { index, total, payload } = message else {
                panic!("chunk_payload only emits chunks");
            };
            if let Some(done) = session.accept(index, total, payload) {
                assembled = Some(done);
            }
        }
        assert_eq!(
            assembled.as_deref(),
            Some(bytes),
            "chunk size {size} must round-trip byte-exact"
        );
    }
}

#[test]
fn observer_cache_applies_chunked_snapshot() {
    let registry = sample_registry(&["TGZ-1-000001", "TGZ-1-000002"]);
    let encoded = encode_zones(registry.zones()).unwrap();

    let mut cache = ObserverCache::new();
    let mut hooks = Recorder::default();
    for message in chunk_payload(encoded.as_bytes(), 40) {
        cache.handle(message, &mut hooks);
    }

    assert_eq!(cache.len(), 2);
    assert!(cache.get("TGZ-1-000001").is_some());
    assert_eq!(hooks.created, vec!["TGZ-1-000001", "TGZ-1-000002"]);
}

#[test]
fn reapplying_a_snapshot_is_idempotent() {
    let registry = sample_registry(&["TGZ-1-000001", "TGZ-1-000002"]);
    let encoded = encode_zones(registry.zones()).unwrap();

    let mut cache = ObserverCache::new();
    let mut hooks = Recorder::default();
    for _ in 0..2 {
        for message in chunk_payload(encoded.as_bytes(), 64) {
            cache.handle(message, &mut hooks);
        }
    }

    assert_eq!(cache.len(), 2);
    // Second pass finds identical zones: no creates, updates, or removes.
    assert_eq!(hooks.created.len(), 2);
    assert!(hooks.updated.is_empty());
    assert!(hooks.removed.is_empty());
}

#[test]
fn reconcile_deletes_absent_and_upserts_rest() {
    let mut cache = ObserverCache::new();
    let mut hooks = Recorder::default();

    let a = test_zone("A", 0.0, 0.0, 1, HazardType::Toxic);
    let b = test_zone("B", 300.0, 0.0, 2, HazardType::Nerve);
    let c = test_zone("C", 600.0, 0.0, 3, HazardType::Bio);

    cache.reconcile(vec![a.clone(), b.clone()], &mut hooks);
    cache.reconcile(vec![b, c], &mut hooks);

    let ids: Vec<&str> = cache.zones().map(|z| z.id.as_str()).collect();
    assert_eq!(ids, vec!["B", "C"]);
    assert_eq!(hooks.removed, vec!["A"]);
}

#[test]
fn changed_zone_fires_updated_hook() {
    let mut cache = ObserverCache::new();
    let mut hooks = Recorder::default();

    let before = test_zone("A", 0.0, 0.0, 1, HazardType::Toxic);
    let mut after = before.clone();
    after.tier = 4;

    cache.reconcile(vec![before], &mut hooks);
    cache.reconcile(vec![after], &mut hooks);

    assert_eq!(hooks.updated, vec!["A"]);
    assert_eq!(cache.get("A").unwrap().tier, 4);
}

#[test]
fn interrupted_session_restarts_on_new_total() {
    let zones = vec![test_zone("A", 0.0, 0.0, 1, HazardType::Toxic)];
    let encoded = encode_zones(&zones).unwrap();

    let mut cache = ObserverCache::new();
    let mut hooks = Recorder::default();

    // A stray chunk from an older, larger broadcast arrives first.
    cache.handle(
        ZoneSyncMessage::Chunk {
            index: 0,
            total: 9,
            payload: b"stale".to_vec(),
        },
        &mut hooks,
    );

    for message in chunk_payload(encoded.as_bytes(), 32) {
        cache.handle(message, &mut hooks);
    }
    assert_eq!(cache.len(), 1);
    assert!(cache.get("A").is_some());
}

#[test]
fn legacy_full_message_still_accepted() {
    let zones = vec![test_zone("A", 0.0, 0.0, 1, HazardType::Toxic)];
    let encoded = encode_zones(&zones).unwrap();

    let mut cache = ObserverCache::new();
    let mut hooks = Recorder::default();
    cache.handle(
        ZoneSyncMessage::Full {
            payload: encoded.into_bytes(),
        },
        &mut hooks,
    );
    assert_eq!(cache.len(), 1);
}

#[derive(Default)]
struct Recorder {
    created: Vec<String>,
    updated: Vec<String>,
    removed: Vec<String>,
}

impl CacheHooks for Recorder {
    fn created(&mut self, zone: &ZoneDefinition) {
        self.created.push(zone.id.clone());
    }
    fn updated(&mut self, zone: &ZoneDefinition) {
        self.updated.push(zone.id.clone());
    }
    fn removed(&mut self, zone_id: &str) {
        self.removed.push(zone_id.to_string());
    }
}

// ---------------------------------------------------------------------------
// Server-side scheduling
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryTransport {
    zone_sync: Vec<(ObserverId, ZoneSyncMessage)>,
    status: Vec<(ObserverId, StatusPush)>,
    feedback: Vec<(ObserverId, String)>,
}

impl ObserverTransport for MemoryTransport {
    fn send_zone_sync(&mut self, observer: ObserverId, message: &ZoneSyncMessage) {
        self.zone_sync.push((observer, message.clone()));
    }
    fn send_status(&mut self, observer: ObserverId, push: &StatusPush) {
        self.status.push((observer, push.clone()));
    }
    fn send_feedback(&mut self, observer: ObserverId, line: &str) {
        self.feedback.push((observer, line.to_string()));
    }
}

/// Feed one observer's zone sync messages into a fresh cache.
fn replay(transport: &MemoryTransport, observer: ObserverId) -> ObserverCache {
    let mut cache = ObserverCache::new();
    let mut hooks = gaszone_sim::sync::NoHooks;
    for (target, message) in &transport.zone_sync {
        if *target == observer {
            cache.handle(message.clone(), &mut hooks);
        }
    }
    cache
}

#[test]
fn connect_receives_full_snapshot() {
    let registry = sample_registry(&["TGZ-1-000001", "TGZ-1-000002"]);
    let mut server = SyncServer::new(48);
    let mut transport = MemoryTransport::default();

    server.connect(7, &registry, &mut transport);

    let cache = replay(&transport, 7);
    assert_eq!(cache.len(), 2);
    // Small window forces an actual multi-chunk session.
    assert!(transport.zone_sync.len() > 1);
}

#[test]
fn broadcast_only_when_dirty() {
    let mut registry = sample_registry(&["TGZ-1-000001"]);
    let mut server = SyncServer::default();
    let mut transport = MemoryTransport::default();
    server.connect(1, &registry, &mut transport);
    server.connect(2, &registry, &mut transport);

    registry.take_dirty();
    transport.zone_sync.clear();

    server.broadcast_if_dirty(&mut registry, &mut transport);
    assert!(transport.zone_sync.is_empty(), "clean registry must not broadcast");

    let mut rng = SmallRng::seed_from_u64(2);
    registry
        .add(test_zone("TGZ-1-000009", 900.0, 0.0, 3, HazardType::Bio), 0, &mut rng)
        .unwrap();
    server.broadcast_if_dirty(&mut registry, &mut transport);

    for observer in [1, 2] {
        let cache = replay(&transport, observer);
        assert_eq!(cache.len(), 2, "observer {observer} missed the broadcast");
    }

    // The dirty flag was consumed.
    transport.zone_sync.clear();
    server.broadcast_if_dirty(&mut registry, &mut transport);
    assert!(transport.zone_sync.is_empty());
}

#[test]
fn status_routed_to_owning_observer() {
    let registry = sample_registry(&[]);
    let mut server = SyncServer::default();
    let mut transport = MemoryTransport::default();
    server.connect(1, &registry, &mut transport);
    server.connect(2, &registry, &mut transport);

    let mut world = World::new();
    let owned = world.spawn_empty().id();
    let orphan = world.spawn_empty().id();
    server.bind_entity(owned, 2);

    let mut outbound = OutboundStatus(vec![
        StatusPush {
            entity: owned,
            in_gas: true,
            tier: 3,
            hazard: HazardType::Nerve,
            nerve_active: false,
        },
        StatusPush {
            entity: orphan,
            in_gas: true,
            tier: 1,
            hazard: HazardType::Toxic,
            nerve_active: false,
        },
    ]);
    server.flush_status(&mut outbound, &mut transport);

    assert!(outbound.0.is_empty(), "flush drains the queue");
    assert_eq!(transport.status.len(), 1);
    assert_eq!(transport.status[0].0, 2);
    assert_eq!(transport.status[0].1.tier, 3);
}

#[test]
fn disconnect_drops_bindings() {
    let registry = sample_registry(&[]);
    let mut server = SyncServer::default();
    let mut transport = MemoryTransport::default();
    server.connect(1, &registry, &mut transport);

    let mut world = World::new();
    let entity = world.spawn_empty().id();
    server.bind_entity(entity, 1);
    server.disconnect(1);

    let mut outbound = OutboundStatus(vec![StatusPush {
        entity,
        in_gas: true,
        tier: 2,
        hazard: HazardType::Toxic,
        nerve_active: false,
    }]);
    server.flush_status(&mut outbound, &mut transport);
    assert!(transport.status.is_empty());
}

// ---------------------------------------------------------------------------
// Admin gateway
// ---------------------------------------------------------------------------

fn gateway_with_admin(admin: &str) -> (AdminGateway, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    store
        .save(
            "admins.json",
            &AdminRoster {
                admins: vec![admin.to_string()],
            },
        )
        .unwrap();
    (AdminGateway::new(store), dir)
}

#[test]
fn unauthorized_requester_is_denied() {
    let dir = tempfile::tempdir().unwrap();
    let mut gateway = AdminGateway::new(ConfigStore::new(dir.path()));
    let mut registry = ZoneRegistry::ephemeral();
    let mut settings = HazardSettings::default();
    let mut rng = SmallRng::seed_from_u64(3);

    let feedback = gateway.handle(
        "nobody",
        AdminCommand::ListZones,
        0,
        &mut registry,
        &mut settings,
        &mut rng,
    );
    assert_eq!(feedback, vec!["access denied".to_string()]);
}

#[test]
fn check_admin_answers_without_authorization() {
    let dir = tempfile::tempdir().unwrap();
    let mut gateway = AdminGateway::new(ConfigStore::new(dir.path()));
    let mut registry = ZoneRegistry::ephemeral();
    let mut settings = HazardSettings::default();
    let mut rng = SmallRng::seed_from_u64(3);

    let feedback = gateway.handle(
        "nobody",
        AdminCommand::CheckAdmin,
        0,
        &mut registry,
        &mut settings,
        &mut rng,
    );
    assert_eq!(feedback, vec!["admin: false".to_string()]);
}

#[test]
fn spawn_and_remove_through_the_gateway() {
    let (mut gateway, _dir) = gateway_with_admin("steve");
    let mut registry = ZoneRegistry::ephemeral();
    let mut settings = HazardSettings::default();
    let mut rng = SmallRng::seed_from_u64(3);

    let feedback = gateway.handle(
        "steve",
        AdminCommand::SpawnZone(SpawnParams {
            name: "Depot".to_string(),
            position: Vec3::new(500.0, 0.0, 500.0),
            radius: 80.0,
            tier: 3,
            hazard: HazardType::Nerve,
            mask_required: true,
            color: "green".to_string(),
            density: "dense".to_string(),
        }),
        1_000,
        &mut registry,
        &mut settings,
        &mut rng,
    );
    assert_eq!(feedback.len(), 1);
    assert!(feedback[0].starts_with("spawned zone TGZ-1000-"), "{}", feedback[0]);
    assert_eq!(registry.zones().len(), 1);
    assert!(registry.zones()[0].dynamic);

    let feedback = gateway.handle(
        "steve",
        AdminCommand::RemoveNearest {
            position: Vec3::new(510.0, 0.0, 500.0),
            max_distance: 100.0,
        },
        2_000,
        &mut registry,
        &mut settings,
        &mut rng,
    );
    assert!(feedback[0].starts_with("removed zone"), "{}", feedback[0]);
    assert!(registry.zones().is_empty());

    let feedback = gateway.handle(
        "steve",
        AdminCommand::RemoveNearest {
            position: Vec3::default(),
            max_distance: 100.0,
        },
        3_000,
        &mut registry,
        &mut settings,
        &mut rng,
    );
    assert_eq!(feedback, vec!["no zone in range".to_string()]);
}

#[test]
fn feedback_flows_back_to_the_requesting_observer() {
    let (mut gateway, _dir) = gateway_with_admin("steve");
    let mut registry = ZoneRegistry::ephemeral();
    let mut settings = HazardSettings::default();
    let mut rng = SmallRng::seed_from_u64(3);

    let mut server = SyncServer::default();
    let mut transport = MemoryTransport::default();
    server.connect(9, &registry, &mut transport);

    let lines = gateway.handle(
        "steve",
        AdminCommand::ListZones,
        0,
        &mut registry,
        &mut settings,
        &mut rng,
    );
    server.send_feedback(9, &lines, &mut transport);
    // A disconnected observer gets nothing.
    server.send_feedback(10, &lines, &mut transport);

    assert_eq!(transport.feedback, vec![(9, "0 zone(s)".to_string())]);

    // Client side queues and drains in order.
    let mut bridge = ClientBridge::new();
    for (_, line) in &transport.feedback {
        bridge.push_feedback(line.clone());
    }
    assert_eq!(bridge.drain_feedback(), vec!["0 zone(s)".to_string()]);
    assert!(bridge.drain_feedback().is_empty());

    // CheckAdmin answers land in the one-shot status slot.
    bridge.set_admin_status(true);
    assert_eq!(bridge.take_admin_status(), Some(true));
    assert_eq!(bridge.take_admin_status(), None);
}

#[test]
fn command_cooldown_swallows_rapid_fire() {
    let (mut gateway, _dir) = gateway_with_admin("steve");
    let mut registry = ZoneRegistry::ephemeral();
    let mut settings = HazardSettings::default();
    let mut rng = SmallRng::seed_from_u64(3);

    let first = gateway.handle(
        "steve",
        AdminCommand::ListZones,
        1_000,
        &mut registry,
        &mut settings,
        &mut rng,
    );
    assert!(!first.is_empty());

    // 100ms later: inside the 250ms cooldown.
    let second = gateway.handle(
        "steve",
        AdminCommand::ListZones,
        1_100,
        &mut registry,
        &mut settings,
        &mut rng,
    );
    assert!(second.is_empty());

    let third = gateway.handle(
        "steve",
        AdminCommand::ListZones,
        1_250,
        &mut registry,
        &mut settings,
        &mut rng,
    );
    assert!(!third.is_empty());
}
