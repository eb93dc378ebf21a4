use std::collections::{BTreeMap, BTreeSet};

use bevy_ecs::entity::Entity;

use crate::ecs::resources::{OutboundStatus, StatusPush};
use crate::registry::ZoneRegistry;

use super::codec::{DEFAULT_CHUNK_BYTES, ZoneSyncMessage, chunk_payload, encode_zones};

/// Opaque observer identifier assigned by the transport layer.
pub type ObserverId = u64;

/// Delivery boundary towards connected observers. The transport is
/// ordered and lossless per observer; an in-memory implementation backs
/// the tests.
pub trait ObserverTransport {
    fn send_zone_sync(&mut self, observer: ObserverId, message: &ZoneSyncMessage);
    fn send_status(&mut self, observer: ObserverId, push: &StatusPush);
    fn send_feedback(&mut self, observer: ObserverId, line: &str);
}

/// Authority-side replication scheduler.
///
/// Tracks connected observers and which observer owns which actor
/// entity. Zone broadcasts are deferred: mutations only mark the
/// registry dirty, and `broadcast_if_dirty` serializes once per tick and
/// fans out to everyone.
pub struct SyncServer {
    observers: BTreeSet<ObserverId>,
    owners: BTreeMap<Entity, ObserverId>,
    chunk_bytes: usize,
}

impl Default for SyncServer {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_BYTES)
    }
}

impl SyncServer {
    pub fn new(chunk_bytes: usize) -> Self {
        Self {
            observers: BTreeSet::new(),
            owners: BTreeMap::new(),
            chunk_bytes: chunk_bytes.max(1),
        }
    }

    pub fn observers(&self) -> impl Iterator<Item = ObserverId> + '_ {
        self.observers.iter().copied()
    }

    /// Register an observer and send it the current zone snapshot.
    pub fn connect(
        &mut self,
        observer: ObserverId,
        registry: &ZoneRegistry,
        transport: &mut dyn ObserverTransport,
    ) {
        self.observers.insert(observer);
        self.send_snapshot(observer, registry, transport);
    }

    pub fn disconnect(&mut self, observer: ObserverId) {
        self.observers.remove(&observer);
        self.owners.retain(|_, o| *o != observer);
    }

    /// Bind an actor entity to its owning observer for status pushes.
    pub fn bind_entity(&mut self, entity: Entity, observer: ObserverId) {
        self.owners.insert(entity, observer);
    }

    pub fn unbind_entity(&mut self, entity: Entity) {
        self.owners.remove(&entity);
    }

    /// Explicit re-sync request from one observer.
    pub fn request_sync(
        &self,
        observer: ObserverId,
        registry: &ZoneRegistry,
        transport: &mut dyn ObserverTransport,
    ) {
        self.send_snapshot(observer, registry, transport);
    }

    /// End-of-tick broadcast step: if any mutation dirtied the registry
    /// this tick, serialize once and send to every connected observer.
    pub fn broadcast_if_dirty(
        &self,
        registry: &mut ZoneRegistry,
        transport: &mut dyn ObserverTransport,
    ) {
        if !registry.take_dirty() {
            return;
        }
        self.broadcast(registry, transport);
    }

    /// Unconditional broadcast of the current zone list.
    pub fn broadcast(&self, registry: &ZoneRegistry, transport: &mut dyn ObserverTransport) {
        let Some(messages) = self.encode_messages(registry) else {
            return;
        };
        tracing::debug!(
            observers = self.observers.len(),
            chunks = messages.len(),
            "broadcasting zone sync"
        );
        for &observer in &self.observers {
            for message in &messages {
                transport.send_zone_sync(observer, message);
            }
        }
    }

    /// Deliver queued per-entity gas status pushes to their owners.
    pub fn flush_status(
        &self,
        outbound: &mut OutboundStatus,
        transport: &mut dyn ObserverTransport,
    ) {
        for push in outbound.0.drain(..) {
            let Some(&observer) = self.owners.get(&push.entity) else {
                continue;
            };
            if self.observers.contains(&observer) {
                transport.send_status(observer, &push);
            }
        }
    }

    /// Deliver admin feedback lines to one connected observer.
    pub fn send_feedback(
        &self,
        observer: ObserverId,
        lines: &[String],
        transport: &mut dyn ObserverTransport,
    ) {
        if !self.observers.contains(&observer) {
            return;
        }
        for line in lines {
            transport.send_feedback(observer, line);
        }
    }

    fn send_snapshot(
        &self,
        observer: ObserverId,
        registry: &ZoneRegistry,
        transport: &mut dyn ObserverTransport,
    ) {
        let Some(messages) = self.encode_messages(registry) else {
            return;
        };
        for message in &messages {
            transport.send_zone_sync(observer, message);
        }
    }

    fn encode_messages(&self, registry: &ZoneRegistry) -> Option<Vec<ZoneSyncMessage>> {
        match encode_zones(registry.zones()) {
            Ok(text) => Some(chunk_payload(text.as_bytes(), self.chunk_bytes)),
            Err(err) => {
                tracing::warn!(%err, "failed to encode zone list");
                None
            }
        }
    }
}
