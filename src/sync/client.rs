use std::collections::BTreeMap;
use std::collections::VecDeque;

use crate::model::ZoneDefinition;

use super::codec::{ZoneSyncMessage, parse_zones};
use super::session::Reassembly;

/// Visual lifecycle hooks invoked by cache reconciliation. Default
/// implementations are no-ops so callers override only what they need.
pub trait CacheHooks {
    fn created(&mut self, _zone: &ZoneDefinition) {}
    fn updated(&mut self, _zone: &ZoneDefinition) {}
    fn removed(&mut self, _zone_id: &str) {}
}

/// Hook implementation that does nothing.
pub struct NoHooks;

impl CacheHooks for NoHooks {}

/// Observer-side replica of the zone list, keyed by zone id.
///
/// Feeds incoming sync messages through the reassembly session and
/// reconciles completed payloads into the cache: cached zones absent
/// from the incoming set are deleted (destroying their visuals), every
/// incoming zone is upserted. Reconciliation is idempotent.
#[derive(Default)]
pub struct ObserverCache {
    zones: BTreeMap<String, ZoneDefinition>,
    session: Reassembly,
}

impl ObserverCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zones(&self) -> impl Iterator<Item = &ZoneDefinition> {
        self.zones.values()
    }

    pub fn get(&self, id: &str) -> Option<&ZoneDefinition> {
        self.zones.get(id)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Feed one sync message. Applies the zone list when a session
    /// completes (or immediately for the legacy full-payload form).
    pub fn handle(&mut self, message: ZoneSyncMessage, hooks: &mut dyn CacheHooks) {
        let payload = match message {
            ZoneSyncMessage::Chunk {
                index,
                total,
                payload,
            } => match self.session.accept(index, total, payload) {
                Some(assembled) => assembled,
                None => return,
            },
            ZoneSyncMessage::Full { payload } => payload,
        };

        match parse_zones(&payload) {
            Ok(zones) => self.reconcile(zones, hooks),
            Err(err) => {
                tracing::warn!(%err, "malformed zone sync payload, dropping");
            }
        }
    }

    /// Reconcile the cache against an authoritative zone list.
    pub fn reconcile(&mut self, incoming: Vec<ZoneDefinition>, hooks: &mut dyn CacheHooks) {
        let incoming_ids: std::collections::BTreeSet<&str> =
            incoming.iter().map(|z| z.id.as_str()).collect();

        let stale: Vec<String> = self
            .zones
            .keys()
            .filter(|id| !incoming_ids.contains(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            self.zones.remove(&id);
            hooks.removed(&id);
        }

        for zone in incoming {
            match self.zones.get_mut(&zone.id) {
                Some(existing) => {
                    if *existing != zone {
                        *existing = zone;
                        hooks.updated(existing);
                    }
                }
                None => {
                    hooks.created(&zone);
                    self.zones.insert(zone.id.clone(), zone);
                }
            }
        }
    }
}

/// Observer-side bridge carrying admin feedback lines and a one-shot
/// admin status answer from the authority.
#[derive(Default)]
pub struct ClientBridge {
    feedback: VecDeque<String>,
    admin_status: Option<bool>,
}

impl ClientBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_feedback(&mut self, line: impl Into<String>) {
        self.feedback.push_back(line.into());
    }

    /// Drain all queued feedback lines in arrival order.
    pub fn drain_feedback(&mut self) -> Vec<String> {
        self.feedback.drain(..).collect()
    }

    pub fn set_admin_status(&mut self, is_admin: bool) {
        self.admin_status = Some(is_admin);
    }

    /// Take the pending admin status answer, if any. One-shot.
    pub fn take_admin_status(&mut self) -> Option<bool> {
        self.admin_status.take()
    }
}
