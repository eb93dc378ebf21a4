use std::collections::BTreeMap;

use rand::Rng;

use crate::config::{AdminRoster, ConfigStore, HazardSettings};
use crate::model::{HazardType, Vec3, ZoneDefinition};
use crate::registry::{MutateError, ZoneRegistry};

/// Minimum gap between commands from the same requester.
pub const COMMAND_COOLDOWN_MS: u64 = 250;

pub const ADMINS_FILE: &str = "admins.json";
pub const SETTINGS_FILE: &str = "settings.json";

/// Parameters of an admin-spawned zone.
#[derive(Debug, Clone)]
pub struct SpawnParams {
    pub name: String,
    pub position: Vec3,
    pub radius: f32,
    pub tier: u8,
    pub hazard: HazardType,
    pub mask_required: bool,
    pub color: String,
    pub density: String,
}

/// Admin surface commands, delivered per requester.
#[derive(Debug, Clone)]
pub enum AdminCommand {
    ListZones,
    SpawnZone(SpawnParams),
    RemoveNearest { position: Vec3, max_distance: f32 },
    RemoveById(String),
    ReloadConfig,
    ReloadAdmins,
    ReloadZones,
    CheckAdmin,
}

/// Authority-side admin command gateway.
///
/// Every command is checked against the allow-list and a per-requester
/// cooldown before execution. Rejection is feedback to the requester,
/// never a protocol error.
pub struct AdminGateway {
    roster: AdminRoster,
    store: ConfigStore,
    cooldowns: BTreeMap<String, u64>,
}

impl AdminGateway {
    pub fn new(store: ConfigStore) -> Self {
        let roster = store.load_or_create(ADMINS_FILE);
        Self {
            roster,
            store,
            cooldowns: BTreeMap::new(),
        }
    }

    pub fn roster(&self) -> &AdminRoster {
        &self.roster
    }

    /// Handle one command, returning feedback lines for the requester.
    /// An empty result means the command was swallowed by the cooldown.
    pub fn handle(
        &mut self,
        requester: &str,
        command: AdminCommand,
        now_ms: u64,
        registry: &mut ZoneRegistry,
        settings: &mut HazardSettings,
        rng: &mut impl Rng,
    ) -> Vec<String> {
        if let Some(&until) = self.cooldowns.get(requester) {
            if now_ms < until {
                return Vec::new();
            }
        }
        self.cooldowns
            .insert(requester.to_string(), now_ms + COMMAND_COOLDOWN_MS);

        let is_admin = self.roster.is_admin(requester);

        if let AdminCommand::CheckAdmin = command {
            return vec![format!("admin: {is_admin}")];
        }
        if !is_admin {
            tracing::warn!(requester, "admin command from unauthorized requester");
            return vec!["access denied".to_string()];
        }

        match command {
            AdminCommand::CheckAdmin => unreachable!(),
            AdminCommand::ListZones => {
                let mut lines = vec![format!("{} zone(s)", registry.zones().len())];
                for zone in registry.zones() {
                    lines.push(format!(
                        "{} '{}' tier {} {} r={:.0} at ({:.1}, {:.1})",
                        zone.id,
                        zone.name,
                        zone.tier,
                        zone.hazard.as_str(),
                        zone.radius,
                        zone.position.x,
                        zone.position.z,
                    ));
                }
                lines
            }
            AdminCommand::SpawnZone(params) => {
                let zone = ZoneDefinition {
                    id: String::new(),
                    name: params.name,
                    position: params.position,
                    radius: params.radius,
                    tier: params.tier,
                    hazard: params.hazard,
                    mask_required: params.mask_required,
                    color: params.color,
                    density: params.density,
                    dynamic: true,
                    ..ZoneDefinition::default()
                };
                match registry.add(zone, now_ms, rng) {
                    Ok(id) => vec![format!("spawned zone {id}")],
                    Err(err) => vec![format!("spawn failed: {err}")],
                }
            }
            AdminCommand::RemoveNearest {
                position,
                max_distance,
            } => match registry.remove_nearest(&position, max_distance) {
                Ok(zone) => vec![format!("removed zone {}", zone.id)],
                Err(MutateError::NotFound) => vec!["no zone in range".to_string()],
                Err(err) => vec![format!("remove failed: {err}")],
            },
            AdminCommand::RemoveById(id) => match registry.remove_by_id(&id) {
                Ok(zone) => vec![format!("removed zone {}", zone.id)],
                Err(MutateError::NotFound) => vec![format!("zone {id} not found")],
                Err(err) => vec![format!("remove failed: {err}")],
            },
            AdminCommand::ReloadConfig => {
                *settings = self.store.load_or_create(SETTINGS_FILE);
                vec!["settings reloaded".to_string()]
            }
            AdminCommand::ReloadAdmins => {
                self.roster = self.store.load_or_create(ADMINS_FILE);
                vec![format!("admins reloaded ({})", self.roster.admins.len())]
            }
            AdminCommand::ReloadZones => {
                registry.reload(now_ms, rng);
                vec![format!("zones reloaded ({})", registry.zones().len())]
            }
        }
    }
}
