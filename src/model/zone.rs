use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Vec3, parse_position};

/// Hazard class of a gas zone. Drives damage rates, filter drain, and
/// the persistent afflictions an exposed entity can pick up.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum HazardType {
    #[default]
    Toxic,
    Nerve,
    Bio,
}

impl HazardType {
    /// Parse a legacy string token. Unknown tokens map to `Toxic`.
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_uppercase().as_str() {
            "NERVE" => HazardType::Nerve,
            "BIO" => HazardType::Bio,
            _ => HazardType::Toxic,
        }
    }

    /// Convert a legacy integer code. Unknown codes map to `Toxic`.
    pub fn from_legacy(code: i32) -> Self {
        match code {
            1 => HazardType::Nerve,
            2 => HazardType::Bio,
            _ => HazardType::Toxic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardType::Toxic => "TOXIC",
            HazardType::Nerve => "NERVE",
            HazardType::Bio => "BIO",
        }
    }
}

pub const MIN_TIER: u8 = 1;
pub const MAX_TIER: u8 = 4;

pub const DEFAULT_ZONE_NAME: &str = "Gas Zone";
pub const DEFAULT_COLOR: &str = "default";
pub const DEFAULT_DENSITY: &str = "normal";

/// Normalize a color token: lowercase, empty becomes `"default"`.
pub fn normalize_color(color: &str) -> String {
    let trimmed = color.trim().to_ascii_lowercase();
    if trimmed.is_empty() {
        DEFAULT_COLOR.to_string()
    } else {
        trimmed
    }
}

/// Normalize a density token to the closed vocabulary `low | normal | dense`.
pub fn normalize_density(density: &str) -> String {
    match density.trim().to_ascii_lowercase().as_str() {
        "low" | "light" | "lo" => "low".to_string(),
        "dense" | "thick" => "dense".to_string(),
        // "normal", "med", "medium", "" and anything unknown
        _ => DEFAULT_DENSITY.to_string(),
    }
}

/// Generate a fresh zone id of the form `TGZ-<millis>-<6-digit random>`.
pub fn generate_zone_id(now_ms: u64, rng: &mut impl Rng) -> String {
    format!("TGZ-{}-{:06}", now_ms, rng.random_range(0..1_000_000u32))
}

/// Authoritative definition of one gas zone.
///
/// The vertical band is expressed relative to terrain height at the zone's
/// XZ center: the band starts `bottom_offset` below the surface and extends
/// `height + vertical_margin` upward from that base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneDefinition {
    pub id: String,
    pub name: String,
    /// Accepts the legacy `"x y z"` string form on load; always written
    /// back structured.
    #[serde(deserialize_with = "position_compat")]
    pub position: Vec3,
    pub radius: f32,
    pub height: f32,
    pub bottom_offset: f32,
    pub vertical_margin: f32,
    pub tier: u8,
    pub hazard: HazardType,
    pub mask_required: bool,
    pub color: String,
    pub density: String,
    /// Admin-spawned/ephemeral rather than file-defined.
    pub dynamic: bool,
    /// Periodic-cycle parameters, persisted and replicated but not
    /// consumed by the simulation.
    pub cycle: bool,
    pub cycle_seconds: f32,
}

/// Deserialize a position from either the structured form or a legacy
/// `"x,y,z"` / `"x y z"` string. Unparseable strings fall back to the
/// origin rather than failing the whole zone list.
fn position_compat<'de, D>(deserializer: D) -> Result<Vec3, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PositionRepr {
        Structured(Vec3),
        Legacy(String),
    }

    Ok(match PositionRepr::deserialize(deserializer)? {
        PositionRepr::Structured(position) => position,
        PositionRepr::Legacy(text) => parse_position(&text).unwrap_or_default(),
    })
}

impl Default for ZoneDefinition {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: DEFAULT_ZONE_NAME.to_string(),
            position: Vec3::default(),
            radius: 50.0,
            height: 30.0,
            bottom_offset: 5.0,
            vertical_margin: 2.0,
            tier: 2,
            hazard: HazardType::Toxic,
            mask_required: true,
            color: DEFAULT_COLOR.to_string(),
            density: DEFAULT_DENSITY.to_string(),
            dynamic: false,
            cycle: false,
            cycle_seconds: 0.0,
        }
    }
}

impl ZoneDefinition {
    /// Patch invalid or missing fields in place. Returns `true` if anything
    /// was changed, so callers can rewrite the backing file.
    pub fn normalize(&mut self, now_ms: u64, rng: &mut impl Rng) -> bool {
        let mut patched = false;

        if self.id.trim().is_empty() {
            self.id = generate_zone_id(now_ms, rng);
            patched = true;
        }
        if self.name.trim().is_empty() {
            self.name = DEFAULT_ZONE_NAME.to_string();
            patched = true;
        }

        let color = normalize_color(&self.color);
        if color != self.color {
            self.color = color;
            patched = true;
        }
        let density = normalize_density(&self.density);
        if density != self.density {
            self.density = density;
            patched = true;
        }

        let tier = self.tier.clamp(MIN_TIER, MAX_TIER);
        if tier != self.tier {
            self.tier = tier;
            patched = true;
        }

        patched
    }
}
