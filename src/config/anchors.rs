use serde::{Deserialize, Serialize};

/// One radius band of the anchor count table: zones with
/// `radius <= max_radius` get `count` anchors before density scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusBand {
    pub max_radius: f32,
    pub count: u32,
}

fn default_bands() -> Vec<RadiusBand> {
    vec![
        RadiusBand {
            max_radius: 50.0,
            count: 100,
        },
        RadiusBand {
            max_radius: 300.0,
            count: 200,
        },
        RadiusBand {
            max_radius: 600.0,
            count: 300,
        },
        RadiusBand {
            max_radius: 900.0,
            count: 450,
        },
    ]
}

fn default_density_multiplier() -> [f32; 3] {
    [1.00, 1.15, 1.35]
}
fn default_spacing() -> [f32; 3] {
    [70.0, 55.0, 40.0]
}
fn default_jitter() -> [f32; 3] {
    [14.0, 12.0, 10.0]
}
fn default_hard_cap() -> u32 {
    600
}

/// Anchor layout configuration (`anchors.json`).
///
/// The three-element tables are indexed by density: `low`, `normal`,
/// `dense`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorSettings {
    #[serde(default = "default_bands")]
    pub bands: Vec<RadiusBand>,
    #[serde(default = "default_density_multiplier")]
    pub density_multiplier: [f32; 3],
    #[serde(default = "default_spacing")]
    pub spacing: [f32; 3],
    #[serde(default = "default_jitter")]
    pub jitter: [f32; 3],
    #[serde(default = "default_hard_cap")]
    pub hard_cap: u32,
}

impl Default for AnchorSettings {
    fn default() -> Self {
        Self {
            bands: default_bands(),
            density_multiplier: default_density_multiplier(),
            spacing: default_spacing(),
            jitter: default_jitter(),
            hard_cap: default_hard_cap(),
        }
    }
}

fn density_index(density: &str) -> usize {
    match density {
        "low" => 0,
        "dense" => 2,
        _ => 1,
    }
}

impl AnchorSettings {
    /// Band lookup: first band whose `max_radius` covers the radius, or
    /// the last band's count beyond the table.
    pub fn base_count(&self, radius: f32) -> u32 {
        for band in &self.bands {
            if radius <= band.max_radius {
                return band.count;
            }
        }
        self.bands.last().map(|b| b.count).unwrap_or(1)
    }

    pub fn density_multiplier(&self, density: &str) -> f32 {
        self.density_multiplier[density_index(density)]
    }

    pub fn spacing(&self, density: &str) -> f32 {
        self.spacing[density_index(density)]
    }

    pub fn jitter(&self, density: &str) -> f32 {
        self.jitter[density_index(density)]
    }

    /// Final anchor target for a zone: band count scaled by density,
    /// clamped to `[1, hard_cap]`.
    pub fn target_count(&self, radius: f32, density: &str) -> u32 {
        let scaled = (self.base_count(radius) as f32 * self.density_multiplier(density)) as u32;
        scaled.clamp(1, self.hard_cap.max(1))
    }
}
