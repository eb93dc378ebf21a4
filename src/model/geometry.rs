use serde::{Deserialize, Serialize};

/// World-space position. `x`/`z` span the horizontal plane; `y` is height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Squared horizontal distance (ignores `y`).
    pub fn distance_sq_xz(&self, other: &Vec3) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }

    /// Horizontal distance (ignores `y`).
    pub fn distance_xz(&self, other: &Vec3) -> f32 {
        self.distance_sq_xz(other).sqrt()
    }

    /// Squared full 3D distance.
    pub fn distance_sq(&self, other: &Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

/// Parse a position string in `"x,y,z"`, `"x y z"`, `"x,z"`, or `"x z"` form.
///
/// Two components are treated as horizontal coordinates with `y = 0`.
/// Returns `None` for anything that does not parse as 2 or 3 floats.
pub fn parse_position(text: &str) -> Option<Vec3> {
    let parts: Vec<f32> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .ok()?;

    match parts.as_slice() {
        [x, z] => Some(Vec3::new(*x, 0.0, *z)),
        [x, y, z] => Some(Vec3::new(*x, *y, *z)),
        _ => None,
    }
}
