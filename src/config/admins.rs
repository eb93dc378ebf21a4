use serde::{Deserialize, Serialize};

/// Placeholder entry written into a freshly created `admins.json` so the
/// file shape is discoverable. Never matches a real requester.
pub const PLACEHOLDER_ADMIN: &str = "REPLACE_WITH_ADMIN_ID";

/// Admin allow-list (`admins.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminRoster {
    pub admins: Vec<String>,
}

impl Default for AdminRoster {
    fn default() -> Self {
        Self {
            admins: vec![PLACEHOLDER_ADMIN.to_string()],
        }
    }
}

impl AdminRoster {
    pub fn is_admin(&self, requester: &str) -> bool {
        !requester.is_empty()
            && requester != PLACEHOLDER_ADMIN
            && self.admins.iter().any(|a| a == requester)
    }
}
