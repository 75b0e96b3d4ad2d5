//! Options controlling patch generation.

use serde::{Deserialize, Serialize};

/// KeyPolicy decides what happens to map keys that contain `/` or `~`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyPolicy {
    /// Escape the key as a pointer token (`/` becomes `~1`, `~` becomes `~0`).
    #[default]
    Escape,
    /// Fail with [`PatchError::InvalidKey`](crate::patch::PatchError::InvalidKey).
    Reject,
}

/// PatchOptions tunes the differs. Every field has a default, so an empty
/// options file is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatchOptions {
    pub key_policy: KeyPolicy,
}

impl PatchOptions {
    /// Returns options with the given key policy.
    pub fn with_key_policy(mut self, key_policy: KeyPolicy) -> Self {
        self.key_policy = key_policy;
        self
    }

    /// Parses options from YAML (or JSON).
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}
