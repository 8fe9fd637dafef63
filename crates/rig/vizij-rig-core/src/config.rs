//! Rig evaluation settings.

use serde::{Deserialize, Serialize};

/// Settings applied when building and evaluating a [`crate::Rig`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Clamp each constraint's weight into [0, 1] before evaluation.
    pub clamp_weight: bool,
    /// Allow two constraints to write the same node in one frame. When false,
    /// such rigs are rejected at bind time.
    pub allow_shared_write_targets: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clamp_weight: true,
            allow_shared_write_targets: false,
        }
    }
}

impl Config {
    #[inline]
    pub fn effective_weight(&self, weight: f32) -> f32 {
        if self.clamp_weight {
            weight.clamp(0.0, 1.0)
        } else {
            weight
        }
    }
}
