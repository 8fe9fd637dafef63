//! Serialized rig description.
//!
//! A rig is an ordered list of constraint entries plus evaluation settings:
//!
//! ```json
//! {
//!   "name": "biped",
//!   "settings": { "clamp_weight": true },
//!   "constraints": [
//!     { "id": "blend", "weight": 1.0,
//!       "constraint": { "type": "blend_slider", "target": "t",
//!                       "source_a": "a", "source_b": "b", "slider": "s" } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::constraints::ConstraintData;
use crate::error::RigError;

fn default_weight() -> f32 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstraintEntry {
    pub id: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
    pub constraint: ConstraintData,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RigData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub settings: Config,
    /// Evaluation order is list order.
    pub constraints: Vec<ConstraintEntry>,
}

impl RigData {
    /// Check ids are unique and every constraint has all references set.
    /// Does not resolve references; that happens at bind time.
    pub fn validate(&self) -> Result<(), RigError> {
        for (i, entry) in self.constraints.iter().enumerate() {
            if self.constraints[..i].iter().any(|e| e.id == entry.id) {
                return Err(RigError::DuplicateConstraint(entry.id.clone()));
            }
            entry.constraint.validate()?;
        }
        Ok(())
    }
}

/// Parse and validate a rig description.
pub fn parse_rig_json(s: &str) -> Result<RigData, RigError> {
    let data: RigData = serde_json::from_str(s).map_err(|e| RigError::Parse(e.to_string()))?;
    data.validate()?;
    Ok(data)
}
