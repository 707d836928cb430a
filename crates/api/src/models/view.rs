use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::fragment::CapabilityId;

/// Per-capability roll-up used by listing surfaces.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct CapabilitySummary {
    pub capability: CapabilityId,
    pub module_count: usize,
    pub record_count: usize,
    pub synthetic_count: usize,
}

/// Whole-index roll-up.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
pub struct IndexStats {
    pub capability_count: usize,
    pub module_count: usize,
    pub record_count: usize,
}
