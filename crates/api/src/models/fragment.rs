use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use smol_str::SmolStr;

use super::record::ImplementorRecord;
use super::util::serde_arc_str;
use crate::error::{ApiError, ApiResult};

/// Module name as it appears in fragment payloads (e.g. `forge`).
pub type ModuleName = SmolStr;

/// Canonical `::`-separated path of a capability (e.g. `forge::interface::Test`).
///
/// Cheap to clone; fragments, index keys and summaries share one allocation
/// per distinct capability.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
pub struct CapabilityId(
    #[serde(with = "serde_arc_str")]
    #[schemars(with = "String")]
    Arc<str>,
);

impl CapabilityId {
    pub fn new(id: impl AsRef<str>) -> ApiResult<Self> {
        let id = id.as_ref();
        Self::check_path(id)?;
        Ok(Self(Arc::from(id)))
    }

    /// Shape rules every capability path satisfies, whether constructed or
    /// deserialized.
    fn check_path(id: &str) -> ApiResult<()> {
        if id.is_empty() {
            return Err(ApiError::InvalidCapability {
                id: id.to_string(),
                reason: "capability path must not be empty",
            });
        }
        if id.chars().any(char::is_whitespace) {
            return Err(ApiError::InvalidCapability {
                id: id.to_string(),
                reason: "capability path must not contain whitespace",
            });
        }
        if id.split("::").any(str::is_empty) {
            return Err(ApiError::InvalidCapability {
                id: id.to_string(),
                reason: "capability path contains an empty segment",
            });
        }
        Ok(())
    }

    /// Joins path segments into a capability id, so `["forge", "interface",
    /// "Test"]` becomes `forge::interface::Test`.
    pub fn from_segments<I, S>(segments: I) -> ApiResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = segments
            .into_iter()
            .map(|s| s.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join("::");
        Self::new(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path segment, the capability's unqualified name.
    pub fn name(&self) -> &str {
        self.0.rsplit("::").next().unwrap_or(&self.0)
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CapabilityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets maps keyed by capability answer `&str` lookups.
impl std::borrow::Borrow<str> for CapabilityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// The serde boundary runs the same shape rules as `new`.
impl<'de> Deserialize<'de> for CapabilityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = serde_arc_str::deserialize(deserializer)?;
        Self::check_path(&id).map_err(serde::de::Error::custom)?;
        Ok(Self(id))
    }
}

/// One load unit's full contribution for one capability: every implementing
/// type it declares, grouped by module and kept in declaration order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct IndexFragment {
    pub capability: CapabilityId,
    /// Module name to that module's complete record list.
    #[schemars(with = "std::collections::BTreeMap<String, Vec<ImplementorRecord>>")]
    pub entries: IndexMap<ModuleName, Vec<ImplementorRecord>>,
}

impl IndexFragment {
    pub fn new(capability: CapabilityId) -> Self {
        Self {
            capability,
            entries: IndexMap::new(),
        }
    }

    /// Sets the complete record list for `module`. When a fragment names the
    /// same module twice, the last list wins at the position of the first.
    pub fn set_module(&mut self, module: ModuleName, records: Vec<ImplementorRecord>) {
        self.entries.insert(module, records);
    }

    pub fn record_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalizes every record and rejects shapes the index must never see.
    pub fn into_validated(mut self) -> ApiResult<Self> {
        for (module, records) in &mut self.entries {
            if module.trim().is_empty() {
                return Err(ApiError::InvalidModule {
                    module: module.to_string(),
                    reason: "module name must not be empty",
                });
            }
            for record in records {
                record.normalize();
                if let Err(reason) = record.check() {
                    return Err(ApiError::InvalidRecord {
                        module: module.to_string(),
                        reason,
                    });
                }
            }
        }
        Ok(self)
    }
}
