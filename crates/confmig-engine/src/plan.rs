//! Migration plans
//!
//! A plan is data: a mapping table plus an ordered list of normalizer steps,
//! written as TOML. The built-in plans are embedded at compile time; any other
//! plan file with the same schema can be loaded at runtime.

use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use confmig_document::KeyPath;
use confmig_rules::Step;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PlanError;
use crate::table::MappingTable;

const V2_TO_V3: &str = include_str!("../plans/v2_to_v3.toml");
const V3_TO_V4: &str = include_str!("../plans/v3_to_v4.toml");
const V5_TO_V6: &str = include_str!("../plans/v5_to_v6.toml");
const V5_TO_V6_ENV: &str = include_str!("../plans/v5_to_v6_env.toml");

/// What a plan converts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    /// Structured configuration document
    #[default]
    Document,
    /// Flat `KEY="value"` environment lines
    Env,
}

impl Display for PlanKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Env => write!(f, "env"),
        }
    }
}

/// One migration between two schema versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan name
    pub name: String,
    /// Source schema version
    pub from: String,
    /// Target schema version
    pub to: String,
    /// Input kind
    #[serde(default)]
    pub kind: PlanKind,
    /// Built-in plan whose mapping table is placed before this plan's own
    #[serde(default)]
    pub inherit_mappings: Option<Transition>,
    /// Key-path mapping table; when empty the plan rewrites a copy of its input
    #[serde(default)]
    pub mappings: MappingTable,
    /// Shared legacy proxy options and their path inside each proxy object
    #[serde(default)]
    pub hoist_fields: IndexMap<String, KeyPath>,
    /// Legacy options whose presence implies a `true` flag (env plans)
    #[serde(default)]
    pub env_flags: IndexMap<String, String>,
    /// Normalizer steps, in order
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Plan {
    /// Parse plan text and resolve inherited mappings
    ///
    /// # Errors
    /// Returns [`PlanError::Invalid`] for malformed TOML or an unknown rule,
    /// and [`PlanError::NestedInheritance`] for chained inheritance.
    pub fn from_toml_str(name: &str, text: &str) -> Result<Self, PlanError> {
        let mut plan: Self = toml::from_str(text).map_err(|e| PlanError::invalid(name, e))?;

        if let Some(parent) = plan.inherit_mappings {
            let base: Self = toml::from_str(parent.source()).map_err(|e| PlanError::invalid(parent.plan_name(), e))?;
            if base.inherit_mappings.is_some() {
                return Err(PlanError::NestedInheritance(plan.name));
            }
            let mut mappings = base.mappings;
            mappings.extend(std::mem::take(&mut plan.mappings));
            plan.mappings = mappings;
        }

        tracing::debug!(
            plan = %plan.name,
            mappings = plan.mappings.len(),
            steps = plan.steps.len(),
            "loaded plan"
        );
        Ok(plan)
    }

    /// Load a plan file
    ///
    /// # Errors
    /// Returns [`PlanError::Io`] if the file cannot be read, otherwise as
    /// [`Plan::from_toml_str`].
    pub fn from_file(path: &Path) -> Result<Self, PlanError> {
        let text = std::fs::read_to_string(path).map_err(|source| PlanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&path.display().to_string(), &text)
    }

    /// Check whether the plan builds a fresh document from its mapping table
    #[inline]
    #[must_use]
    pub fn is_table_driven(&self) -> bool {
        !self.mappings.is_empty()
    }
}

/// Built-in schema transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// v2 to v3 configuration file
    V2ToV3,
    /// v3 to v4 configuration file
    V3ToV4,
    /// v5 to v6 configuration file
    V5ToV6,
    /// v5 to v6 environment variables
    V5ToV6Env,
}

impl Transition {
    /// All built-in transitions
    pub const ALL: [Self; 4] = [Self::V2ToV3, Self::V3ToV4, Self::V5ToV6, Self::V5ToV6Env];

    /// Short name accepted on the command line
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V2ToV3 => "v2-v3",
            Self::V3ToV4 => "v3-v4",
            Self::V5ToV6 => "v5-v6",
            Self::V5ToV6Env => "v5-v6-env",
        }
    }

    /// Name of the embedded plan
    #[must_use]
    pub fn plan_name(self) -> &'static str {
        match self {
            Self::V2ToV3 => "v2_to_v3",
            Self::V3ToV4 => "v3_to_v4",
            Self::V5ToV6 => "v5_to_v6",
            Self::V5ToV6Env => "v5_to_v6_env",
        }
    }

    /// Embedded plan text
    #[must_use]
    pub fn source(self) -> &'static str {
        match self {
            Self::V2ToV3 => V2_TO_V3,
            Self::V3ToV4 => V3_TO_V4,
            Self::V5ToV6 => V5_TO_V6,
            Self::V5ToV6Env => V5_TO_V6_ENV,
        }
    }

    /// Parse the embedded plan
    ///
    /// # Errors
    /// Returns [`PlanError`] if the embedded plan is malformed.
    pub fn plan(self) -> Result<Plan, PlanError> {
        Plan::from_toml_str(self.plan_name(), self.source())
    }
}

impl Display for Transition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transition {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized || t.plan_name().replace('_', "-") == normalized)
            .ok_or_else(|| PlanError::UnknownTransition(s.to_string()))
    }
}

impl Serialize for Transition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Transition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
