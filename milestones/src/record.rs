//! Milestone numbers and the metadata record stored for each one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseMilestoneError;

/// Prefix every branch ref is stored under.
pub const REF_PREFIX: &str = "refs/heads/";

/// Platforms a newly activated milestone builds on.
pub const DEFAULT_PLATFORMS: [&str; 3] = ["linux", "mac", "win"];

/// A release milestone number (e.g. `110` for M110).
///
/// Always positive. Serialized as its decimal form, which is also how it
/// appears as a key in the registry file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct MilestoneNumber(u32);

impl TryFrom<u32> for MilestoneNumber {
    type Error = ParseMilestoneError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value == 0 {
            return Err(ParseMilestoneError::Zero);
        }
        Ok(Self(value))
    }
}

impl From<MilestoneNumber> for u32 {
    fn from(value: MilestoneNumber) -> Self {
        value.0
    }
}

impl FromStr for MilestoneNumber {
    type Err = ParseMilestoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u32>()
            .map_err(|_| ParseMilestoneError::Invalid(s.to_string()))?;
        Self::try_from(value)
    }
}

impl fmt::Display for MilestoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Branch metadata for one active milestone.
///
/// Fields the registry file carries beyond the known ones are kept in
/// `extra` so that a read/write cycle does not drop them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MilestoneRecord {
    /// Display name, `m<N>`.
    pub name: String,
    /// Upstream project the milestone tracks, `chromium-m<N>`.
    pub chromium_project: String,
    /// Full branch ref, `refs/heads/<branch>`.
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub platforms: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MilestoneRecord {
    /// Record for a milestone newly cut from `branch`.
    pub fn new(milestone: MilestoneNumber, branch: &str) -> Self {
        Self {
            name: format!("m{milestone}"),
            chromium_project: format!("chromium-m{milestone}"),
            git_ref: format!("{REF_PREFIX}{branch}"),
            platforms: DEFAULT_PLATFORMS.iter().map(ToString::to_string).collect(),
            extra: serde_json::Map::new(),
        }
    }

    /// Branch leaf of `git_ref`, if it lives under `refs/heads/`.
    pub fn branch(&self) -> Option<&str> {
        self.git_ref.strip_prefix(REF_PREFIX)
    }
}
