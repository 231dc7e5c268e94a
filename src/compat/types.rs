//! Release records and compatibility results shared across the compat layer

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::compat::version::RankingMode;

/// Metadata for one published file of a release
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArtifactRecord {
    #[serde(default)]
    pub requires_python: Option<String>,
    /// ISO 8601 upload timestamp
    #[serde(default, rename = "upload_time_iso_8601")]
    pub upload_time: Option<String>,
}

impl ArtifactRecord {
    pub fn new(requires_python: Option<&str>, upload_time: Option<&str>) -> Self {
        Self {
            requires_python: requires_python.map(str::to_string),
            upload_time: upload_time.map(str::to_string),
        }
    }
}

/// Release version string → files of that release, in registry order
pub type Releases = IndexMap<String, Vec<ArtifactRecord>>;

/// The release selected for one Python version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityEntry {
    pub version: String,
    pub released: Option<String>,
    /// The constraint the selection was made under; absent when unconstrained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_python: Option<String>,
}

/// Python version → newest compatible release, or `None` when unsupported.
///
/// Every target is present as a key; iteration follows target order.
pub type CompatibilityMatrix = IndexMap<String, Option<CompatibilityEntry>>;

/// Outcome of resolving one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub matrix: CompatibilityMatrix,
    /// [`RankingMode::Lexicographic`] marks a best-effort result
    pub mode: RankingMode,
}

impl Resolution {
    pub fn is_degraded(&self) -> bool {
        self.mode == RankingMode::Lexicographic
    }
}

/// Release data for one package as delivered by a registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageReleases {
    /// Where the data came from (e.g. the JSON API URL)
    pub source: String,
    pub releases: Releases,
}

/// Persisted result document for one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageCompat {
    pub package: String,
    pub metadata: String,
    pub last_updated: String,
    pub ordering: RankingMode,
    pub python_compatibility: CompatibilityMatrix,
}
