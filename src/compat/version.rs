//! PEP 440 version model for package releases and target Python versions

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use pep508_rs::pep440_rs::Version;
use serde::Serialize;
use tracing::{debug, warn};

/// A release version string together with its parsed PEP 440 value.
///
/// Ordering and equality use the parsed value, so `1.0` and `1.0.0` are equal.
#[derive(Debug, Clone)]
pub struct PackageVersion {
    raw: String,
    parsed: Version,
}

impl PackageVersion {
    /// Parse a release version, returning `None` when it is not valid PEP 440.
    pub fn parse(raw: &str) -> Option<Self> {
        let parsed = Version::from_str(raw.trim())
            .inspect_err(|e| debug!("Unparseable version '{}': {}", raw, e))
            .ok()?;
        Some(Self {
            raw: raw.to_string(),
            parsed,
        })
    }

    /// The version string exactly as published
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Alpha, beta, release candidate and dev releases are pre-releases.
    pub fn is_prerelease(&self) -> bool {
        self.parsed.is_pre() || self.parsed.is_dev()
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.parsed == other.parsed
    }
}

impl Eq for PackageVersion {}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed.cmp(&other.parsed)
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Compare two parsed release versions
pub fn compare(a: &PackageVersion, b: &PackageVersion) -> Ordering {
    a.cmp(b)
}

/// A target Python version such as `3.11`.
///
/// A `major.minor` label is evaluated as `major.minor.0`, which is how the
/// interpreter reports its own version to installers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeVersion {
    label: String,
    version: Version,
}

impl RuntimeVersion {
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        let normalized = match trimmed.split('.').count() {
            2 => format!("{}.0", trimmed),
            _ => trimmed.to_string(),
        };
        let version = Version::from_str(&normalized).ok()?;
        Some(Self {
            label: trimmed.to_string(),
            version,
        })
    }

    /// The label as given, used as the matrix key
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn version(&self) -> &Version {
        &self.version
    }
}

/// How the candidate list was ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMode {
    /// PEP 440 ordering, pre-releases excluded
    Semantic,
    /// No release parsed; best-effort string ordering of every release
    Lexicographic,
}

/// Release version strings ordered newest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking<'a> {
    pub candidates: Vec<&'a str>,
    pub mode: RankingMode,
}

/// Order release versions newest first for candidate scanning.
///
/// Unparseable versions are dropped and pre-releases are excluded. When no
/// version parses at all, every version is kept and ordered by descending
/// string comparison instead, and the ranking is marked
/// [`RankingMode::Lexicographic`]. Equal versions keep their input order.
pub fn rank_candidates<'a, I>(versions: I) -> Ranking<'a>
where
    I: IntoIterator<Item = &'a str>,
{
    let versions: Vec<&'a str> = versions.into_iter().collect();

    let (parsed, unparseable): (Vec<_>, Vec<_>) = versions
        .iter()
        .map(|raw| (*raw, PackageVersion::parse(raw)))
        .partition(|(_, parsed)| parsed.is_some());

    if parsed.is_empty() && !unparseable.is_empty() {
        warn!(
            "None of {} versions is valid PEP 440; falling back to string ordering",
            versions.len()
        );
        let mut candidates = versions;
        candidates.sort_by(|a, b| b.cmp(a));
        return Ranking {
            candidates,
            mode: RankingMode::Lexicographic,
        };
    }

    if !unparseable.is_empty() {
        debug!(
            "Dropping {} unparseable versions from ranking: {:?}",
            unparseable.len(),
            unparseable.iter().map(|(raw, _)| *raw).collect::<Vec<_>>()
        );
    }

    let mut stable: Vec<(&'a str, PackageVersion)> = parsed
        .into_iter()
        .filter_map(|(raw, parsed)| parsed.map(|p| (raw, p)))
        .filter(|(_, parsed)| !parsed.is_prerelease())
        .collect();
    stable.sort_by(|(_, a), (_, b)| compare(b, a));

    Ranking {
        candidates: stable.into_iter().map(|(raw, _)| raw).collect(),
        mode: RankingMode::Semantic,
    }
}
