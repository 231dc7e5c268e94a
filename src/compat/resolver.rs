//! Compatibility resolver
//!
//! For every target Python version, selects the newest stable release whose
//! `requires_python` admits that version.

use tracing::debug;

use crate::compat::constraint::Constraint;
use crate::compat::error::ResolveError;
use crate::compat::types::{CompatibilityEntry, CompatibilityMatrix, Releases, Resolution};
use crate::compat::version::{RuntimeVersion, rank_candidates};

/// Validated, non-empty list of target Python versions in output order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetVersions(Vec<RuntimeVersion>);

impl TargetVersions {
    pub fn new<I, S>(labels: I) -> Result<Self, ResolveError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let targets = labels
            .into_iter()
            .map(|label| {
                let label = label.as_ref();
                RuntimeVersion::parse(label)
                    .ok_or_else(|| ResolveError::InvalidTarget(label.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if targets.is_empty() {
            return Err(ResolveError::NoTargets);
        }
        Ok(Self(targets))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuntimeVersion> {
        self.0.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.0.iter().map(RuntimeVersion::label).collect()
    }
}

/// A ranked release with the metadata consulted for selection
struct Candidate<'a> {
    version: &'a str,
    released: Option<&'a str>,
    requires_python: Option<&'a str>,
    constraint: Constraint,
}

impl<'a> Candidate<'a> {
    fn new(version: &'a str, releases: &'a Releases) -> Self {
        let files = releases.get(version).map(Vec::as_slice).unwrap_or_default();

        let released = files.first().and_then(|f| f.upload_time.as_deref());
        // The first file that declares requires_python is authoritative
        let requires_python = files.iter().find_map(|f| {
            f.requires_python
                .as_deref()
                .filter(|spec| !spec.trim().is_empty())
        });

        Self {
            version,
            released,
            requires_python,
            constraint: Constraint::parse(requires_python),
        }
    }

    fn to_entry(&self) -> CompatibilityEntry {
        CompatibilityEntry {
            version: self.version.to_string(),
            released: self.released.map(str::to_string),
            requires_python: self.requires_python.map(str::to_string),
        }
    }
}

/// Build the compatibility matrix for one package.
///
/// Releases without any file are ignored. Every target appears in the
/// matrix; targets no release supports map to `None`.
pub fn resolve(releases: &Releases, targets: &TargetVersions) -> Resolution {
    let published = releases
        .iter()
        .filter(|(_, files)| !files.is_empty())
        .map(|(version, _)| version.as_str());

    let ranking = rank_candidates(published);
    debug!(
        "Ranked {} of {} releases ({:?} ordering)",
        ranking.candidates.len(),
        releases.len(),
        ranking.mode
    );

    let candidates: Vec<Candidate<'_>> = ranking
        .candidates
        .into_iter()
        .map(|version| Candidate::new(version, releases))
        .collect();

    let matrix: CompatibilityMatrix = targets
        .iter()
        .map(|target| {
            let selected = candidates
                .iter()
                .find(|candidate| candidate.constraint.allows(target))
                .map(Candidate::to_entry);
            (target.label().to_string(), selected)
        })
        .collect();

    Resolution {
        matrix,
        mode: ranking.mode,
    }
}
