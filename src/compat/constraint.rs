//! `requires_python` constraint parsing and evaluation using PEP 440 specifiers

use std::str::FromStr;

use pep508_rs::pep440_rs::VersionSpecifiers;
use tracing::warn;

use crate::compat::version::RuntimeVersion;

/// Parsed form of a release's `requires_python` metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// No constraint was declared; every Python version is accepted
    Unconstrained,
    /// All specifiers must hold (comma-separated clauses are ANDed)
    Specifiers(VersionSpecifiers),
    /// The declared text could not be parsed; no Python version is accepted
    Unparseable { raw: String, reason: String },
}

impl Constraint {
    /// Parse a `requires_python` value. Never fails: absent or blank text is
    /// [`Constraint::Unconstrained`], malformed text is
    /// [`Constraint::Unparseable`]. Empty comma clauses (`">=3.6,"`) are
    /// ignored.
    pub fn parse(spec: Option<&str>) -> Self {
        let Some(spec) = spec.map(str::trim).filter(|s| !s.is_empty()) else {
            return Constraint::Unconstrained;
        };

        let clauses: Vec<&str> = spec
            .split(',')
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
            .collect();
        if clauses.is_empty() {
            return Constraint::Unconstrained;
        }

        match VersionSpecifiers::from_str(&clauses.join(", ")) {
            Ok(specifiers) => Constraint::Specifiers(specifiers),
            Err(e) => {
                warn!("Failed to parse requires_python '{}': {}", spec, e);
                Constraint::Unparseable {
                    raw: spec.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Whether a release with this constraint installs on `runtime`
    pub fn allows(&self, runtime: &RuntimeVersion) -> bool {
        match self {
            Constraint::Unconstrained => true,
            Constraint::Specifiers(specifiers) => specifiers.contains(runtime.version()),
            Constraint::Unparseable { .. } => false,
        }
    }

    pub fn is_unparseable(&self) -> bool {
        matches!(self, Constraint::Unparseable { .. })
    }
}
