//! Collection of compatibility results for many packages
//!
//! Each package is fetched, resolved and persisted independently; a failure
//! for one package is logged and does not stop the others.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use indexmap::IndexMap;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::compat::error::{CollectError, StoreError};
use crate::compat::registry::Registry;
use crate::compat::resolver::{TargetVersions, resolve};
use crate::compat::store::{CompatIndex, ResultStore};
use crate::compat::types::{PackageCompat, Releases};
use crate::compat::version::PackageVersion;
use crate::config::CollectorConfig;

/// Knobs for a collection run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectOptions {
    /// Delay between starting each package, to stay under registry rate limits
    pub stagger_delay: Duration,
    pub release_metadata_fallback: bool,
}

impl From<&CollectorConfig> for CollectOptions {
    fn from(config: &CollectorConfig) -> Self {
        Self {
            stagger_delay: Duration::from_millis(config.stagger_delay_ms),
            release_metadata_fallback: config.release_metadata_fallback,
        }
    }
}

/// Outcome of a collection run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectSummary {
    /// Package name → written result file, in input order
    pub succeeded: IndexMap<String, PathBuf>,
    /// Packages that could not be collected, in input order
    pub failed: Vec<String>,
    pub index_path: Option<PathBuf>,
}

/// Fill in `requires_python` from the per-release endpoint for selectable
/// releases whose files carry none. Lookup failures leave the release
/// unconstrained.
///
/// Only stable, parseable releases are selectable, unless no release key
/// parses at all; string ordering then makes every non-empty release a
/// candidate.
async fn fill_missing_requires_python(
    registry: &dyn Registry,
    package_name: &str,
    releases: &mut Releases,
) {
    let degraded = !releases
        .iter()
        .any(|(version, files)| !files.is_empty() && PackageVersion::parse(version).is_some());

    for (version, files) in releases.iter_mut() {
        let declared = files
            .iter()
            .any(|f| f.requires_python.as_deref().is_some_and(|s| !s.trim().is_empty()));
        if files.is_empty() || declared {
            continue;
        }
        let selectable =
            degraded || PackageVersion::parse(version).is_some_and(|v| !v.is_prerelease());
        if !selectable {
            continue;
        }

        match registry
            .fetch_release_requires_python(package_name, version)
            .await
        {
            Ok(Some(spec)) => {
                debug!(
                    "Using release metadata requires_python '{}' for {} {}",
                    spec, package_name, version
                );
                if let Some(first) = files.first_mut() {
                    first.requires_python = Some(spec);
                }
            }
            Ok(None) => {}
            Err(e) => debug!(
                "Failed to fetch release metadata for {} {}: {}",
                package_name, version, e
            ),
        }
    }
}

fn log_summary(result: &PackageCompat) {
    info!("Python compatibility summary for {}:", result.package);
    for (target, entry) in &result.python_compatibility {
        match entry {
            Some(entry) => {
                let released = entry.released.as_deref().unwrap_or("unknown");
                info!(
                    "  Python {}: {} (released {})",
                    target,
                    entry.version,
                    released.get(..10).unwrap_or(released)
                );
            }
            None => info!("  Python {}: not supported", target),
        }
    }
}

/// Fetch, resolve and persist one package
///
/// Returns the path of the written result file.
pub async fn collect_package<S: ResultStore>(
    registry: &dyn Registry,
    store: &S,
    package_name: &str,
    targets: &TargetVersions,
    options: &CollectOptions,
) -> Result<PathBuf, CollectError> {
    info!("Processing {}", package_name);

    let mut package = registry.fetch_releases(package_name).await?;
    if options.release_metadata_fallback {
        fill_missing_requires_python(registry, package_name, &mut package.releases).await;
    }

    let resolution = resolve(&package.releases, targets);
    if resolution.is_degraded() {
        warn!(
            "{}: no release version is valid PEP 440, result uses string ordering",
            package_name
        );
    }

    let result = PackageCompat {
        package: package_name.to_string(),
        metadata: package.source,
        last_updated: Utc::now().to_rfc3339(),
        ordering: resolution.mode,
        python_compatibility: resolution.matrix,
    };

    let path = store.save_package(&result)?;
    log_summary(&result);

    Ok(path)
}

/// Collect every package and write the index of successes
///
/// Packages run concurrently with staggered start times. Per-package errors
/// are logged and reported in the summary; only a failure to write the index
/// is returned as an error.
pub async fn collect_packages<S: ResultStore>(
    registry: &dyn Registry,
    store: &S,
    packages: &[String],
    targets: &TargetVersions,
    options: &CollectOptions,
) -> Result<CollectSummary, StoreError> {
    let futures = packages.iter().enumerate().map(|(i, package_name)| {
        let delay = options.stagger_delay * i as u32;
        async move {
            sleep(delay).await;
            let result = collect_package(registry, store, package_name, targets, options)
                .await
                .inspect_err(|e| error!("Failed to process {}: {}", package_name, e));
            (package_name, result)
        }
    });

    let mut summary = CollectSummary::default();
    for (package_name, result) in join_all(futures).await {
        match result {
            Ok(path) => {
                summary.succeeded.insert(package_name.clone(), path);
            }
            Err(_) => summary.failed.push(package_name.clone()),
        }
    }

    let index = CompatIndex {
        last_updated: Utc::now().to_rfc3339(),
        count: summary.succeeded.len(),
        packages: summary
            .succeeded
            .iter()
            .map(|(name, path)| {
                let file = path
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                (name.clone(), file)
            })
            .collect(),
    };
    summary.index_path = Some(store.save_index(&index)?);

    info!(
        "Collected {} of {} packages ({} failed)",
        summary.succeeded.len(),
        packages.len(),
        summary.failed.len()
    );

    Ok(summary)
}
