//! Registry trait for fetching release data from a package index

#[cfg(test)]
use mockall::automock;

use crate::compat::error::RegistryError;
use crate::compat::types::PackageReleases;

/// Trait for fetching release metadata from a registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Fetches every release of a package with its per-file metadata
    ///
    /// # Arguments
    /// * `package_name` - The name of the package (e.g., "requests")
    ///
    /// # Returns
    /// * `Ok(PackageReleases)` - Releases in registry order
    /// * `Err(RegistryError)` - If the fetch fails
    async fn fetch_releases(&self, package_name: &str) -> Result<PackageReleases, RegistryError>;

    /// Fetches the release-level `requires_python` of one version
    ///
    /// Used when none of the release's files declare it.
    async fn fetch_release_requires_python(
        &self,
        package_name: &str,
        version: &str,
    ) -> Result<Option<String>, RegistryError>;
}
