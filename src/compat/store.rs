//! JSON persistence of per-package compatibility results

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

#[cfg(test)]
use mockall::automock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::compat::error::StoreError;
use crate::compat::types::PackageCompat;

const INDEX_FILE: &str = "index.json";

static NAME_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("valid separator pattern"));

/// PEP 503 normalized package name (`Foo.Bar_baz` → `foo-bar-baz`)
pub fn normalize_package_name(name: &str) -> String {
    NAME_SEPARATORS.replace_all(name, "-").to_lowercase()
}

/// Index of every package written in one collection run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatIndex {
    pub last_updated: String,
    pub count: usize,
    /// Package name → result file name relative to the index
    pub packages: IndexMap<String, String>,
}

/// Trait for persisting compatibility results
#[cfg_attr(test, automock)]
pub trait ResultStore: Send + Sync {
    /// Persist one package result, returning where it was written
    fn save_package(&self, result: &PackageCompat) -> Result<PathBuf, StoreError>;

    /// Persist the index of a collection run
    fn save_index(&self, index: &CompatIndex) -> Result<PathBuf, StoreError>;
}

/// Writes one pretty-printed JSON file per package plus `index.json`
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Creates the store, creating `dir` if needed
    pub fn new(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name used for a package's result
    pub fn file_name(package: &str) -> String {
        format!("{}.json", normalize_package_name(package))
    }

    fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf, StoreError> {
        let path = self.dir.join(file_name);
        let content = serde_json::to_string_pretty(value)?;
        fs::write(&path, content).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }
}

impl ResultStore for JsonStore {
    fn save_package(&self, result: &PackageCompat) -> Result<PathBuf, StoreError> {
        self.write_json(&Self::file_name(&result.package), result)
    }

    fn save_index(&self, index: &CompatIndex) -> Result<PathBuf, StoreError> {
        self.write_json(INDEX_FILE, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::types::{CompatibilityEntry, CompatibilityMatrix};
    use crate::compat::version::RankingMode;
    use rstest::rstest;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    #[rstest]
    #[case("requests", "requests")]
    #[case("scikit-learn", "scikit-learn")]
    #[case("Django", "django")]
    #[case("zope.interface", "zope-interface")]
    #[case("Foo__Bar-.baz", "foo-bar-baz")]
    fn normalize_package_name_follows_pep503(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(normalize_package_name(name), expected);
    }

    fn sample_result() -> PackageCompat {
        let mut matrix = CompatibilityMatrix::new();
        matrix.insert(
            "3.8".to_string(),
            Some(CompatibilityEntry {
                version: "3.12.2".to_string(),
                released: Some("2023-06-12T22:01:40Z".to_string()),
                requires_python: Some(">=3.7".to_string()),
            }),
        );
        matrix.insert("3.7".to_string(), None);

        PackageCompat {
            package: "FileLock".to_string(),
            metadata: "https://pypi.org/pypi/FileLock/json".to_string(),
            last_updated: "2026-01-01T00:00:00+00:00".to_string(),
            ordering: RankingMode::Semantic,
            python_compatibility: matrix,
        }
    }

    #[test]
    fn save_package_writes_normalized_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonStore::new(temp_dir.path()).unwrap();

        let path = store.save_package(&sample_result()).unwrap();

        assert_eq!(path, temp_dir.path().join("filelock.json"));
        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            written,
            json!({
                "package": "FileLock",
                "metadata": "https://pypi.org/pypi/FileLock/json",
                "last_updated": "2026-01-01T00:00:00+00:00",
                "ordering": "semantic",
                "python_compatibility": {
                    "3.8": {
                        "version": "3.12.2",
                        "released": "2023-06-12T22:01:40Z",
                        "requires_python": ">=3.7"
                    },
                    "3.7": null
                }
            })
        );
    }

    #[test]
    fn save_package_keeps_target_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonStore::new(temp_dir.path()).unwrap();

        let path = store.save_package(&sample_result()).unwrap();

        let content = fs::read_to_string(path).unwrap();
        let pos_38 = content.find("\"3.8\"").unwrap();
        let pos_37 = content.find("\"3.7\"").unwrap();
        assert!(pos_38 < pos_37);
    }

    #[test]
    fn save_index_writes_index_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonStore::new(temp_dir.path()).unwrap();
        let index = CompatIndex {
            last_updated: "2026-01-01T00:00:00+00:00".to_string(),
            count: 1,
            packages: IndexMap::from([("requests".to_string(), "requests.json".to_string())]),
        };

        let path = store.save_index(&index).unwrap();

        assert_eq!(path, temp_dir.path().join("index.json"));
        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            written,
            json!({
                "last_updated": "2026-01-01T00:00:00+00:00",
                "count": 1,
                "packages": {"requests": "requests.json"}
            })
        );
    }

    #[test]
    fn new_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a/b/python-compat");

        let store = JsonStore::new(&nested).unwrap();

        assert!(nested.is_dir());
        assert_eq!(store.dir(), nested.as_path());
    }
}
