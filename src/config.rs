use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::compat::error::ConfigError;

// =============================================================================
// Time-related constants
// =============================================================================

/// Timeout for a single registry request in milliseconds (10 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Delay between starting each package collection to avoid rate limiting (200ms)
pub const DEFAULT_STAGGER_DELAY_MS: u64 = 200;

// =============================================================================
// Collection defaults
// =============================================================================

/// Default PyPI base URL
pub const DEFAULT_REGISTRY_URL: &str = "https://pypi.org";

/// Python versions tracked by default
pub const DEFAULT_TARGET_VERSIONS: &[&str] = &[
    "3.7", "3.8", "3.9", "3.10", "3.11", "3.12", "3.13", "3.14",
];

/// Packages collected when no explicit list is given
pub const DEFAULT_PACKAGES: &[&str] = &[
    "filelock",
    "requests",
    "numpy",
    "pandas",
    "torch",
    "tensorflow",
    "django",
    "flask",
    "fastapi",
    "pydantic",
    "pytest",
    "click",
    "cryptography",
    "sqlalchemy",
    "aiohttp",
    "httpx",
    "pillow",
    "scipy",
    "scikit-learn",
    "matplotlib",
    "black",
    "mypy",
    "setuptools",
];

/// Collector configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectorConfig {
    /// Python versions to resolve, in output order
    pub targets: Vec<String>,
    /// Packages to collect
    pub packages: Vec<String>,
    pub registry_url: String,
    /// Result directory; `None` means [`output_dir`]
    pub output_dir: Option<PathBuf>,
    pub request_timeout_ms: u64,
    pub stagger_delay_ms: u64,
    /// Look up `requires_python` through the per-release endpoint when no
    /// file of a release carries it
    pub release_metadata_fallback: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            targets: DEFAULT_TARGET_VERSIONS
                .iter()
                .map(|v| v.to_string())
                .collect(),
            packages: DEFAULT_PACKAGES.iter().map(|p| p.to_string()).collect(),
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            output_dir: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            stagger_delay_ms: DEFAULT_STAGGER_DELAY_MS,
            release_metadata_fallback: true,
        }
    }
}

impl CollectorConfig {
    /// Load configuration from a JSON file; missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolved result directory
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(output_dir)
    }
}

/// Returns the path to the data directory for python-compat.
/// Uses $XDG_DATA_HOME/python-compat if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/python-compat,
/// or ./python-compat if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the default directory for per-package result files.
pub fn output_dir() -> PathBuf {
    data_dir().join("python-compat")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("python-compat")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn collector_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<CollectorConfig>(json!({
            "packages": ["requests"],
            "staggerDelayMs": 0
        }))
        .unwrap();

        assert_eq!(result.packages, vec!["requests"]);
        assert_eq!(result.stagger_delay_ms, 0);
        assert_eq!(result.targets.len(), 8);
        assert_eq!(result.targets.first().map(String::as_str), Some("3.7"));
        assert_eq!(result.targets.last().map(String::as_str), Some("3.14"));
        assert_eq!(result.registry_url, DEFAULT_REGISTRY_URL);
        assert!(result.release_metadata_fallback);
    }

    #[test]
    fn collector_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<CollectorConfig>(json!({
            "targets": ["3.11", "3.12"],
            "packages": ["flask", "click"],
            "registryUrl": "http://localhost:8080",
            "outputDir": "/tmp/compat",
            "requestTimeoutMs": 500,
            "staggerDelayMs": 5,
            "releaseMetadataFallback": false
        }))
        .unwrap();

        assert_eq!(
            result,
            CollectorConfig {
                targets: vec!["3.11".to_string(), "3.12".to_string()],
                packages: vec!["flask".to_string(), "click".to_string()],
                registry_url: "http://localhost:8080".to_string(),
                output_dir: Some(PathBuf::from("/tmp/compat")),
                request_timeout_ms: 500,
                stagger_delay_ms: 5,
                release_metadata_fallback: false,
            }
        );
    }

    #[test]
    fn load_reads_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"packages": ["httpx"]}"#).unwrap();

        let config = CollectorConfig::load(&path).unwrap();

        assert_eq!(config.packages, vec!["httpx"]);
    }

    #[test]
    fn load_reports_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = CollectorConfig::load(&path);

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn load_reports_missing_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = CollectorConfig::load(&temp_dir.path().join("missing.json"));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn output_dir_prefers_configured_directory() {
        let config = CollectorConfig {
            output_dir: Some(PathBuf::from("/srv/compat")),
            ..CollectorConfig::default()
        };

        assert_eq!(config.output_dir(), PathBuf::from("/srv/compat"));
    }

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/python-compat"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home_local_share() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(path, PathBuf::from("/home/user/.local/share/python-compat"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = data_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./python-compat"));
    }
}
