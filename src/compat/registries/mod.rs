//! Registry implementations for fetching release data

pub mod pypi;

pub use pypi::{PypiRegistry, parse_releases};
