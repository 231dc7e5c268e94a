//! Python compatibility layer
//!
//! Computes, for one package, the newest stable release that still installs on
//! each target Python version, and wires that computation to PyPI and to the
//! JSON result directory.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registry   │────▶│  Collector  │────▶│    Store    │
//! │  (fetch)    │     │ (fan-out)   │     │   (JSON)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐
//!                     │  Resolver   │
//!                     └─────────────┘
//!                       │         │
//!                       ▼         ▼
//!              ┌───────────┐ ┌────────────┐
//!              │  Version  │ │ Constraint │
//!              └───────────┘ └────────────┘
//! ```
//!
//! # Modules
//!
//! - [`version`]: PEP 440 version parsing, pre-release classification, candidate ranking
//! - [`constraint`]: `requires_python` parsing and evaluation
//! - [`resolver`]: per-target selection of the newest compatible release
//! - [`types`]: release records and the compatibility matrix
//! - [`registry`]: Registry trait for fetching release data
//! - [`registries`]: Concrete registry implementations (PyPI)
//! - [`store`]: JSON persistence of per-package results and the index
//! - [`collector`]: fetch → resolve → persist across many packages
//! - [`error`]: Error types for the fetch, store and resolve layers

pub mod collector;
pub mod constraint;
pub mod error;
pub mod registries;
pub mod registry;
pub mod resolver;
pub mod store;
pub mod types;
pub mod version;
