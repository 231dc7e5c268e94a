//! Shared helpers for integration tests

#![allow(dead_code)]

mod pypi;

pub use pypi::*;
