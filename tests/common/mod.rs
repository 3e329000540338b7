//! Common test utilities for watch-rebuild CLI tests.
//!
//! This module provides:
//! - `TestEnv`: isolated project + config directories
//! - `WatchProcess`: a running `watch-rebuild` with its output collected
//! - Fixtures: reusable file content

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
