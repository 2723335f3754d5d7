//! sf - Skill Fuse
//!
//! Compose a customized build of a base codebase by layering skill packages
//! onto it. The core is the patch-replay engine: reset the working tree to a
//! pristine base, re-derive and re-apply each skill's edits in order, detect
//! merge conflicts between skills that touch the same file, and consult a
//! persistent cache of hand-approved resolutions.

pub mod app;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod manifest;
pub mod resolution;
pub mod snapshot;
pub mod test_utils;

pub use error::{Result, SfError};

/// Engine version skill manifests declare compatibility against.
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
