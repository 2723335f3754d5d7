//! Shared test utilities for sf.

pub mod fixtures;

pub use fixtures::{ProjectFixture, SkillPackageSpec};
