//! Patch-replay engine: reset to base, reapply skills in order, detect
//! conflicts between skills that touch the same file, consult the
//! resolution cache before reporting one.

pub mod patch;
pub mod replay;
pub mod result;

pub use patch::MergeOutcome;
pub use replay::ReplayEngine;
pub use result::{ConflictRecord, ReplayRequest, ReplayResult, SkillOutcome};
