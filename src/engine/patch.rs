//! Line-oriented patch derivation and context-tolerant application.
//!
//! Each skill ships the full post-image of every file it modifies, authored
//! against the common base. The engine turns that pair into a patch and
//! replays it against whatever the working content has become after earlier
//! skills. Application is context-tolerant: a hunk lands as long as its
//! surrounding unchanged lines can still be located, possibly shifted. When
//! straight application fails, a three-way merge against the base gets one
//! more chance to place the edit; if that also conflicts, the marker-annotated
//! merge output becomes the conflict preimage.

use diffy::{Patch, apply, create_patch, merge};

/// Outcome of replaying one skill's edit onto the current working content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The edit was placed; this is the new working content.
    Clean(String),
    /// The edit overlapped an earlier skill's change. The payload is the
    /// reconstructed conflicted content, markers included.
    Conflict(String),
}

/// Derive a skill's edit as a unified diff between the base snapshot and the
/// skill's shipped post-image.
#[must_use]
pub fn derive<'a>(base: &'a str, post_image: &'a str) -> Patch<'a, str> {
    create_patch(base, post_image)
}

/// Apply a skill's edit to the current working content.
#[must_use]
pub fn replay_edit(base: &str, current: &str, post_image: &str) -> MergeOutcome {
    let patch = derive(base, post_image);
    if let Ok(next) = apply(current, &patch) {
        return MergeOutcome::Clean(next);
    }

    // Hunk context not found where the patch expected it. A three-way merge
    // can still compose the edits when they touch disjoint regions; a real
    // overlap comes back as marker-annotated content.
    match merge(base, current, post_image) {
        Ok(clean) => MergeOutcome::Clean(clean),
        Err(conflicted) => MergeOutcome::Conflict(conflicted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "line1\nline2\nline3\nline4\nline5\n";

    #[test]
    fn identical_post_image_is_a_noop() {
        let outcome = replay_edit(BASE, BASE, BASE);
        assert_eq!(outcome, MergeOutcome::Clean(BASE.to_string()));
    }

    #[test]
    fn edit_applies_against_unmodified_current() {
        let post = "line1\nline2\nCHANGED\nline4\nline5\n";
        let outcome = replay_edit(BASE, BASE, post);
        assert_eq!(outcome, MergeOutcome::Clean(post.to_string()));
    }

    #[test]
    fn non_overlapping_edits_compose() {
        // An earlier skill prepended a line; this skill appends one.
        let current = "prepended\nline1\nline2\nline3\nline4\nline5\n";
        let post = "line1\nline2\nline3\nline4\nline5\nappended\n";

        match replay_edit(BASE, current, post) {
            MergeOutcome::Clean(next) => {
                assert!(next.contains("prepended\n"));
                assert!(next.contains("appended\n"));
            }
            MergeOutcome::Conflict(preimage) => {
                panic!("expected clean merge, got conflict:\n{preimage}")
            }
        }
    }

    #[test]
    fn overlapping_edits_conflict_with_markers() {
        // Both skills rewrite line3.
        let current = "line1\nline2\nFROM EARLIER SKILL\nline4\nline5\n";
        let post = "line1\nline2\nFROM THIS SKILL\nline4\nline5\n";

        match replay_edit(BASE, current, post) {
            MergeOutcome::Conflict(preimage) => {
                assert!(preimage.contains("<<<<<<<"));
                assert!(preimage.contains("FROM EARLIER SKILL"));
                assert!(preimage.contains("FROM THIS SKILL"));
            }
            MergeOutcome::Clean(next) => panic!("expected conflict, merged to:\n{next}"),
        }
    }

    #[test]
    fn preimage_is_deterministic() {
        let current = "line1\nline2\nA\nline4\nline5\n";
        let post = "line1\nline2\nB\nline4\nline5\n";
        let first = replay_edit(BASE, current, post);
        let second = replay_edit(BASE, current, post);
        assert_eq!(first, second);
    }
}
