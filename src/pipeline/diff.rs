//! New-notice detection.
//!
//! A notice is new when its title has never been relayed. Titles are the
//! identity key and are compared exactly.

use crate::models::{Notice, SeenState};

/// Candidates whose title is not in `seen`, in candidate order.
pub fn diff(candidates: &[Notice], seen: &SeenState) -> Vec<Notice> {
    candidates
        .iter()
        .filter(|notice| !seen.contains(&notice.title))
        .cloned()
        .collect()
}
