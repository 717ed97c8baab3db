//! Cohort tag extraction
//!
//! Schedule names carry a cohort token (e.g. `child_b_sq_schedule1`). The
//! known tokens overlap (`a` is a prefix of `a_fu` and a suffix of
//! `child_a`), so extraction must prefer the longest token at the leftmost
//! match position.

use std::sync::LazyLock;

use aho_corasick::{AhoCorasick, MatchKind};

/// Known cohort tokens. Order does not matter: the matcher is built with
/// leftmost-longest semantics.
const COHORT_TOKENS: [&str; 15] = [
    "c",
    "b",
    "a",
    "b_fu",
    "a_fu",
    "c_fu",
    "c_sec",
    "a_sec",
    "b_sec",
    "child_b",
    "child_c",
    "child_c_sq",
    "child_a_sq",
    "child_b_sq",
    "child_a",
];

static COHORT_MATCHER: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(COHORT_TOKENS)
        .expect("Failed to build cohort token matcher")
});

/// Extract the cohort token from a schedule name.
///
/// Returns the longest known token at the leftmost position where any token
/// occurs, or `None` when the schedule name carries no cohort token.
#[must_use]
pub fn extract_cohort(schedule_name: &str) -> Option<&'static str> {
    COHORT_MATCHER
        .find(schedule_name)
        .map(|m| COHORT_TOKENS[m.pattern().as_usize()])
}
