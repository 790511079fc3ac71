//! Replacement of withdrawn circuit players ("reemplazos").
//!
//! Substitutes are stage enrollments waiting for a slot. When an active
//! player withdraws, the best candidate takes over the slot and may inherit
//! the withdrawn player's points and matches.

use serde::Serialize;

use crate::averages::PlayerTally;
use crate::types::{DbId, Timestamp};

/// A substitute eligible to fill a slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplacementCandidate {
    pub enrollment_id: DbId,
    pub player_id: DbId,
    pub player_name: String,
    /// Level of the division the substitute signed up for, if any.
    pub preferred_level: Option<i32>,
    pub enrolled_at: Timestamp,
}

/// Priority key: lower sorts first.
///
/// Tier 0 is the same division, tier 1 no preference, tier 2 any other
/// division by distance, preferring the weaker (higher level) one on ties.
fn priority(target_level: i32, c: &ReplacementCandidate) -> (u8, i32, i32) {
    match c.preferred_level {
        Some(level) if level == target_level => (0, 0, 0),
        None => (1, 0, 0),
        Some(level) => (2, (level - target_level).abs(), -level),
    }
}

/// Order candidates from best to worst for a slot in `target_level`.
///
/// Within a priority tier the earliest enrollment wins, then the lowest id.
pub fn rank_candidates(
    target_level: i32,
    mut candidates: Vec<ReplacementCandidate>,
) -> Vec<ReplacementCandidate> {
    candidates.sort_by(|a, b| {
        priority(target_level, a)
            .cmp(&priority(target_level, b))
            .then_with(|| a.enrolled_at.cmp(&b.enrolled_at))
            .then_with(|| a.enrollment_id.cmp(&b.enrollment_id))
    });
    candidates
}

/// The best candidate for a slot in `target_level`, if any.
pub fn select_replacement(
    target_level: i32,
    candidates: Vec<ReplacementCandidate>,
) -> Option<ReplacementCandidate> {
    rank_candidates(target_level, candidates).into_iter().next()
}

/// Points and matches carried over to the substitute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Inheritance {
    pub points: i32,
    pub matches: i32,
}

/// What the substitute inherits from `withdrawn`.
///
/// `withdrawn` must already include anything the withdrawn player inherited
/// themselves, so chains of replacements carry the full record forward.
pub fn inheritance(withdrawn: &PlayerTally, inherit: bool) -> Inheritance {
    if !inherit {
        return Inheritance::default();
    }
    Inheritance {
        points: withdrawn.points,
        matches: withdrawn.played,
    }
}
