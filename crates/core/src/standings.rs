//! Division standings ("rankings").
//!
//! Ordering, most significant first:
//!
//! 1. players who reached the stage's minimum matches before those who did not
//! 2. average points per match, descending
//! 3. total points, descending
//! 4. game difference, descending
//! 5. games won, descending
//! 6. enrollment id, ascending (stable, deterministic tiebreak)

use std::cmp::Ordering;

use serde::Serialize;

use crate::averages::PlayerTally;
use crate::types::DbId;

/// One enrollment's input to the ranking.
#[derive(Debug, Clone)]
pub struct StandingEntry {
    pub enrollment_id: DbId,
    pub player_id: DbId,
    pub player_name: String,
    pub tally: PlayerTally,
}

/// A ranked row, ready to serialize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingRow {
    /// 1-based, unique within the division.
    pub position: u32,
    pub enrollment_id: DbId,
    pub player_id: DbId,
    pub player_name: String,
    pub played: i32,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub points: i32,
    pub games_for: i32,
    pub games_against: i32,
    pub game_difference: i32,
    pub average: f64,
    /// Whether the player reached the minimum matches to be ranked and promoted.
    pub eligible: bool,
}

/// Compare two averages exactly by cross-multiplying, so that rounding to two
/// decimals never decides a tie.
fn average_cmp(a: &PlayerTally, b: &PlayerTally) -> Ordering {
    match (a.played > 0, b.played > 0) {
        (true, true) => {
            let lhs = i64::from(a.points) * i64::from(b.played);
            let rhs = i64::from(b.points) * i64::from(a.played);
            lhs.cmp(&rhs)
        }
        (true, false) => i64::from(a.points).cmp(&0),
        (false, true) => 0.cmp(&i64::from(b.points)),
        (false, false) => Ordering::Equal,
    }
}

fn compare(a: &StandingEntry, b: &StandingEntry, min_matches: i32) -> Ordering {
    let a_eligible = a.tally.played >= min_matches;
    let b_eligible = b.tally.played >= min_matches;

    b_eligible
        .cmp(&a_eligible)
        .then_with(|| average_cmp(&b.tally, &a.tally))
        .then_with(|| b.tally.points.cmp(&a.tally.points))
        .then_with(|| b.tally.game_difference().cmp(&a.tally.game_difference()))
        .then_with(|| b.tally.games_for.cmp(&a.tally.games_for))
        .then_with(|| a.enrollment_id.cmp(&b.enrollment_id))
}

/// Rank a division. `min_matches` is the stage's eligibility threshold.
pub fn rank(mut entries: Vec<StandingEntry>, min_matches: i32) -> Vec<StandingRow> {
    entries.sort_by(|a, b| compare(a, b, min_matches));

    entries
        .into_iter()
        .enumerate()
        .map(|(idx, e)| StandingRow {
            position: idx as u32 + 1,
            enrollment_id: e.enrollment_id,
            player_id: e.player_id,
            player_name: e.player_name,
            played: e.tally.played,
            won: e.tally.won,
            drawn: e.tally.drawn,
            lost: e.tally.lost,
            points: e.tally.points,
            games_for: e.tally.games_for,
            games_against: e.tally.games_against,
            game_difference: e.tally.game_difference(),
            average: e.tally.average(),
            eligible: e.tally.played >= min_matches,
        })
        .collect()
}
