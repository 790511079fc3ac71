//! Per-player aggregation of circuit results ("promedios").
//!
//! A division's players do not all play the same number of matches (byes,
//! late replacements), so the ranking criterion is the average of points
//! per match played rather than the raw total.

use std::collections::HashMap;

use serde::Serialize;

use crate::scoring::{match_points, outcome_for, Outcome, Side};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A match with a recorded result, reduced to what the tally needs.
///
/// Player references are stage enrollment ids.
#[derive(Debug, Clone)]
pub struct PlayedMatch {
    pub team_a: [DbId; 2],
    pub team_b: [DbId; 2],
    pub games_a: i32,
    pub games_b: i32,
    /// The side that forfeited, if the match was a walkover.
    pub forfeited: Option<Side>,
}

impl PlayedMatch {
    /// The side `enrollment_id` played on, if they took part.
    pub fn side_of(&self, enrollment_id: DbId) -> Option<Side> {
        if self.team_a.contains(&enrollment_id) {
            Some(Side::A)
        } else if self.team_b.contains(&enrollment_id) {
            Some(Side::B)
        } else {
            None
        }
    }

    fn games_for(&self, side: Side) -> (i32, i32) {
        match side {
            Side::A => (self.games_a, self.games_b),
            Side::B => (self.games_b, self.games_a),
        }
    }
}

// ---------------------------------------------------------------------------
// Tally
// ---------------------------------------------------------------------------

/// Accumulated record of one player within a division.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlayerTally {
    pub played: i32,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub points: i32,
    pub games_for: i32,
    pub games_against: i32,
}

impl PlayerTally {
    /// Add one match to the tally. Walkovers do not count games.
    pub fn record(&mut self, outcome: Outcome, games_for: i32, games_against: i32) {
        self.played += 1;
        self.points += match_points(outcome);

        if outcome.is_win() {
            self.won += 1;
        } else if outcome.is_loss() {
            self.lost += 1;
        } else {
            self.drawn += 1;
        }

        if !matches!(outcome, Outcome::WalkoverWin | Outcome::WalkoverLoss) {
            self.games_for += games_for;
            self.games_against += games_against;
        }
    }

    /// Add points and matches taken over from a replaced player.
    pub fn with_inherited(mut self, points: i32, matches: i32) -> Self {
        self.points += points;
        self.played += matches;
        self
    }

    pub fn game_difference(&self) -> i32 {
        self.games_for - self.games_against
    }

    /// Points per match played, see [`average`].
    pub fn average(&self) -> f64 {
        average(self.points, self.played)
    }
}

/// Build the tally of a single enrollment from a list of played matches.
pub fn tally_matches(enrollment_id: DbId, matches: &[PlayedMatch]) -> PlayerTally {
    let mut tally = PlayerTally::default();
    for m in matches {
        if let Some(side) = m.side_of(enrollment_id) {
            let (gf, ga) = m.games_for(side);
            tally.record(outcome_for(side, m.games_a, m.games_b, m.forfeited), gf, ga);
        }
    }
    tally
}

/// Tally every listed enrollment in a single pass over the matches.
///
/// Enrollments without matches get an empty tally; players appearing in the
/// matches but not in `enrollment_ids` are ignored.
pub fn tally_all(enrollment_ids: &[DbId], matches: &[PlayedMatch]) -> HashMap<DbId, PlayerTally> {
    let mut tallies: HashMap<DbId, PlayerTally> = enrollment_ids
        .iter()
        .map(|id| (*id, PlayerTally::default()))
        .collect();

    for m in matches {
        for (side, team) in [(Side::A, m.team_a), (Side::B, m.team_b)] {
            let outcome = outcome_for(side, m.games_a, m.games_b, m.forfeited);
            let (gf, ga) = m.games_for(side);
            for id in team {
                if let Some(tally) = tallies.get_mut(&id) {
                    tally.record(outcome, gf, ga);
                }
            }
        }
    }

    tallies
}

/// Points per match played, rounded to two decimals. `0.0` when no match
/// has been played.
pub fn average(points: i32, played: i32) -> f64 {
    if played <= 0 {
        return 0.0;
    }
    let raw = f64::from(points) / f64::from(played);
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn played(a: [DbId; 2], b: [DbId; 2], ga: i32, gb: i32) -> PlayedMatch {
        PlayedMatch {
            team_a: a,
            team_b: b,
            games_a: ga,
            games_b: gb,
            forfeited: None,
        }
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(average(0, 0), 0.0);
        assert_eq!(average(7, 0), 0.0);
    }

    #[test]
    fn average_rounds_to_two_decimals() {
        assert_eq!(average(7, 3), 2.33);
        assert_eq!(average(5, 3), 1.67);
        assert_eq!(average(6, 2), 3.0);
    }

    #[test]
    fn tally_counts_wins_losses_and_games() {
        let matches = vec![
            played([1, 2], [3, 4], 6, 3),
            played([1, 3], [2, 4], 2, 6),
            played([1, 4], [2, 3], 5, 5),
        ];

        let t = tally_matches(1, &matches);
        assert_eq!(t.played, 3);
        assert_eq!((t.won, t.drawn, t.lost), (1, 1, 1));
        assert_eq!(t.points, 3 + 1 + 2);
        assert_eq!(t.games_for, 13);
        assert_eq!(t.games_against, 14);
        assert_eq!(t.game_difference(), -1);
    }

    #[test]
    fn walkover_counts_points_but_not_games() {
        let m = PlayedMatch {
            team_a: [1, 2],
            team_b: [3, 4],
            games_a: 0,
            games_b: 0,
            forfeited: Some(Side::B),
        };
        let winner = tally_matches(1, std::slice::from_ref(&m));
        let loser = tally_matches(3, std::slice::from_ref(&m));

        assert_eq!(winner.points, 3);
        assert_eq!(winner.games_for, 0);
        assert_eq!(loser.points, 0);
        assert_eq!(loser.lost, 1);
    }

    #[test]
    fn tally_all_matches_individual_tallies() {
        let matches = vec![played([1, 2], [3, 4], 6, 1), played([5, 1], [2, 3], 6, 4)];
        let ids = [1, 2, 3, 4, 5, 6];
        let all = tally_all(&ids, &matches);

        for id in ids {
            assert_eq!(all[&id], tally_matches(id, &matches), "enrollment {id}");
        }
        assert_eq!(all[&6], PlayerTally::default());
    }

    #[test]
    fn inherited_points_shift_the_average() {
        let t = PlayerTally {
            played: 1,
            points: 3,
            ..Default::default()
        }
        .with_inherited(4, 3);

        assert_eq!(t.played, 4);
        assert_eq!(t.points, 7);
        assert_eq!(t.average(), 1.75);
    }
}
