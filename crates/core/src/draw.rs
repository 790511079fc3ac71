//! Weekly pairing of a division ("sorteo").
//!
//! Every match is a doubles match between two pairs, so entrants are split
//! into groups of four. When the entrant count is not a multiple of four the
//! surplus sits the round out (bye).

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Players in one doubles match.
pub const PLAYERS_PER_MATCH: usize = 4;

/// How entrants are ordered before grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    /// Shuffle, then pair neighbours: `[0,1]` vs `[2,3]`.
    Random,
    /// Keep standings order, then pair first with fourth: `[0,3]` vs `[1,2]`.
    Ranking,
}

impl DrawMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Ranking => "ranking",
        }
    }
}

/// An entrant to the draw.
///
/// For [`DrawMode::Ranking`] entrants must be passed in standings order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawEntrant {
    pub enrollment_id: DbId,
    /// Matches already played in the stage, used to pick who sits out.
    pub matches_played: i32,
}

/// A single drawn match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawnMatch {
    /// 1-based court number.
    pub court: i32,
    pub team_a: [DbId; 2],
    pub team_b: [DbId; 2],
}

/// The full result of a draw.
#[derive(Debug, Clone, Serialize)]
pub struct DrawPlan {
    pub mode: DrawMode,
    pub matches: Vec<DrawnMatch>,
    /// Enrollments sitting this round out.
    pub byes: Vec<DbId>,
}

/// Draw a round.
///
/// `seed` makes [`DrawMode::Random`] reproducible; it is ignored for
/// [`DrawMode::Ranking`].
pub fn draw(
    mut entrants: Vec<DrawEntrant>,
    mode: DrawMode,
    seed: Option<u64>,
) -> Result<DrawPlan, CoreError> {
    if entrants.len() < PLAYERS_PER_MATCH {
        return Err(CoreError::Validation(format!(
            "A draw needs at least {PLAYERS_PER_MATCH} active players, got {}",
            entrants.len()
        )));
    }

    let mut seen = HashSet::with_capacity(entrants.len());
    if let Some(dup) = entrants.iter().find(|e| !seen.insert(e.enrollment_id)) {
        return Err(CoreError::Validation(format!(
            "Enrollment {} appears more than once in the draw",
            dup.enrollment_id
        )));
    }

    if mode == DrawMode::Random {
        match seed {
            Some(seed) => entrants.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => entrants.shuffle(&mut rand::rng()),
        }
    }

    let byes = pick_byes(&entrants, entrants.len() % PLAYERS_PER_MATCH);
    let playing: Vec<DbId> = entrants
        .iter()
        .map(|e| e.enrollment_id)
        .filter(|id| !byes.contains(id))
        .collect();

    let matches = playing
        .chunks_exact(PLAYERS_PER_MATCH)
        .enumerate()
        .map(|(idx, g)| {
            let (team_a, team_b) = match mode {
                DrawMode::Random => ([g[0], g[1]], [g[2], g[3]]),
                DrawMode::Ranking => ([g[0], g[3]], [g[1], g[2]]),
            };
            DrawnMatch {
                court: idx as i32 + 1,
                team_a,
                team_b,
            }
        })
        .collect();

    Ok(DrawPlan {
        mode,
        matches,
        byes,
    })
}

/// Choose `count` entrants to sit out: most matches played first, then the
/// later position in the (already ordered) entrant list.
fn pick_byes(entrants: &[DrawEntrant], count: usize) -> Vec<DbId> {
    let mut indices: Vec<usize> = (0..entrants.len()).collect();
    indices.sort_by(|&a, &b| {
        entrants[b]
            .matches_played
            .cmp(&entrants[a].matches_played)
            .then_with(|| b.cmp(&a))
    });
    indices
        .into_iter()
        .take(count)
        .map(|i| entrants[i].enrollment_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entrants(n: i64) -> Vec<DrawEntrant> {
        (1..=n)
            .map(|id| DrawEntrant {
                enrollment_id: id,
                matches_played: 0,
            })
            .collect()
    }

    fn all_ids(plan: &DrawPlan) -> Vec<DbId> {
        let mut ids: Vec<DbId> = plan
            .matches
            .iter()
            .flat_map(|m| m.team_a.into_iter().chain(m.team_b))
            .chain(plan.byes.iter().copied())
            .collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn fewer_than_four_players_rejected() {
        let err = draw(entrants(3), DrawMode::Random, None).unwrap_err();
        assert!(err.to_string().contains("at least 4"));
    }

    #[test]
    fn duplicate_entrants_rejected() {
        let mut list = entrants(4);
        list.push(list[0].clone());
        assert!(draw(list, DrawMode::Ranking, None).is_err());
    }

    #[test]
    fn ranking_mode_pairs_first_with_fourth() {
        let plan = draw(entrants(8), DrawMode::Ranking, None).unwrap();
        assert_eq!(plan.matches.len(), 2);
        assert_eq!(plan.matches[0].team_a, [1, 4]);
        assert_eq!(plan.matches[0].team_b, [2, 3]);
        assert_eq!(plan.matches[1].team_a, [5, 8]);
        assert_eq!(plan.matches[1].court, 2);
        assert!(plan.byes.is_empty());
    }

    #[test]
    fn every_entrant_appears_exactly_once() {
        let plan = draw(entrants(11), DrawMode::Random, Some(7)).unwrap();
        assert_eq!(plan.matches.len(), 2);
        assert_eq!(plan.byes.len(), 3);
        assert_eq!(all_ids(&plan), (1..=11).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_draw() {
        let a = draw(entrants(12), DrawMode::Random, Some(42)).unwrap();
        let b = draw(entrants(12), DrawMode::Random, Some(42)).unwrap();
        assert_eq!(a.matches, b.matches);
    }

    #[test]
    fn byes_go_to_players_with_most_matches() {
        let mut list = entrants(6);
        list[1].matches_played = 3;
        list[4].matches_played = 2;
        let plan = draw(list, DrawMode::Ranking, None).unwrap();

        let mut byes = plan.byes.clone();
        byes.sort_unstable();
        assert_eq!(byes, vec![2, 5]);
        assert_eq!(plan.matches[0].team_a, [1, 6]);
        assert_eq!(plan.matches[0].team_b, [3, 4]);
    }

    #[test]
    fn bye_ties_go_to_the_lowest_ranked() {
        let plan = draw(entrants(5), DrawMode::Ranking, None).unwrap();
        assert_eq!(plan.byes, vec![5]);
    }
}
