//! Match outcome and points rules for circuit matches.
//!
//! Every player on a team receives the same points for a match. A walkover
//! is recorded against the side that failed to show up.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Points table
// ---------------------------------------------------------------------------

/// Points for winning a match (on court or by walkover).
pub const POINTS_WIN: i32 = 3;
/// Points for a match that ended level on games.
pub const POINTS_DRAW: i32 = 2;
/// Points for losing a match that was played.
pub const POINTS_LOSS: i32 = 1;
/// Points for the side that forfeited.
pub const POINTS_WALKOVER_LOSS: i32 = 0;

/// Upper bound on games a single side can record in one match.
pub const MAX_GAMES_PER_MATCH: i32 = 99;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// One of the two pairs in a circuit match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

impl Side {
    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
        }
    }

    /// Parse the database representation. Returns `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "a" => Some(Self::A),
            "b" => Some(Self::B),
            _ => None,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of a match from one side's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
    WalkoverWin,
    WalkoverLoss,
}

impl Outcome {
    pub fn is_win(self) -> bool {
        matches!(self, Self::Win | Self::WalkoverWin)
    }

    pub fn is_loss(self) -> bool {
        matches!(self, Self::Loss | Self::WalkoverLoss)
    }
}

/// Determine the outcome for `side`.
///
/// `forfeited` is the side that did not show up, if any; it overrides the
/// game count.
pub fn outcome_for(side: Side, games_a: i32, games_b: i32, forfeited: Option<Side>) -> Outcome {
    if let Some(loser) = forfeited {
        return if loser == side {
            Outcome::WalkoverLoss
        } else {
            Outcome::WalkoverWin
        };
    }

    let (own, other) = match side {
        Side::A => (games_a, games_b),
        Side::B => (games_b, games_a),
    };

    match own.cmp(&other) {
        std::cmp::Ordering::Greater => Outcome::Win,
        std::cmp::Ordering::Equal => Outcome::Draw,
        std::cmp::Ordering::Less => Outcome::Loss,
    }
}

/// Points awarded to each player of a side for the given outcome.
pub fn match_points(outcome: Outcome) -> i32 {
    match outcome {
        Outcome::Win | Outcome::WalkoverWin => POINTS_WIN,
        Outcome::Draw => POINTS_DRAW,
        Outcome::Loss => POINTS_LOSS,
        Outcome::WalkoverLoss => POINTS_WALKOVER_LOSS,
    }
}

/// Validate a submitted result.
///
/// Games must be within `[0, MAX_GAMES_PER_MATCH]`. A played match cannot be
/// 0-0; a walkover may carry any (usually zero) game count.
pub fn validate_result(
    games_a: i32,
    games_b: i32,
    forfeited: Option<Side>,
) -> Result<(), CoreError> {
    for (name, games) in [("games_a", games_a), ("games_b", games_b)] {
        if !(0..=MAX_GAMES_PER_MATCH).contains(&games) {
            return Err(CoreError::Validation(format!(
                "{name} must be between 0 and {MAX_GAMES_PER_MATCH}, got {games}"
            )));
        }
    }

    if forfeited.is_none() && games_a == 0 && games_b == 0 {
        return Err(CoreError::Validation(
            "A played match must record at least one game".into(),
        ));
    }

    Ok(())
}
