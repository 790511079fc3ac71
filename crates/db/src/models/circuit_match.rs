//! Circuit match model and DTOs.

use padel_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `circuit_matches` table. Players are enrollment ids.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CircuitMatch {
    pub id: DbId,
    pub match_day_id: DbId,
    pub court: i32,
    pub team_a_player1: DbId,
    pub team_a_player2: DbId,
    pub team_b_player1: DbId,
    pub team_b_player2: DbId,
    pub games_a: Option<i32>,
    pub games_b: Option<i32>,
    /// `"a"` or `"b"` when the match was a walkover.
    pub forfeited_side: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CircuitMatch {
    pub fn team_a(&self) -> [DbId; 2] {
        [self.team_a_player1, self.team_a_player2]
    }

    pub fn team_b(&self) -> [DbId; 2] {
        [self.team_b_player1, self.team_b_player2]
    }
}

/// A match joined with the four players' names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MatchDetail {
    pub id: DbId,
    pub match_day_id: DbId,
    pub court: i32,
    pub team_a_player1: DbId,
    pub team_a_player1_name: String,
    pub team_a_player2: DbId,
    pub team_a_player2_name: String,
    pub team_b_player1: DbId,
    pub team_b_player1_name: String,
    pub team_b_player2: DbId,
    pub team_b_player2_name: String,
    pub games_a: Option<i32>,
    pub games_b: Option<i32>,
    pub forfeited_side: Option<String>,
    pub status: String,
}

/// A match to insert when publishing a draw.
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub court: i32,
    pub team_a: [DbId; 2],
    pub team_b: [DbId; 2],
}

/// Body of `PUT /circuit/matches/{id}/result`.
#[derive(Debug, Deserialize)]
pub struct RecordResult {
    pub games_a: i32,
    pub games_b: i32,
    /// `"a"` or `"b"` when one pair forfeited.
    pub forfeited_side: Option<String>,
}
