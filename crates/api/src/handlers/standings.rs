//! Division and stage standings, and the shared table-building helpers used
//! by draws, withdrawals, movement planning and the public site.

use axum::extract::{Path, State};
use axum::Json;
use padel_core::averages::{tally_all, PlayedMatch};
use padel_core::error::CoreError;
use padel_core::scoring::Side;
use padel_core::standings::{rank, StandingEntry, StandingRow};
use padel_core::types::DbId;
use padel_db::models::circuit_match::CircuitMatch;
use padel_db::models::division::Division;
use padel_db::models::enrollment::EnrollmentDetail;
use padel_db::models::stage::Stage;
use padel_db::repositories::{DivisionRepo, EnrollmentRepo, MatchRepo, StageRepo};
use padel_db::DbPool;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Ranked table of one division.
#[derive(Debug, Serialize)]
pub struct DivisionStandings {
    pub division_id: DbId,
    pub division_name: String,
    pub level: i32,
    pub min_matches: i32,
    pub rows: Vec<StandingRow>,
}

/// Active players of a division and the matches they played.
pub(crate) struct DivisionTable {
    pub enrollments: Vec<EnrollmentDetail>,
    pub matches: Vec<PlayedMatch>,
}

impl DivisionTable {
    pub async fn load(pool: &DbPool, division_id: DbId) -> AppResult<Self> {
        let enrollments = EnrollmentRepo::list_active_for_division(pool, division_id).await?;
        let matches = MatchRepo::list_played_for_division(pool, division_id)
            .await?
            .iter()
            .map(played_match)
            .collect();
        Ok(Self {
            enrollments,
            matches,
        })
    }

    /// Rank the active players, inherited points and matches included.
    pub fn rank(&self, min_matches: i32) -> Vec<StandingRow> {
        let ids: Vec<DbId> = self.enrollments.iter().map(|e| e.id).collect();
        let mut tallies = tally_all(&ids, &self.matches);

        let entries = self
            .enrollments
            .iter()
            .map(|e| StandingEntry {
                enrollment_id: e.id,
                player_id: e.player_id,
                player_name: e.player_name.clone(),
                tally: tallies
                    .remove(&e.id)
                    .unwrap_or_default()
                    .with_inherited(e.inherited_points, e.inherited_matches),
            })
            .collect();

        rank(entries, min_matches)
    }
}

fn played_match(m: &CircuitMatch) -> PlayedMatch {
    PlayedMatch {
        team_a: m.team_a(),
        team_b: m.team_b(),
        games_a: m.games_a.unwrap_or(0),
        games_b: m.games_b.unwrap_or(0),
        forfeited: m.forfeited_side.as_deref().and_then(Side::parse),
    }
}

pub(crate) async fn division_standings(
    pool: &DbPool,
    division: &Division,
    min_matches: i32,
) -> AppResult<DivisionStandings> {
    let table = DivisionTable::load(pool, division.id).await?;
    Ok(DivisionStandings {
        division_id: division.id,
        division_name: division.name.clone(),
        level: division.level,
        min_matches,
        rows: table.rank(min_matches),
    })
}

/// Standings of every division of a stage, top division first.
pub(crate) async fn stage_standings(
    pool: &DbPool,
    stage: &Stage,
) -> AppResult<Vec<DivisionStandings>> {
    let divisions = DivisionRepo::list_for_stage(pool, stage.id).await?;
    let mut tables = Vec::with_capacity(divisions.len());
    for division in &divisions {
        tables.push(division_standings(pool, division, stage.min_matches).await?);
    }
    Ok(tables)
}

pub(crate) async fn find_stage(pool: &DbPool, id: DbId) -> AppResult<Stage> {
    StageRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Stage",
            id,
        }))
}

pub(crate) async fn find_division(pool: &DbPool, id: DbId) -> AppResult<Division> {
    DivisionRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Division",
            id,
        }))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/circuit/divisions/{id}/standings
pub async fn get_division_standings(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DivisionStandings>>> {
    let division = find_division(&state.pool, id).await?;
    let stage = find_stage(&state.pool, division.stage_id).await?;
    let standings = division_standings(&state.pool, &division, stage.min_matches).await?;
    Ok(Json(DataResponse::new(standings)))
}

/// GET /api/v1/circuit/stages/{id}/standings
pub async fn get_stage_standings(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<DivisionStandings>>>> {
    let stage = find_stage(&state.pool, id).await?;
    let standings = stage_standings(&state.pool, &stage).await?;
    Ok(Json(DataResponse::new(standings)))
}
