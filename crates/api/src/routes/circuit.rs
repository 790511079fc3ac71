//! Route definitions for the league circuit.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{divisions, enrollments, match_days, movements, stages, standings};
use crate::state::AppState;

/// Routes mounted at `/circuit`.
///
/// ```text
/// GET    /stages                                -> list_stages
/// POST   /stages                                -> create_stage (staff)
/// GET    /stages/{id}                           -> get_stage
/// PUT    /stages/{id}                           -> update_stage (staff)
/// DELETE /stages/{id}                           -> delete_stage (admin)
/// POST   /stages/{id}/status                    -> update_stage_status (staff)
/// GET    /stages/{id}/divisions                 -> list_divisions
/// POST   /stages/{id}/divisions                 -> create_division (staff)
/// GET    /stages/{id}/enrollments               -> list_enrollments
/// POST   /stages/{id}/enrollments               -> create_enrollment (staff)
/// GET    /stages/{id}/replacement-candidates    -> list_replacement_candidates (staff)
/// GET    /stages/{id}/standings                 -> get_stage_standings
/// GET    /stages/{id}/movements                 -> list_movements
/// GET    /stages/{id}/movements/preview         -> preview_movements (staff)
/// POST   /stages/{id}/movements/apply           -> apply_movements (staff)
///
/// PUT    /divisions/{id}                        -> update_division (staff)
/// DELETE /divisions/{id}                        -> delete_division (admin)
/// GET    /divisions/{id}/standings              -> get_division_standings
/// GET    /divisions/{id}/match-days             -> list_match_days
/// POST   /divisions/{id}/match-days             -> create_match_day (staff)
///
/// PUT    /enrollments/{id}                      -> update_enrollment (staff)
/// DELETE /enrollments/{id}                      -> delete_enrollment (admin)
/// POST   /enrollments/{id}/withdraw             -> withdraw_enrollment (staff)
///
/// GET    /match-days/{id}                       -> get_match_day
/// POST   /match-days/{id}/draw                  -> draw_match_day (staff)
/// PUT    /matches/{id}/result                   -> record_result (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        // Stages
        .route("/stages", get(stages::list_stages).post(stages::create_stage))
        .route(
            "/stages/{id}",
            get(stages::get_stage)
                .put(stages::update_stage)
                .delete(stages::delete_stage),
        )
        .route("/stages/{id}/status", post(stages::update_stage_status))
        .route(
            "/stages/{id}/divisions",
            get(divisions::list_divisions).post(divisions::create_division),
        )
        .route(
            "/stages/{id}/enrollments",
            get(enrollments::list_enrollments).post(enrollments::create_enrollment),
        )
        .route(
            "/stages/{id}/replacement-candidates",
            get(enrollments::list_replacement_candidates),
        )
        .route("/stages/{id}/standings", get(standings::get_stage_standings))
        .route("/stages/{id}/movements", get(movements::list_movements))
        .route(
            "/stages/{id}/movements/preview",
            get(movements::preview_movements),
        )
        .route("/stages/{id}/movements/apply", post(movements::apply_movements))
        // Divisions
        .route(
            "/divisions/{id}",
            put(divisions::update_division).delete(divisions::delete_division),
        )
        .route(
            "/divisions/{id}/standings",
            get(standings::get_division_standings),
        )
        .route(
            "/divisions/{id}/match-days",
            get(match_days::list_match_days).post(match_days::create_match_day),
        )
        // Enrollments
        .route(
            "/enrollments/{id}",
            put(enrollments::update_enrollment).delete(enrollments::delete_enrollment),
        )
        .route(
            "/enrollments/{id}/withdraw",
            post(enrollments::withdraw_enrollment),
        )
        // Match days and results
        .route("/match-days/{id}", get(match_days::get_match_day))
        .route("/match-days/{id}/draw", post(match_days::draw_match_day))
        .route("/matches/{id}/result", put(match_days::record_result))
}
