//! Route definitions for the unauthenticated `/public` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::public;
use crate::state::AppState;

/// Routes mounted at `/public`.
///
/// ```text
/// GET /tournaments                     -> public_tournaments
/// GET /circuit/stages                  -> public_stages
/// GET /circuit/stages/{id}/standings   -> public_stage_standings
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tournaments", get(public::public_tournaments))
        .route("/circuit/stages", get(public::public_stages))
        .route(
            "/circuit/stages/{id}/standings",
            get(public::public_stage_standings),
        )
}
