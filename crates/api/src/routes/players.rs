//! Route definitions for the `/players` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::players;
use crate::state::AppState;

/// Routes mounted at `/players`.
///
/// ```text
/// GET    /        -> list_players (staff)
/// POST   /        -> create_player
/// GET    /me      -> get_my_player
/// GET    /{id}    -> get_player
/// PUT    /{id}    -> update_player (owner or staff)
/// DELETE /{id}    -> deactivate_player (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(players::list_players).post(players::create_player))
        .route("/me", get(players::get_my_player))
        .route(
            "/{id}",
            get(players::get_player)
                .put(players::update_player)
                .delete(players::deactivate_player),
        )
}
