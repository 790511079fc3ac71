//! Route definitions for tournaments and their registrations.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{payments, registrations, tournaments};
use crate::state::AppState;

/// Routes mounted at `/tournaments`.
///
/// ```text
/// GET    /                     -> list_tournaments
/// POST   /                     -> create_tournament (staff)
/// GET    /{id}                 -> get_tournament
/// PUT    /{id}                 -> update_tournament (staff)
/// DELETE /{id}                 -> delete_tournament (admin)
/// POST   /{id}/status          -> update_tournament_status (staff)
/// GET    /{id}/registrations   -> list_registrations
/// POST   /{id}/registrations   -> create_registration
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(tournaments::list_tournaments).post(tournaments::create_tournament),
        )
        .route(
            "/{id}",
            get(tournaments::get_tournament)
                .put(tournaments::update_tournament)
                .delete(tournaments::delete_tournament),
        )
        .route("/{id}/status", post(tournaments::update_tournament_status))
        .route(
            "/{id}/registrations",
            get(registrations::list_registrations).post(registrations::create_registration),
        )
}

/// Routes mounted at `/registrations`.
///
/// ```text
/// PUT    /{id}/status     -> update_registration_status (staff)
/// DELETE /{id}            -> delete_registration (admin)
/// GET    /{id}/payments   -> list_registration_payments
/// ```
pub fn registration_router() -> Router<AppState> {
    Router::new()
        .route("/{id}", delete(registrations::delete_registration))
        .route("/{id}/status", put(registrations::update_registration_status))
        .route("/{id}/payments", get(payments::list_registration_payments))
}
