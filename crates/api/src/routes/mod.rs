pub mod admin;
pub mod auth;
pub mod circuit;
pub mod health;
pub mod notifications;
pub mod players;
pub mod public;
pub mod tournaments;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout
///
/// /admin/users                                     list, create (admin only)
/// /admin/users/{id}                                get, update, deactivate
/// /admin/users/{id}/reset-password                 reset password
/// /admin/dashboard                                 academy counters
///
/// /players                                         list (staff), create
/// /players/me                                      own profile
/// /players/{id}                                    get, update, deactivate
///
/// /tournaments                                     list, create
/// /tournaments/{id}                                get, update, delete
/// /tournaments/{id}/status                         lifecycle transition
/// /tournaments/{id}/registrations                  list, register
/// /registrations/{id}                              delete (admin)
/// /registrations/{id}/status                       confirm / cancel (staff)
/// /registrations/{id}/payments                     payment history
///
/// /webhooks/payments                               gateway callback (public)
///
/// /circuit/stages                                  list, create
/// /circuit/stages/{id}                             get, update, delete
/// /circuit/stages/{id}/status                      lifecycle transition
/// /circuit/stages/{id}/divisions                   list, create
/// /circuit/stages/{id}/enrollments                 list, enroll
/// /circuit/stages/{id}/replacement-candidates      ranked substitutes
/// /circuit/stages/{id}/standings                   all divisions
/// /circuit/stages/{id}/movements                   applied movements
/// /circuit/stages/{id}/movements/preview           planned movements
/// /circuit/stages/{id}/movements/apply             apply to next stage
/// /circuit/divisions/{id}                          update, delete
/// /circuit/divisions/{id}/standings                one division
/// /circuit/divisions/{id}/match-days               list, create
/// /circuit/enrollments/{id}                        update, delete
/// /circuit/enrollments/{id}/withdraw               withdraw + replacement
/// /circuit/match-days/{id}                         matches and byes
/// /circuit/match-days/{id}/draw                    publish a draw
/// /circuit/matches/{id}/result                     record a result
///
/// /notifications                                   list
/// /notifications/read-all                          mark all read
/// /notifications/{id}/read                         mark one read
///
/// /public/tournaments                              open tournaments
/// /public/circuit/stages                           visible stages
/// /public/circuit/stages/{id}/standings            stage standings
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (login, refresh, logout).
        .nest("/auth", auth::router())
        // Admin routes (user management + dashboard).
        .nest("/admin", admin::router())
        // Player profiles.
        .nest("/players", players::router())
        // Tournaments and registrations.
        .nest("/tournaments", tournaments::router())
        .nest("/registrations", tournaments::registration_router())
        // Payment gateway callbacks.
        .nest("/webhooks", webhooks::router())
        // League circuit: stages, divisions, draws, standings, movements.
        .nest("/circuit", circuit::router())
        // In-app notifications.
        .nest("/notifications", notifications::router())
        // Public website data.
        .nest("/public", public::router())
}
