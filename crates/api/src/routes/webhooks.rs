//! Route definitions for inbound gateway callbacks.
//!
//! Unauthenticated; payloads are verified by signature when a secret is
//! configured.

use axum::routing::post;
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Routes mounted at `/webhooks`.
///
/// ```text
/// POST /payments  -> payment_webhook
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/payments", post(payments::payment_webhook))
}
