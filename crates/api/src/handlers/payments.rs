//! Payment gateway webhook and payment listings.
//!
//! The webhook is public (the gateway calls it) and optionally protected by
//! an HMAC-SHA256 signature over the raw body when
//! `PAYMENT_WEBHOOK_SECRET` is configured.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use padel_core::error::CoreError;
use padel_core::payment::{
    decide_transition, map_gateway_status, registration_effect, verify_signature,
    TransitionDecision, WebhookPayload, PAYMENT_APPROVED, SIGNATURE_HEADER, WEBHOOK_TYPE_PAYMENT,
};
use padel_core::types::DbId;
use padel_db::models::notification::{NewNotification, KIND_PAYMENT_APPROVED};
use padel_db::models::payment::{Payment, WebhookAck};
use padel_db::repositories::{PaymentRepo, PlayerRepo, RegistrationRepo, TournamentRepo};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::notifications::dispatch;
use crate::handlers::registrations::find_visible_registration;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/webhooks/payments
///
/// Apply a gateway payment update. Redelivered and out-of-order events are
/// acknowledged with 200 so the gateway stops retrying; only malformed
/// payloads and unknown statuses are rejected.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<DataResponse<WebhookAck>>> {
    if let Some(secret) = state.config.payment_webhook_secret.as_deref() {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(format!(
                    "Missing {SIGNATURE_HEADER} header"
                )))
            })?;
        if !verify_signature(secret, &body, signature) {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid webhook signature".into(),
            )));
        }
    }

    let raw: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON payload: {e}")))?;
    let payload: WebhookPayload = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {e}")))?;

    if payload.kind != WEBHOOK_TYPE_PAYMENT {
        tracing::warn!(kind = %payload.kind, "Ignoring webhook of unsupported type");
        return Ok(ack("ignored", None, None));
    }

    let external_id = payload.data.external_id()?;
    let gateway_status = payload
        .status
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("status is required".into()))?;
    let next = map_gateway_status(gateway_status)?;
    let external_reference = payload
        .data
        .external_reference
        .as_deref()
        .and_then(|r| Uuid::parse_str(r.trim()).ok());

    let Some(payment) =
        PaymentRepo::find_for_webhook(&state.pool, &external_id, external_reference).await?
    else {
        tracing::warn!(%external_id, "Webhook for unknown payment ignored");
        return Ok(ack("ignored", None, None));
    };

    match decide_transition(&payment.status, next) {
        TransitionDecision::Apply => {
            let effect = registration_effect(next);
            let applied = PaymentRepo::apply_transition(
                &state.pool,
                payment.id,
                &payment.status,
                next,
                &external_id,
                effect,
                &raw,
            )
            .await?;

            let Some(updated) = applied else {
                tracing::warn!(
                    payment_id = payment.id,
                    "Payment changed concurrently; webhook treated as stale"
                );
                return Ok(ack("stale", Some(payment.id), Some(payment.status)));
            };

            tracing::info!(
                payment_id = updated.id,
                registration_id = updated.registration_id,
                from = %payment.status,
                to = %updated.status,
                "Payment status updated"
            );

            if updated.status == PAYMENT_APPROVED {
                if let Err(e) = notify_approval(&state, &updated).await {
                    tracing::warn!(payment_id = updated.id, error = %e, "Approval notice not sent");
                }
            }
            Ok(ack("applied", Some(updated.id), Some(updated.status)))
        }
        TransitionDecision::Unchanged => {
            PaymentRepo::touch_payload(&state.pool, payment.id, &external_id, &raw).await?;
            Ok(ack("unchanged", Some(payment.id), Some(payment.status)))
        }
        TransitionDecision::Stale => {
            tracing::warn!(
                payment_id = payment.id,
                current = %payment.status,
                incoming = next,
                "Ignoring stale payment transition"
            );
            PaymentRepo::touch_payload(&state.pool, payment.id, &external_id, &raw).await?;
            Ok(ack("stale", Some(payment.id), Some(payment.status)))
        }
    }
}

/// GET /api/v1/registrations/{id}/payments
pub async fn list_registration_payments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Payment>>>> {
    let registration = find_visible_registration(&state, &auth, id).await?;
    let payments = PaymentRepo::list_for_registration(&state.pool, registration.id).await?;
    Ok(Json(DataResponse::new(payments)))
}

fn ack(
    result: &'static str,
    payment_id: Option<DbId>,
    status: Option<String>,
) -> Json<DataResponse<WebhookAck>> {
    Json(DataResponse::new(WebhookAck {
        result,
        payment_id,
        status,
    }))
}

/// Tell the registered player that their payment went through.
async fn notify_approval(state: &AppState, payment: &Payment) -> AppResult<()> {
    let Some(registration) =
        RegistrationRepo::find_by_id(&state.pool, payment.registration_id).await?
    else {
        return Ok(());
    };
    let Some(user_id) = PlayerRepo::find_by_id(&state.pool, registration.player_id)
        .await?
        .and_then(|p| p.user_id)
    else {
        return Ok(());
    };
    let tournament_name = TournamentRepo::find_by_id(&state.pool, registration.tournament_id)
        .await?
        .map(|t| t.name)
        .unwrap_or_default();

    dispatch(
        state,
        vec![NewNotification {
            user_id,
            kind: KIND_PAYMENT_APPROVED,
            title: "Payment approved".into(),
            body: format!("Your registration for {tournament_name} is confirmed."),
        }],
    )
    .await;
    Ok(())
}
