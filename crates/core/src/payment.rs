//! Payment gateway webhook handling: payload shape, status mapping,
//! transition rules, registration side effects and HMAC verification.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::error::CoreError;
use crate::tournament::{
    PAYMENT_STATUS_PAID, PAYMENT_STATUS_PENDING, PAYMENT_STATUS_REFUNDED,
    PAYMENT_STATUS_REJECTED, REGISTRATION_CANCELLED, REGISTRATION_CONFIRMED,
};

// ---------------------------------------------------------------------------
// Local payment status
// ---------------------------------------------------------------------------

pub const PAYMENT_PENDING: &str = "pending";
pub const PAYMENT_APPROVED: &str = "approved";
pub const PAYMENT_REJECTED: &str = "rejected";
pub const PAYMENT_REFUNDED: &str = "refunded";

/// The only webhook `type` that carries a payment update.
pub const WEBHOOK_TYPE_PAYMENT: &str = "payment";

/// Header carrying the hex HMAC-SHA256 of the raw request body.
pub const SIGNATURE_HEADER: &str = "x-signature";

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Webhook body sent by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: WebhookData,
    pub status: Option<String>,
}

/// The `data` object of a webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookData {
    /// Gateway payment id. Gateways send it as a number or a string.
    pub id: serde_json::Value,
    /// The reference we handed to checkout, echoed back by the gateway.
    pub external_reference: Option<String>,
}

impl WebhookData {
    /// Normalise the gateway id to a string, rejecting empty values.
    pub fn external_id(&self) -> Result<String, CoreError> {
        let id = match &self.id {
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => String::new(),
        };
        if id.is_empty() {
            return Err(CoreError::Validation(
                "data.id must be a non-empty string or number".into(),
            ));
        }
        Ok(id)
    }
}

// ---------------------------------------------------------------------------
// Status mapping
// ---------------------------------------------------------------------------

/// Map a gateway status onto the local payment status.
pub fn map_gateway_status(status: &str) -> Result<&'static str, CoreError> {
    match status {
        "approved" => Ok(PAYMENT_APPROVED),
        "pending" | "in_process" | "authorized" => Ok(PAYMENT_PENDING),
        "rejected" | "cancelled" => Ok(PAYMENT_REJECTED),
        "refunded" | "charged_back" => Ok(PAYMENT_REFUNDED),
        other => Err(CoreError::Validation(format!(
            "Unknown payment status '{other}'"
        ))),
    }
}

/// What to do with an incoming status for a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDecision {
    /// Persist the new status and its side effects.
    Apply,
    /// Same status redelivered; nothing to do.
    Unchanged,
    /// Out-of-order or impossible update; acknowledged but ignored.
    Stale,
}

/// Decide whether `next` may replace `current`.
///
/// Allowed: `pending -> approved|rejected`, `rejected -> approved|pending`,
/// `approved -> refunded`.
pub fn decide_transition(current: &str, next: &str) -> TransitionDecision {
    if current == next {
        return TransitionDecision::Unchanged;
    }
    let allowed = matches!(
        (current, next),
        (PAYMENT_PENDING, PAYMENT_APPROVED)
            | (PAYMENT_PENDING, PAYMENT_REJECTED)
            | (PAYMENT_REJECTED, PAYMENT_APPROVED)
            | (PAYMENT_REJECTED, PAYMENT_PENDING)
            | (PAYMENT_APPROVED, PAYMENT_REFUNDED)
    );
    if allowed {
        TransitionDecision::Apply
    } else {
        TransitionDecision::Stale
    }
}

/// Changes to apply to the tournament registration a payment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationEffect {
    pub payment_status: &'static str,
    /// New registration status, when the payment changes it.
    pub status: Option<&'static str>,
}

/// Registration side effects of a payment reaching `payment_status`.
pub fn registration_effect(payment_status: &str) -> RegistrationEffect {
    match payment_status {
        PAYMENT_APPROVED => RegistrationEffect {
            payment_status: PAYMENT_STATUS_PAID,
            status: Some(REGISTRATION_CONFIRMED),
        },
        PAYMENT_REJECTED => RegistrationEffect {
            payment_status: PAYMENT_STATUS_REJECTED,
            status: None,
        },
        PAYMENT_REFUNDED => RegistrationEffect {
            payment_status: PAYMENT_STATUS_REFUNDED,
            status: Some(REGISTRATION_CANCELLED),
        },
        _ => RegistrationEffect {
            payment_status: PAYMENT_STATUS_PENDING,
            status: None,
        },
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of `payload` keyed with `secret`.
pub fn compute_signature(secret: &str, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a hex signature in constant time.
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    let Some(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decode a hex string; `None` on odd length or non-hex characters.
    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| s.get(i..i + 2).and_then(|p| u8::from_str_radix(p, 16).ok()))
            .collect()
    }
}
