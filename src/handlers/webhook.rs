use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::db::queries;
use crate::services::events;
use crate::state::AppState;

/// Stripe-Signature header: `t=<unix ts>,v1=<hex hmac>[,v1=...]`. The hmac
/// is SHA-256 over `<timestamp>.<raw body>` keyed with the endpoint secret.
fn validate_stripe_signature(webhook_secret: &str, header: &str, payload: &str) -> bool {
    let mut timestamp = "";
    let mut candidates = Vec::new();
    for part in header.split(',') {
        if let Some((key, value)) = part.trim().split_once('=') {
            match key {
                "t" => timestamp = value,
                "v1" => candidates.push(value),
                _ => {}
            }
        }
    }
    if timestamp.is_empty() || candidates.is_empty() {
        return false;
    }

    let signed_payload = format!("{timestamp}.{payload}");
    let mut mac = match Hmac::<Sha256>::new_from_slice(webhook_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(signed_payload.as_bytes());
    let expected: String = mac
        .finalize()
        .into_bytes()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();

    candidates.iter().any(|c| *c == expected)
}

pub async fn payment_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    // Validate Stripe signature (skip if secret is empty — dev mode)
    if !state.config.stripe_webhook_secret.is_empty() {
        let signature = headers
            .get("stripe-signature")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if signature.is_empty() {
            tracing::warn!("missing Stripe-Signature header");
            return (StatusCode::FORBIDDEN, "Missing signature").into_response();
        }

        if !validate_stripe_signature(&state.config.stripe_webhook_secret, signature, &body) {
            tracing::warn!("invalid Stripe signature");
            return (StatusCode::FORBIDDEN, "Invalid signature").into_response();
        }
    }

    let event: serde_json::Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable webhook payload");
            return (StatusCode::BAD_REQUEST, "Invalid payload").into_response();
        }
    };

    let event_type = event["type"].as_str().unwrap_or("");
    let payment_id = event["data"]["object"]["id"].as_str().unwrap_or("");

    // Everything else Stripe sends is acknowledged and dropped; a non-2xx
    // would just make it retry
    let payment_status = match event_type {
        "payment_intent.succeeded" => "succeeded",
        "payment_intent.payment_failed" => "failed",
        "payment_intent.canceled" => "canceled",
        _ => {
            tracing::debug!(event_type, "ignoring webhook event");
            return received_response();
        }
    };

    if payment_id.is_empty() {
        tracing::warn!(event_type, "webhook event without payment intent id");
        return received_response();
    }

    tracing::info!(payment_id, payment_status, "payment webhook");

    let appointment = {
        let db = state.db.lock().unwrap();
        if let Err(e) = queries::set_payment_status(&db, payment_id, payment_status) {
            tracing::error!(error = %e, "failed to update payment status");
        }
        queries::get_appointment_by_payment_id(&db, payment_id)
            .ok()
            .flatten()
    };

    match appointment {
        Some(appt) => {
            events::record_booking_event(
                &state,
                &appt.id,
                "payment_updated",
                &serde_json::json!({
                    "payment_id": payment_id,
                    "payment_status": payment_status,
                }),
            );
        }
        None => {
            // Intent created but the booking was never completed
            tracing::info!(payment_id, "no appointment for payment id");
        }
    }

    received_response()
}

fn received_response() -> Response {
    Json(serde_json::json!({ "received": true })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, timestamp: &str, payload: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.{payload}").as_bytes());
        mac.finalize()
            .into_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    #[test]
    fn test_valid_signature_accepted() {
        let secret = "whsec_test";
        let payload = r#"{"type":"payment_intent.succeeded"}"#;
        let sig = sign(secret, "1700000000", payload);
        let header = format!("t=1700000000,v1={sig}");
        assert!(validate_stripe_signature(secret, &header, payload));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = r#"{"type":"payment_intent.succeeded"}"#;
        let sig = sign("whsec_other", "1700000000", payload);
        let header = format!("t=1700000000,v1={sig}");
        assert!(!validate_stripe_signature("whsec_test", &header, payload));
    }

    #[test]
    fn test_tampered_body_rejected() {
        let secret = "whsec_test";
        let sig = sign(secret, "1700000000", r#"{"amount":5000}"#);
        let header = format!("t=1700000000,v1={sig}");
        assert!(!validate_stripe_signature(secret, &header, r#"{"amount":9999}"#));
    }

    #[test]
    fn test_multiple_v1_entries() {
        let secret = "whsec_test";
        let payload = r#"{"id":"evt_1"}"#;
        let good = sign(secret, "1700000000", payload);
        let header = format!("t=1700000000,v1=deadbeef,v1={good}");
        assert!(validate_stripe_signature(secret, &header, payload));
    }

    #[test]
    fn test_malformed_header_rejected() {
        assert!(!validate_stripe_signature("whsec_test", "", "{}"));
        assert!(!validate_stripe_signature("whsec_test", "v1=abc", "{}"));
        assert!(!validate_stripe_signature("whsec_test", "t=1700000000", "{}"));
    }
}
