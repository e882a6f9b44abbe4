//! Hosted-checkout provider adapter.
//!
//! Wraps the two touch points the storefront has with Stripe: creating a
//! checkout session at order placement, and verifying the signature of
//! webhook callbacks before any of their content is trusted.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Signed webhook timestamps older than this are rejected as replays.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum StripeError {
    #[error("checkout session request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("checkout session rejected: {0}")]
    Provider(String),

    #[error("{0}")]
    Signature(String),
}

/// One line item of a checkout session. `unit_amount` is in minor currency
/// units and already includes the storefront's tax share.
#[derive(Debug, Clone)]
pub struct CheckoutLineItem {
    pub name: String,
    pub unit_amount: i64,
    pub quantity: i64,
}

#[derive(Debug)]
pub struct CreateCheckoutSession {
    pub line_items: Vec<CheckoutLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub order_id: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    pub object: WebhookSessionObject,
}

#[derive(Debug, Deserialize)]
pub struct WebhookSessionObject {
    #[serde(default)]
    pub metadata: WebhookMetadata,
}

/// Metadata echoed back by the provider. These are untrusted identifiers; the
/// order service revalidates them against the store before mutating anything.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookMetadata {
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    webhook_secret: String,
    api_base: String,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("secret_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: secret_key.into(),
            webhook_secret: webhook_secret.into(),
            api_base: STRIPE_API_BASE.to_string(),
        }
    }

    /// Request a hosted checkout session. The provider's form encoding indexes
    /// nested fields with bracket syntax, so the body is built as flat pairs.
    pub async fn create_checkout_session(
        &self,
        params: CreateCheckoutSession,
    ) -> Result<CheckoutSession, StripeError> {
        let mut form: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("success_url".into(), params.success_url),
            ("cancel_url".into(), params.cancel_url),
            ("metadata[orderId]".into(), params.order_id),
            ("metadata[userId]".into(), params.user_id),
        ];

        for (i, item) in params.line_items.iter().enumerate() {
            form.push((
                format!("line_items[{i}][price_data][currency]"),
                "usd".into(),
            ));
            form.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                item.unit_amount.to_string(),
            ));
            form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }

        let response = self
            .http
            .post(format!("{}/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StripeError::Provider(body));
        }

        Ok(response.json::<CheckoutSession>().await?)
    }

    /// Verify a webhook callback and parse its event. Fails closed: nothing in
    /// the payload is read until the signature over the raw body checks out.
    pub fn verify_event(&self, payload: &[u8], sig_header: &str) -> Result<WebhookEvent, StripeError> {
        let now = chrono::Utc::now().timestamp();
        verify_signature(payload, sig_header, &self.webhook_secret, now)?;
        serde_json::from_slice(payload)
            .map_err(|err| StripeError::Signature(format!("invalid event payload: {err}")))
    }
}

/// Check a `stripe-signature` header (`t=<unix>,v1=<hex>[,v1=...]`) against
/// the raw payload: HMAC-SHA256 over `"{t}.{payload}"` with the shared
/// webhook secret, plus a replay window on the timestamp. `now` is injected
/// so the window is testable.
pub fn verify_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    now: i64,
) -> Result<(), StripeError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in sig_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| StripeError::Signature("missing timestamp in signature header".into()))?;
    if signatures.is_empty() {
        return Err(StripeError::Signature(
            "missing v1 signature in signature header".into(),
        ));
    }

    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(StripeError::Signature("timestamp outside tolerance".into()));
    }

    let mut signed_payload = Vec::with_capacity(payload.len() + 16);
    signed_payload.extend_from_slice(timestamp.to_string().as_bytes());
    signed_payload.push(b'.');
    signed_payload.extend_from_slice(payload);

    for signature in signatures {
        let Ok(expected) = hex::decode(signature) else {
            continue;
        };
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|err| StripeError::Signature(err.to_string()))?;
        mac.update(&signed_payload);
        // verify_slice is constant time.
        if mac.verify_slice(&expected).is_ok() {
            return Ok(());
        }
    }

    Err(StripeError::Signature("signature mismatch".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";

    fn sign(payload: &[u8], timestamp: i64, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn accepts_valid_signature() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let header = sign(payload, 1_700_000_000, SECRET);
        assert!(verify_signature(payload, &header, SECRET, 1_700_000_010).is_ok());
    }

    #[test]
    fn rejects_tampered_payload() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let header = sign(payload, 1_700_000_000, SECRET);
        let result = verify_signature(b"{\"type\":\"evil\"}", &header, SECRET, 1_700_000_010);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_wrong_secret() {
        let payload = br#"{}"#;
        let header = sign(payload, 1_700_000_000, "whsec_other");
        assert!(verify_signature(payload, &header, SECRET, 1_700_000_010).is_err());
    }

    #[test]
    fn rejects_stale_timestamp() {
        let payload = br#"{}"#;
        let header = sign(payload, 1_700_000_000, SECRET);
        let result = verify_signature(payload, &header, SECRET, 1_700_000_000 + 301);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_malformed_header() {
        assert!(verify_signature(b"{}", "garbage", SECRET, 0).is_err());
        assert!(verify_signature(b"{}", "t=abc,v1=00", SECRET, 0).is_err());
        assert!(verify_signature(b"{}", "t=100", SECRET, 100).is_err());
    }

    #[test]
    fn accepts_any_matching_v1_entry() {
        let payload = br#"{"id":"evt_1"}"#;
        let good = sign(payload, 1_700_000_000, SECRET);
        let good_sig = good.split("v1=").nth(1).unwrap();
        let header = format!("t=1700000000,v1={},v1={good_sig}", "00".repeat(32));
        assert!(verify_signature(payload, &header, SECRET, 1_700_000_000).is_ok());
    }

    #[test]
    fn parses_completed_event_metadata() {
        let payload = r#"{
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_123",
                    "metadata": {
                        "orderId": "6e1cbbcb-21a5-4c0c-a6a1-4d84e2b9f1a7",
                        "userId": "0a9f6f42-3c1a-44c8-a2fb-0723aa2f84ad"
                    }
                }
            }
        }"#;
        let event: WebhookEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.event_type, "checkout.session.completed");
        let metadata = event.data.object.metadata;
        assert_eq!(
            metadata.order_id.as_deref(),
            Some("6e1cbbcb-21a5-4c0c-a6a1-4d84e2b9f1a7")
        );
        assert!(metadata.user_id.is_some());
    }

    #[test]
    fn parses_event_without_metadata() {
        let payload = r#"{"type":"payment_intent.created","data":{"object":{}}}"#;
        let event: WebhookEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.event_type, "payment_intent.created");
        assert!(event.data.object.metadata.order_id.is_none());
    }
}
