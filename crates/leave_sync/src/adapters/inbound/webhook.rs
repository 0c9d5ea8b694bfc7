// HTTP callback endpoint for Lark event subscriptions.
//
// Responsibilities
// - Decrypt encrypted callbacks and answer the url_verification handshake.
// - Reject callbacks whose signature or verification token does not match.
// - Hand the plaintext body to the dispatcher, keyed by event type.
//
// Boundaries
// - No leave logic here. Handlers decide what an event means.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::adapters::inbound::crypto::{self, DecryptError};
use crate::adapters::inbound::envelope::{CallbackEnvelope, encrypted_payload};
use crate::application::dispatcher::Dispatched;
use crate::shell::state::AppState;

pub const SIGNATURE_HEADER: &str = "x-lark-signature";
pub const TIMESTAMP_HEADER: &str = "x-lark-request-timestamp";
pub const NONCE_HEADER: &str = "x-lark-request-nonce";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("encrypted callback received but no encrypt key is configured")]
    EncryptKeyMissing,

    #[error("failed to decrypt callback: {0}")]
    Decrypt(#[from] DecryptError),

    #[error("callback body is not valid JSON: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("callback signature mismatch")]
    SignatureMismatch,

    #[error("verification token mismatch")]
    TokenMismatch,

    #[error("event handler failed: {0}")]
    Handler(anyhow::Error),
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::EncryptKeyMissing
            | WebhookError::Decrypt(_)
            | WebhookError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            WebhookError::SignatureMismatch | WebhookError::TokenMismatch => {
                StatusCode::UNAUTHORIZED
            }
            WebhookError::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "callback failed");
        } else {
            tracing::warn!(error = %self, "callback rejected");
        }
        (status, Json(json!({ "msg": self.to_string() }))).into_response()
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn verify_signature(headers: &HeaderMap, encrypt_key: &str, raw: &[u8]) -> Result<(), WebhookError> {
    let valid = crypto::verify_signature(
        header(headers, TIMESTAMP_HEADER),
        header(headers, NONCE_HEADER),
        encrypt_key,
        raw,
        header(headers, SIGNATURE_HEADER),
    );
    if valid {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

fn verify_token(state: &AppState, envelope: &CallbackEnvelope) -> Result<(), WebhookError> {
    match state.verification_token.as_deref() {
        Some(expected) if envelope.token() != Some(expected) => Err(WebhookError::TokenMismatch),
        _ => Ok(()),
    }
}

#[tracing::instrument(
    name = "webhook_event",
    skip_all,
    fields(
        event_type = tracing::field::Empty,
        delivery_id = tracing::field::Empty,
        app_id = tracing::field::Empty,
        tenant_key = tracing::field::Empty
    )
)]
pub async fn handle(
    State(state): State<AppState>,
    headers: HeaderMap,
    raw: Bytes,
) -> Result<Response, WebhookError> {
    let plaintext = match encrypted_payload(&raw) {
        Some(encrypted) => {
            let key = state
                .encrypt_key
                .as_deref()
                .ok_or(WebhookError::EncryptKeyMissing)?;
            crypto::decrypt(&encrypted, key)?
        }
        None => raw.to_vec(),
    };
    let envelope = CallbackEnvelope::parse(&plaintext)?;

    if envelope.is_url_verification() {
        verify_token(&state, &envelope)?;
        let challenge = envelope.challenge.unwrap_or_default();
        return Ok(Json(json!({ "challenge": challenge })).into_response());
    }

    if let Some(key) = state.encrypt_key.as_deref() {
        verify_signature(&headers, key, &raw)?;
    }
    verify_token(&state, &envelope)?;

    let span = tracing::Span::current();
    if let Some(delivery_id) = envelope.delivery_id() {
        span.record("delivery_id", delivery_id);
    }
    if let Some(app_id) = envelope.app_id() {
        span.record("app_id", app_id);
    }
    if let Some(tenant_key) = envelope.tenant_key() {
        span.record("tenant_key", tenant_key);
    }
    let event_type = envelope.event_type().unwrap_or_default();
    span.record("event_type", event_type);

    let dispatched = state
        .dispatcher
        .dispatch(event_type, &plaintext)
        .await
        .map_err(WebhookError::Handler)?;
    if dispatched == Dispatched::Handled {
        tracing::debug!("callback handled");
    }
    Ok(Json(json!({ "msg": "success" })).into_response())
}
