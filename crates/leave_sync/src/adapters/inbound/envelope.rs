// Outer shape of an event callback body.
//
// Two schemas reach the callback URL:
// - v1: {"uuid", "token", "ts", "type": "event_callback", "event": {"type": ...}}
// - 2.0: {"schema": "2.0", "header": {"event_type", "token", ...}, "event": {...}}
// plus the {"type": "url_verification", "challenge", "token"} handshake.

use serde::Deserialize;

const SCHEMA_V2: &str = "2.0";
const URL_VERIFICATION: &str = "url_verification";

#[derive(Debug, Deserialize)]
struct EncryptedBody {
    encrypt: String,
}

/// The `encrypt` field of an encrypted callback, if the body is one.
pub fn encrypted_payload(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<EncryptedBody>(body)
        .ok()
        .map(|b| b.encrypt)
}

#[derive(Debug, Default, Deserialize)]
pub struct EventHeader {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub tenant_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackEnvelope {
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(rename = "type", default)]
    pub callback_type: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub challenge: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub header: Option<EventHeader>,
    #[serde(default)]
    pub event: Option<serde_json::Value>,
}

impl CallbackEnvelope {
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    pub fn is_url_verification(&self) -> bool {
        self.callback_type.as_deref() == Some(URL_VERIFICATION)
    }

    fn is_schema_v2(&self) -> bool {
        self.schema.as_deref() == Some(SCHEMA_V2)
    }

    /// Verification token carried by the callback.
    pub fn token(&self) -> Option<&str> {
        if self.is_schema_v2() {
            self.header.as_ref().and_then(|h| h.token.as_deref())
        } else {
            self.token.as_deref()
        }
    }

    pub fn event_type(&self) -> Option<&str> {
        self.header
            .as_ref()
            .and_then(|h| h.event_type.as_deref())
            .or_else(|| self.event_field("type"))
    }

    /// Platform id of this delivery, used to correlate logs.
    pub fn delivery_id(&self) -> Option<&str> {
        self.header
            .as_ref()
            .and_then(|h| h.event_id.as_deref())
            .or(self.uuid.as_deref())
    }

    pub fn app_id(&self) -> Option<&str> {
        self.header
            .as_ref()
            .and_then(|h| h.app_id.as_deref())
            .or_else(|| self.event_field("app_id"))
    }

    pub fn tenant_key(&self) -> Option<&str> {
        self.header
            .as_ref()
            .and_then(|h| h.tenant_key.as_deref())
            .or_else(|| self.event_field("tenant_key"))
    }

    fn event_field(&self, name: &str) -> Option<&str> {
        self.event
            .as_ref()
            .and_then(|e| e.get(name))
            .and_then(|v| v.as_str())
    }
}
