// Tenant access token for calls to the Lark open platform.
//
// Responsibilities
// - Exchange the app credentials for a tenant access token.
// - Cache the token and refresh it shortly before it expires.

use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use crate::adapters::outbound::lark_calendar::request_id_of;
use crate::core::ports::CalendarError;

const TENANT_TOKEN_PATH: &str = "/open-apis/auth/v3/tenant_access_token/internal";
const REFRESH_MARGIN: Duration = Duration::from_secs(3 * 60);

#[derive(Debug, Deserialize)]
struct TenantTokenResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    tenant_access_token: String,
    /// Seconds until the token expires.
    #[serde(default)]
    expire: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

pub struct TenantTokenSource {
    client: reqwest::Client,
    token_url: String,
    app_id: String,
    app_secret: String,
    cached: RwLock<Option<CachedToken>>,
}

impl TenantTokenSource {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        Self {
            client,
            token_url: format!("{}{TENANT_TOKEN_PATH}", base_url.trim_end_matches('/')),
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            cached: RwLock::new(None),
        }
    }

    pub async fn token(&self) -> Result<String, CalendarError> {
        if let Some(token) = Self::fresh(&*self.cached.read().await) {
            return Ok(token);
        }

        let mut cached = self.cached.write().await;
        if let Some(token) = Self::fresh(&cached) {
            return Ok(token);
        }
        let fetched = self.fetch().await?;
        let value = fetched.value.clone();
        *cached = Some(fetched);
        Ok(value)
    }

    /// Drops the cached token so the next call fetches a new one.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    fn fresh(cached: &Option<CachedToken>) -> Option<String> {
        cached
            .as_ref()
            .filter(|token| Instant::now() < token.refresh_at)
            .map(|token| token.value.clone())
    }

    async fn fetch(&self) -> Result<CachedToken, CalendarError> {
        let response = self
            .client
            .post(&self.token_url)
            .json(&json!({ "app_id": self.app_id, "app_secret": self.app_secret }))
            .send()
            .await
            .map_err(|e| CalendarError::Transport(format!("tenant token request failed: {e}")))?;

        let request_id = request_id_of(response.headers());
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| CalendarError::Transport(format!("failed reading tenant token body: {e}")))?;

        let Ok(parsed) = serde_json::from_slice::<TenantTokenResponse>(&body) else {
            return Err(CalendarError::Rejected {
                request_id,
                code: i64::from(status.as_u16()),
                msg: String::from_utf8_lossy(&body).to_string(),
                data: serde_json::Value::Null,
            });
        };
        if parsed.code != 0 || parsed.tenant_access_token.is_empty() {
            return Err(CalendarError::Rejected {
                request_id,
                code: parsed.code,
                msg: parsed.msg,
                data: serde_json::Value::Null,
            });
        }

        let lifetime = Duration::from_secs(parsed.expire).saturating_sub(REFRESH_MARGIN);
        tracing::debug!(expire = parsed.expire, "tenant access token refreshed");
        Ok(CachedToken {
            value: parsed.tenant_access_token,
            refresh_at: Instant::now() + lifetime,
        })
    }
}
