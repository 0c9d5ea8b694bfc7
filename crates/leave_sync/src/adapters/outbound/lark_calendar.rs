// TimeOffCalendar implementation backed by the Lark open platform calendar API.
//
// Responsibilities
// - Create and delete time-off events on behalf of the app (tenant access token).
// - Turn a non-success response into CalendarError::Rejected with the platform request id.
//
// Boundaries
// - No retries. The handlers log the failure and move on.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::json;

use crate::adapters::outbound::tenant_token::TenantTokenSource;
use crate::core::leave::period::LEAVE_TIME_ZONE;
use crate::core::ports::{CalendarError, TimeOffCalendar};

pub const DEFAULT_BASE_URL: &str = "https://open.feishu.cn";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const TIMEOFF_EVENTS_PATH: &str = "/open-apis/calendar/v4/timeoff_events";
const LOG_ID_HEADER: &str = "x-tt-logid";
const REQUEST_ID_HEADER: &str = "x-request-id";
/// Invalid or expired tenant access token.
const TOKEN_REJECTED_CODES: [i64; 2] = [99991661, 99991663];

/// Common `{code, msg, data}` response body of the open platform.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: serde_json::Value,
}

pub(crate) fn request_id_of(headers: &HeaderMap) -> String {
    [LOG_ID_HEADER, REQUEST_ID_HEADER]
        .iter()
        .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
        .unwrap_or_default()
        .to_string()
}

pub struct LarkCalendar {
    timeoff_events: reqwest::Url,
    client: reqwest::Client,
    tokens: TenantTokenSource,
}

/// Successful response: platform request id and `data`.
struct Invoked {
    request_id: String,
    data: serde_json::Value,
}

impl LarkCalendar {
    pub fn new(
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CalendarError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let timeoff_events = reqwest::Url::parse(&format!("{base_url}{TIMEOFF_EVENTS_PATH}"))
            .map_err(|e| CalendarError::Setup(format!("invalid base url {base_url:?}: {e}")))?;
        if timeoff_events.cannot_be_a_base() {
            return Err(CalendarError::Setup(format!(
                "base url {base_url:?} cannot hold a path"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CalendarError::Setup(format!("http client: {e}")))?;
        let tokens = TenantTokenSource::new(client.clone(), &base_url, app_id, app_secret);
        Ok(Self {
            timeoff_events,
            client,
            tokens,
        })
    }

    /// `.../timeoff_events/<event_id>`, with the id percent-encoded as one path segment.
    fn timeoff_event_url(&self, event_id: &str) -> reqwest::Url {
        let mut url = self.timeoff_events.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(event_id);
        }
        url
    }

    async fn invoke(&self, request: reqwest::RequestBuilder) -> Result<Invoked, CalendarError> {
        let token = self.tokens.token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| CalendarError::Transport(format!("calendar request failed: {e}")))?;

        let request_id = request_id_of(response.headers());
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| CalendarError::Transport(format!("failed reading calendar response: {e}")))?;

        let Ok(parsed) = serde_json::from_slice::<ApiResponse>(&body) else {
            return Err(CalendarError::Rejected {
                request_id,
                code: i64::from(status.as_u16()),
                msg: String::from_utf8_lossy(&body).to_string(),
                data: serde_json::Value::Null,
            });
        };

        if parsed.code != 0 || !status.is_success() {
            let code = if parsed.code != 0 {
                parsed.code
            } else {
                i64::from(status.as_u16())
            };
            if TOKEN_REJECTED_CODES.contains(&code) {
                self.tokens.invalidate().await;
            }
            return Err(CalendarError::Rejected {
                request_id,
                code,
                msg: parsed.msg,
                data: parsed.data,
            });
        }
        Ok(Invoked {
            request_id,
            data: parsed.data,
        })
    }
}

#[async_trait]
impl TimeOffCalendar for LarkCalendar {
    async fn create_time_off(
        &self,
        subject_id: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<String, CalendarError> {
        let request = self
            .client
            .post(self.timeoff_events.clone())
            .query(&[("user_id_type", "user_id")])
            .json(&json!({
                "user_id": subject_id,
                "timezone": LEAVE_TIME_ZONE,
                "start_time": start.timestamp().to_string(),
                "end_time": end.timestamp().to_string(),
            }));

        let Invoked { request_id, data } = self.invoke(request).await?;
        match data.get("timeoff_event_id").and_then(|v| v.as_str()) {
            Some(event_id) => Ok(event_id.to_string()),
            None => Err(CalendarError::Rejected {
                request_id,
                code: 0,
                msg: "response without timeoff_event_id".into(),
                data,
            }),
        }
    }

    async fn delete_time_off(&self, event_id: &str) -> Result<(), CalendarError> {
        let request = self.client.delete(self.timeoff_event_url(event_id));
        self.invoke(request).await.map(|_| ())
    }
}
