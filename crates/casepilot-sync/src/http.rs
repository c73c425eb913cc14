//! HTTP client for the external case-status service.

use std::time::Duration;

use async_trait::async_trait;
use casepilot_core::StatusUpdate;
use casepilot_core::dates::parse_iso_first;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unparseable date {0:?}")]
    Date(String),
}

/// Anything that can report the hearing status of a case by its CINO.
#[async_trait]
pub trait CaseStatusSource: Send + Sync {
    async fn fetch_status(&self, cino: &str) -> Result<StatusUpdate, SyncError>;
}

#[derive(Debug, Default, Deserialize)]
struct StatusPayload {
    #[serde(default)]
    date_last_list: Option<String>,
    #[serde(default)]
    date_next_list: Option<String>,
    #[serde(default)]
    purpose_name: Option<String>,
}

fn payload_date(raw: Option<&str>) -> Result<Option<NaiveDate>, SyncError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_iso_first(s)
            .map(Some)
            .ok_or_else(|| SyncError::Date(s.to_string())),
    }
}

/// Decode a case-status response body.
pub fn parse_status(body: &[u8]) -> Result<StatusUpdate, SyncError> {
    let payload: StatusPayload = serde_json::from_slice(body)?;
    Ok(StatusUpdate {
        date_last_list: payload_date(payload.date_last_list.as_deref())?,
        date_next_list: payload_date(payload.date_next_list.as_deref())?,
        purpose_name: payload.purpose_name,
    })
}

/// Bearer-authenticated client for `{base_url}/case-status/{cino}`.
pub struct StatusClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl StatusClient {
    /// `base_url` may carry a trailing slash; it is stripped.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    pub fn status_url(&self, cino: &str) -> String {
        format!("{}/case-status/{}", self.base_url, cino)
    }
}

#[async_trait]
impl CaseStatusSource for StatusClient {
    async fn fetch_status(&self, cino: &str) -> Result<StatusUpdate, SyncError> {
        let url = self.status_url(cino);
        debug!(url = %url, "fetching case status");
        let mut req = self.client.get(&url);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }
        let body = resp.bytes().await?;
        parse_status(&body)
    }
}
