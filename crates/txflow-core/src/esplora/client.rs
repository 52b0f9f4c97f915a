use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::{debug, trace};

use crate::error::{ApiError, CoreError};

use super::types::EsploraTx;
use super::EsploraApi;

/// Characters of an undecodable response body kept in the error message.
const BODY_PREVIEW_LEN: usize = 200;

// ==============================================================================
// HttpEsploraClient: sequential Esplora REST client
// ==============================================================================

/// Esplora REST client over HTTP(S).
///
/// Requests are issued one at a time; after every request (successful or
/// not) the client sleeps for the configured delay so a long identifier
/// list does not overwhelm the API.
pub struct HttpEsploraClient {
    client: reqwest::Client,
    base_url: String,
    delay: Duration,
}

impl HttpEsploraClient {
    /// Create a client for `base_url` (e.g. `http://localhost:3002` or
    /// `https://blockstream.info/api`). A trailing slash is ignored.
    pub fn new(base_url: &str, timeout: Duration, delay: Duration) -> Result<Self, CoreError> {
        let base_url = parse_base_url(base_url)?;

        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .tcp_nodelay(true)
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            client,
            base_url,
            delay,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn pace(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    async fn fetch_transaction(&self, txid: &str) -> Result<EsploraTx, CoreError> {
        let url = format!("{}/tx/{txid}", self.base_url);
        debug!(%url, "esplora request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let status = response.status();
        let body = response.text().await.map_err(ApiError::Transport)?;
        debug!(%url, %status, body_len = body.len(), "esplora response");
        trace!(%url, body = %body, "esplora response body");

        if status == StatusCode::NOT_FOUND {
            return Err(CoreError::TxNotFound(txid.to_owned()));
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
            }
            .into());
        }

        serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "decode transaction {txid}: {e}; body={}",
                body_preview(&body)
            ))
            .into()
        })
    }
}

fn body_preview(body: &str) -> String {
    let mut chars = body.chars();
    let preview: String = chars.by_ref().take(BODY_PREVIEW_LEN).collect();
    if chars.next().is_some() {
        format!("{preview}... ({} bytes)", body.len())
    } else {
        preview
    }
}

#[async_trait]
impl EsploraApi for HttpEsploraClient {
    async fn get_transaction(&self, txid: &str) -> Result<EsploraTx, CoreError> {
        let result = self.fetch_transaction(txid).await;
        self.pace().await;
        result
    }
}

fn parse_base_url(base_url: &str) -> Result<String, CoreError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|e| {
        CoreError::Config(format!(
            "invalid base URL `{base_url}`: expected HTTP(S) URL ({e})"
        ))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_owned()),
        other => Err(CoreError::Config(format!(
            "unsupported base URL scheme `{other}`; expected http or https"
        ))),
    }
}
