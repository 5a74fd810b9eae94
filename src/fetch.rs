//! Notice board feed retrieval.
//!
//! One [`EndpointFetcher`] is built per run and shared by every worker. It
//! owns the `reqwest` connection pool together with the request timeout and
//! TLS settings, all read-only after construction.

use crate::config::FetchSettings;
use crate::error::{ConfigError, FetchError};
use crate::models::is_missing_endpoint;
use crate::utils::truncate_for_log;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct EndpointFetcher {
    http: Client,
}

impl EndpointFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, ConfigError> {
        if settings.accept_invalid_certs {
            warn!("TLS certificate validation is disabled for notice board endpoints");
        }
        let http = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout())
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()?;
        Ok(Self { http })
    }

    /// Fetch a payload, collapsing every failure to `None`.
    ///
    /// Empty and `null` endpoints return `None` without touching the network.
    pub async fn fetch(&self, endpoint: &str) -> Option<Value> {
        match self.try_fetch(endpoint).await {
            Ok(payload) => payload,
            Err(e) => {
                debug!(%endpoint, error = %e, "Fetch failed");
                None
            }
        }
    }

    /// Fetch a payload, keeping the reason for a failure.
    ///
    /// Returns `Ok(None)` for empty and `null` endpoints, which are not
    /// failures. Only status 200 with a JSON body counts as success.
    #[instrument(level = "debug", skip_all, fields(%endpoint))]
    pub async fn try_fetch(&self, endpoint: &str) -> Result<Option<Value>, FetchError> {
        if is_missing_endpoint(endpoint) {
            return Ok(None);
        }
        let url = Url::parse(endpoint.trim())?;

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Received payload");
        match serde_json::from_slice::<Value>(&body) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) => {
                debug!(
                    error = %e,
                    body_preview = %truncate_for_log(&String::from_utf8_lossy(&body), 200),
                    "Payload is not valid JSON"
                );
                Err(e.into())
            }
        }
    }
}
