//! HTTP client for the FMCSA QCMobile carrier registry.

use std::time::Duration;

use async_trait::async_trait;
use loadbridge_core::carriers::{verdict_from_registry, CarrierRegistry};
use loadbridge_core::config::FmcsaConfig;
use loadbridge_core::domain::carrier::{CarrierIdentifier, CarrierVerdict};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
enum FetchError {
    #[error("{0}")]
    Status(u16),
    #[error("{0}")]
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        // The request URL carries the web key.
        Self::Transport(error.without_url())
    }
}

pub struct FmcsaClient {
    http: Client,
    base_url: String,
    web_key: SecretString,
}

impl FmcsaClient {
    pub fn new(
        base_url: impl Into<String>,
        web_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url: base_url.into().trim_end_matches('/').to_string(), web_key })
    }

    /// `None` when no web key is configured.
    pub fn from_config(config: &FmcsaConfig) -> Result<Option<Self>, reqwest::Error> {
        let Some(web_key) =
            config.api_key.clone().filter(|key| !key.expose_secret().trim().is_empty())
        else {
            return Ok(None);
        };
        Self::new(&config.base_url, web_key, Duration::from_secs(config.timeout_secs)).map(Some)
    }

    fn lookup_url(&self, identifier: &CarrierIdentifier) -> String {
        match identifier {
            CarrierIdentifier::Mc(mc) => format!("{}/carriers/docket-number/{mc}", self.base_url),
            CarrierIdentifier::Dot(dot) => format!("{}/carriers/{dot}", self.base_url),
        }
    }

    async fn fetch(&self, identifier: &CarrierIdentifier) -> Result<Option<Value>, FetchError> {
        let response = self
            .http
            .get(self.lookup_url(identifier))
            .query(&[("webKey", self.web_key.expose_secret())])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        Ok(Some(response.json::<Value>().await?))
    }
}

#[async_trait]
impl CarrierRegistry for FmcsaClient {
    async fn verify(&self, identifier: &CarrierIdentifier) -> CarrierVerdict {
        let verdict = match self.fetch(identifier).await {
            Ok(Some(payload)) => verdict_from_registry(identifier, &payload),
            Ok(None) => CarrierVerdict::not_found(identifier),
            Err(error) => {
                warn!(
                    event_name = "carriers.registry.error",
                    carrier = %identifier,
                    error = %error,
                    "carrier registry lookup failed"
                );
                return CarrierVerdict::registry_error(identifier, error);
            }
        };

        info!(
            event_name = "carriers.registry.verdict",
            carrier = %identifier,
            carrier_name = %verdict.carrier_name,
            eligible = verdict.eligible,
            status_code = %verdict.status_code,
            out_of_service = %verdict.out_of_service,
            "carrier registry lookup completed"
        );
        verdict
    }
}
