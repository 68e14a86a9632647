use std::sync::Arc;

use blockwatch_core::error::AppError;
use blockwatch_core::models::{ProbeFailure, ProbeOutcome};
use blockwatch_core::traits::Prober;
use blockwatch_core::Domain;
use reqwest::{Client, Response, StatusCode};
use url::Url;

use crate::config::ProxyConfig;
use crate::transport::{ProbeConfig, build_client};

/// HTTPS prober using reqwest.
///
/// Issues one GET to `https://{domain}` per call and looks for the blocking
/// signature in the body of a direct 200 response. Transport failures are
/// returned as [`ProbeOutcome::TransientError`], never as errors.
#[derive(Clone)]
pub struct ReqwestProber {
    client: Client,
    signature: Arc<str>,
}

impl ReqwestProber {
    pub fn new(config: &ProbeConfig, proxy: Option<&ProxyConfig>) -> Result<Self, AppError> {
        let client = build_client(config, proxy)?;
        Self::with_client(client, &config.signature)
    }

    /// Use an already configured client.
    pub fn with_client(client: Client, signature: &str) -> Result<Self, AppError> {
        if signature.is_empty() {
            return Err(AppError::ConfigError(
                "Blocking signature must not be empty".into(),
            ));
        }
        Ok(Self {
            client,
            signature: Arc::from(signature),
        })
    }
}

impl Prober for ReqwestProber {
    async fn probe(&self, domain: &Domain) -> ProbeOutcome {
        let url = match target_url(domain) {
            Ok(url) => url,
            Err(failure) => return ProbeOutcome::TransientError(failure),
        };

        match self.client.get(url).send().await {
            Ok(response) => classify_response(response, &self.signature).await,
            Err(e) => ProbeOutcome::TransientError(classify_error(&e)),
        }
    }
}

/// `https://{domain}`
fn target_url(domain: &Domain) -> Result<Url, ProbeFailure> {
    Url::parse(&format!("https://{domain}"))
        .map_err(|e| ProbeFailure::InvalidUrl(format!("{domain}: {e}")))
}

/// Only a direct 200 is inspected; redirects and errors count as not blocked.
async fn classify_response(response: Response, signature: &str) -> ProbeOutcome {
    if response.status() != StatusCode::OK {
        return ProbeOutcome::NotBlocked;
    }

    match response.text().await {
        Ok(body) => classify_body(body, signature),
        Err(e) => ProbeOutcome::TransientError(ProbeFailure::Body(e.to_string())),
    }
}

fn classify_body(body: String, signature: &str) -> ProbeOutcome {
    if body.contains(signature) {
        ProbeOutcome::Blocked(body)
    } else {
        ProbeOutcome::NotBlocked
    }
}

fn classify_error(e: &reqwest::Error) -> ProbeFailure {
    if e.is_timeout() {
        ProbeFailure::Timeout
    } else if e.is_connect() {
        ProbeFailure::Connect(e.to_string())
    } else if e.is_body() || e.is_decode() {
        ProbeFailure::Body(e.to_string())
    } else if e.is_request() || e.is_builder() {
        ProbeFailure::Request(e.to_string())
    } else {
        ProbeFailure::Other(e.to_string())
    }
}
