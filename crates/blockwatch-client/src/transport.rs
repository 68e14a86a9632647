use std::time::Duration;

use blockwatch_core::AppError;
use reqwest::{Client, Proxy, redirect, tls};

use crate::config::ProxyConfig;

/// Block-notice URL the ISP embeds in its substitute page.
pub const BLOCK_SIGNATURE: &str = "https://www.laliga.com/noticias/nota-informativa-en-relacion-con-el-bloqueo-de-ips-durante-las-ultimas-jornadas-de-laliga-ea-sports-vinculadas-a-las-practicas-ilegales-de-cloudflare";

/// Per-request probe settings.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Deadline for one attempt, connect through body.
    pub timeout: Duration,
    pub user_agent: String,
    /// Substring whose presence in a 200 body marks the domain as blocked.
    pub signature: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            user_agent: concat!("blockwatch/", env!("CARGO_PKG_VERSION")).to_string(),
            signature: BLOCK_SIGNATURE.to_string(),
        }
    }
}

impl ProbeConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Build the shared HTTP client used by every probe.
///
/// TLS is deliberately relaxed: certificates and host names are not
/// verified and TLS 1.0/1.1 servers are accepted, since the goal is to see
/// what the ISP serves, not to trust it. Redirects are never followed, and
/// there is no connection cap; callers bound concurrency themselves.
///
/// Without a proxy, system proxy settings are ignored too.
pub fn build_client(config: &ProbeConfig, proxy: Option<&ProxyConfig>) -> Result<Client, AppError> {
    let builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout)
        .redirect(redirect::Policy::none())
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .min_tls_version(tls::Version::TLS_1_0);

    let builder = match proxy {
        Some(proxy) => {
            let url = proxy.proxy_url()?;
            tracing::info!(
                host = %proxy.host,
                port = %proxy.port,
                country = %proxy.country,
                asn = ?proxy.asn,
                "Routing probes through proxy"
            );
            builder.proxy(
                Proxy::all(url.as_str())
                    .map_err(|e| AppError::ConfigError(format!("Invalid proxy URL: {e}")))?,
            )
        }
        None => builder.no_proxy(),
    };

    builder
        .build()
        .map_err(|e| AppError::HttpError(e.to_string()))
}
