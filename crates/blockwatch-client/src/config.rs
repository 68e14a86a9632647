use std::fmt;

use blockwatch_core::AppError;
use url::Url;

pub const DEFAULT_PROXY_HOST: &str = "proxy.geonode.io";
pub const DEFAULT_PROXY_PORT: u16 = 9000;
pub const DEFAULT_PROXY_COUNTRY: &str = "es";

/// Residential proxy credentials and geo-routing parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    /// Two-letter country code for the egress IP.
    pub country: String,
    /// Autonomous system the egress IP must belong to.
    pub asn: Option<String>,
}

impl ProxyConfig {
    /// Read configuration from environment variables.
    ///
    /// - `GEONODE_USERNAME`, `GEONODE_PASSWORD` (optional; `Ok(None)` if missing)
    /// - `PROXY_HOST` (optional, defaults to `proxy.geonode.io`)
    /// - `PROXY_PORT` (optional, defaults to 9000)
    /// - `PROXY_COUNTRY` (optional, defaults to `es`)
    /// - `ES_DIGISPAIN_ASN` (optional)
    pub fn from_env() -> Result<Option<Self>, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let (Some(username), Some(password)) =
            (non_empty("GEONODE_USERNAME"), non_empty("GEONODE_PASSWORD"))
        else {
            tracing::warn!(
                "GEONODE_USERNAME or GEONODE_PASSWORD not set; probing without a proxy"
            );
            return Ok(None);
        };

        let port = match non_empty("PROXY_PORT") {
            None => DEFAULT_PROXY_PORT,
            Some(raw) => raw.trim().parse().map_err(|_| {
                AppError::ConfigError(format!(
                    "Invalid PROXY_PORT '{raw}': must be an integer between 1 and 65535"
                ))
            })?,
        };
        if port == 0 {
            return Err(AppError::ConfigError("PROXY_PORT must not be 0".into()));
        }

        let asn = non_empty("ES_DIGISPAIN_ASN");
        if asn.is_none() {
            tracing::warn!("ES_DIGISPAIN_ASN not set; proxy egress will not be pinned to an ASN");
        }

        Ok(Some(Self {
            username,
            password,
            host: non_empty("PROXY_HOST").unwrap_or_else(|| DEFAULT_PROXY_HOST.to_string()),
            port,
            country: non_empty("PROXY_COUNTRY")
                .unwrap_or_else(|| DEFAULT_PROXY_COUNTRY.to_string()),
            asn,
        }))
    }

    /// Proxy username carrying the routing parameters.
    ///
    /// Example: `alice-type-residential-country-es-asn-57269`
    pub fn routed_username(&self) -> String {
        let mut name = format!(
            "{}-type-residential-country-{}",
            self.username, self.country
        );
        if let Some(asn) = &self.asn {
            name.push_str("-asn-");
            name.push_str(asn);
        }
        name
    }

    /// Full proxy URL with percent-encoded credentials.
    pub fn proxy_url(&self) -> Result<Url, AppError> {
        let mut url = Url::parse(&format!("http://{}:{}", self.host, self.port))
            .map_err(|e| AppError::ConfigError(format!("Invalid proxy host '{}': {e}", self.host)))?;
        url.set_username(&self.routed_username())
            .map_err(|()| AppError::ConfigError("Proxy URL cannot carry a username".into()))?;
        url.set_password(Some(&self.password))
            .map_err(|()| AppError::ConfigError("Proxy URL cannot carry a password".into()))?;
        Ok(url)
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("country", &self.country)
            .field("asn", &self.asn)
            .finish()
    }
}
