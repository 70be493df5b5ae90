#![warn(clippy::pedantic, clippy::expect_used, clippy::unwrap_used)]
#![allow(clippy::module_name_repetitions)]

use std::{fmt, str::FromStr, time::Duration};

use bon::Builder;
use kvseed_core::KvStore;
use reqwest::{RequestBuilder, Url};

pub use crate::error::{Error, Result};

pub mod error;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8500";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const TOKEN_HEADER: &str = "X-Consul-Token";

const KV_ENDPOINT: [&str; 2] = ["v1", "kv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(format!("Unknown scheme: {other}")),
        }
    }
}

/// Connection settings for [`Client`].
///
/// # Example
///
/// ```
/// use kvseed_consul::{ClientOptions, Scheme};
///
/// let options = ClientOptions::builder()
///     .address("consul.internal:8500")
///     .scheme(Scheme::Https)
///     .token("secret")
///     .build();
///
/// assert_eq!(
///     options.base_url().unwrap().as_str(),
///     "https://consul.internal:8500/"
/// );
/// ```
#[derive(Debug, Clone, Builder)]
pub struct ClientOptions {
    /// `host:port`, or a full URL whose scheme then takes precedence over
    /// [`ClientOptions::scheme`].
    #[builder(default = DEFAULT_ADDRESS.to_string(), into)]
    address: String,

    #[builder(into)]
    token: Option<String>,

    #[builder(default)]
    scheme: Scheme,

    #[builder(into)]
    datacenter: Option<String>,

    #[builder(default = DEFAULT_TIMEOUT)]
    timeout: Duration,
}

impl ClientOptions {
    /// Resolve the address and scheme into the URL all API paths hang off.
    ///
    /// An empty address falls back to [`DEFAULT_ADDRESS`].
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not a valid URL authority.
    pub fn base_url(&self) -> Result<Url> {
        let address = self.address.trim();
        let address = if address.is_empty() {
            DEFAULT_ADDRESS
        } else {
            address
        };

        let raw = if address.starts_with("http://") || address.starts_with("https://") {
            address.to_string()
        } else {
            format!("{}://{address}", self.scheme)
        };

        let url = Url::parse(&raw).map_err(|source| Error::InvalidAddress {
            address: address.to_string(),
            source,
        })?;

        if url.cannot_be_a_base() {
            return Err(Error::NotABaseUrl(address.to_string()));
        }

        Ok(url)
    }
}

/// A handle to the key-value endpoints of a Consul agent.
///
/// Creating a client does not contact the agent; errors surface on the first
/// request.
#[derive(Debug, Clone)]
pub struct Client {
    base: Url,
    token: Option<String>,
    datacenter: Option<String>,
    http: reqwest::Client,
}

impl Client {
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the HTTP client cannot
    /// be built.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()?;

        Self::with_http_client(&options, http)
    }

    fn with_http_client(options: &ClientOptions, http: reqwest::Client) -> Result<Self> {
        let base = options.base_url()?;

        tracing::debug!(%base, "Created store client");

        Ok(Self {
            base,
            token: options.token.clone().filter(|token| !token.is_empty()),
            datacenter: options.datacenter.clone().filter(|dc| !dc.is_empty()),
            http,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// The URL of `key` in the KV API.
    ///
    /// Each `/`-separated segment is percent-encoded on its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry a path.
    pub fn kv_url(&self, key: &str) -> Result<Url> {
        let mut url = self.base.clone();

        url.path_segments_mut()
            .map_err(|()| Error::NotABaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(KV_ENDPOINT)
            .extend(key.split('/'));

        if let Some(dc) = &self.datacenter {
            url.query_pairs_mut().append_pair("dc", dc);
        }

        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> Result<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(Error::Response {
                status,
                message: body.trim().to_string(),
            })
        }
    }

    /// Write `value` to `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the agent answers with an
    /// error status, or the agent refuses the write.
    #[tracing::instrument(skip(self, value))]
    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
        let url = self.kv_url(key)?;
        let request = self.authorize(self.http.put(url).body(value.to_string()));

        let body = Self::send(request).await?;

        if body.trim() == "true" {
            Ok(())
        } else {
            Err(Error::Rejected(key.to_string()))
        }
    }

    /// Delete every key below `prefix`, including `prefix` itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the agent answers with an
    /// error status.
    #[tracing::instrument(skip(self))]
    pub async fn delete_tree(&self, prefix: &str) -> Result<()> {
        let mut url = self.kv_url(prefix)?;
        url.query_pairs_mut().append_pair("recurse", "true");

        let request = self.authorize(self.http.delete(url));

        Self::send(request).await.map(|_| ())
    }
}

impl KvStore for Client {
    type Error = Error;

    async fn delete_tree(&self, prefix: &str) -> Result<()> {
        Client::delete_tree(self, prefix).await
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        Client::put(self, key, value).await
    }
}
