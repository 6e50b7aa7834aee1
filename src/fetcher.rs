use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::fetch_error::FetchError;

/// Responses below this length are treated as retrieval failure, not as a
/// valid (empty) export.
pub const DEFAULT_MIN_CSV_LENGTH: usize = 50;

/// How a proxy endpoint expects the target URL and returns the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyKind {
    /// `?url=<target>&t=<millis>`; body is a JSON envelope with a `contents`
    /// field holding the raw CSV.
    AllOrigins,
    /// `?quest=<target>`; body is the raw CSV.
    CodeTabs,
    /// `?url=<target>&t=<millis>`; body is the raw CSV.
    CorsProxy,
}

/// One alternate network path to the published sheet. Tried in order until
/// one yields a usable body.
#[derive(Debug, Clone)]
pub struct ProxyEndpoint {
    pub base_url: String,
    pub kind: ProxyKind,
}

impl ProxyEndpoint {
    pub fn new(base_url: impl Into<String>, kind: ProxyKind) -> Self {
        Self {
            base_url: base_url.into(),
            kind,
        }
    }
}

/// Body shape returned by allorigins-style wrapping proxies.
#[derive(Debug, Deserialize)]
struct ProxyEnvelope {
    contents: String,
}

/// Fetches the published sheet CSV through alternating proxy endpoints.
#[derive(Clone)]
pub struct SheetFetcher {
    client: reqwest::Client,
    sheet_url: String,
    proxies: Vec<ProxyEndpoint>,
    min_csv_length: usize,
}

impl SheetFetcher {
    pub fn new(sheet_url: String, min_csv_length: usize) -> Self {
        Self::with_proxies(sheet_url, default_proxies(), min_csv_length)
    }

    /// Construct with explicit proxy endpoints. Used by tests to point the
    /// fetcher at mock servers.
    pub fn with_proxies(
        sheet_url: String,
        proxies: Vec<ProxyEndpoint>,
        min_csv_length: usize,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            sheet_url,
            proxies,
            min_csv_length,
        }
    }

    /// Try each retrieval source in order and return the first usable CSV
    /// body. A non-success status, a broken envelope, or a body below the
    /// minimum length all count as failure of that source; once every source
    /// has failed the whole retrieval is reported as exhausted.
    #[instrument(skip(self), fields(sources = self.proxies.len()))]
    pub async fn fetch_csv(&self) -> Result<String, FetchError> {
        for (i, proxy) in self.proxies.iter().enumerate() {
            debug!("Trying retrieval source {} ({:?})", i + 1, proxy.kind);
            match self.try_source(proxy).await {
                Ok(text) => {
                    info!("Retrieved {} bytes via source {}", text.len(), i + 1);
                    return Ok(text);
                }
                Err(e) => {
                    warn!("Retrieval source {} failed: {}", i + 1, e);
                }
            }
        }

        Err(FetchError::Exhausted {
            attempts: self.proxies.len(),
        })
    }

    async fn try_source(&self, proxy: &ProxyEndpoint) -> Result<String, FetchError> {
        // Cache-buster so intermediary proxies don't serve a stale export
        let ts = Utc::now().timestamp_millis().to_string();
        let request = match proxy.kind {
            ProxyKind::AllOrigins | ProxyKind::CorsProxy => self
                .client
                .get(&proxy.base_url)
                .query(&[("url", self.sheet_url.as_str()), ("t", ts.as_str())]),
            ProxyKind::CodeTabs => self
                .client
                .get(&proxy.base_url)
                .query(&[("quest", self.sheet_url.as_str())]),
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        let csv_text = match proxy.kind {
            ProxyKind::AllOrigins => serde_json::from_str::<ProxyEnvelope>(&body)?.contents,
            ProxyKind::CodeTabs | ProxyKind::CorsProxy => body,
        };

        if csv_text.len() < self.min_csv_length {
            return Err(FetchError::TooShort {
                len: csv_text.len(),
                min: self.min_csv_length,
            });
        }

        Ok(csv_text)
    }
}

/// The production proxy chain, in the order it is attempted.
pub fn default_proxies() -> Vec<ProxyEndpoint> {
    vec![
        ProxyEndpoint::new("https://api.allorigins.win/get", ProxyKind::AllOrigins),
        ProxyEndpoint::new("https://api.codetabs.com/v1/proxy", ProxyKind::CodeTabs),
        ProxyEndpoint::new("https://corsproxy.io/", ProxyKind::CorsProxy),
    ]
}
