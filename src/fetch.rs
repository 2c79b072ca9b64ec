use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::settings::Settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A page could not be reached over any attempted scheme.
#[derive(Debug, Error)]
#[error("failed to fetch {url}")]
pub struct TransportError {
    pub url: String,
    #[source]
    source: BoxError,
}

impl TransportError {
    pub fn new(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
        }
    }
}

/// Blocking page source. The crawl only ever needs "URL in, HTML out".
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<String, TransportError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    fn get(&self, url: &str) -> reqwest::Result<String> {
        let start = Instant::now();
        let body = self.client.get(url).send()?.error_for_status()?.text()?;
        debug!(url, bytes = body.len(), latency_ms = start.elapsed().as_millis() as u64, "fetched");
        Ok(body)
    }
}

impl Fetch for HttpFetcher {
    /// GET the page; an `https://` failure is retried once over `http://`
    /// since some proxies refuse HTTPS tunnelling.
    fn fetch(&self, url: &str) -> Result<String, TransportError> {
        match self.get(url) {
            Ok(body) => Ok(body),
            Err(err) => match downgrade_scheme(url) {
                Some(alt) => {
                    warn!(url, error = %err, "HTTPS fetch failed, retrying over HTTP");
                    self.get(&alt).map_err(|e| TransportError::new(alt, e))
                }
                None => Err(TransportError::new(url, err)),
            },
        }
    }
}

fn downgrade_scheme(url: &str) -> Option<String> {
    url.strip_prefix("https://").map(|rest| format!("http://{}", rest))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    /// In-memory pages; unknown URLs fail like an unreachable host.
    #[derive(Default)]
    pub struct StaticFetcher {
        pub pages: HashMap<String, String>,
        pub requested: RefCell<Vec<String>>,
    }

    impl StaticFetcher {
        pub fn with(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages.iter().map(|(u, h)| (u.to_string(), h.to_string())).collect(),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl Fetch for StaticFetcher {
        fn fetch(&self, url: &str) -> Result<String, TransportError> {
            self.requested.borrow_mut().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| {
                TransportError::new(
                    url,
                    std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
                )
            })
        }
    }
}
