//! Remote content fetching over HTTP with optional Basic-Auth.

use crate::config::Credentials;
use crate::error::{ProvisionError, Result};

/// Capability seam for remote fetches.
///
/// The pipeline only ever needs "GET this URL, give me the bytes"; tests
/// inject an in-memory implementation so no network is touched.
pub trait RemoteFetcher: Send + Sync {
    /// Fetch `url` and return the raw response body.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Config`] for an empty URL (caller error,
    /// no request is attempted) and [`ProvisionError::Fetch`] for transport
    /// failures or non-success HTTP statuses.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Production fetcher backed by [`ureq`].
///
/// Credentials are read from the environment at fetch time, so a token
/// exported between runs is picked up without restarting anything.
#[derive(Debug, Default)]
pub struct HttpFetcher;

impl HttpFetcher {
    /// Create a fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RemoteFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if url.trim().is_empty() {
            return Err(ProvisionError::Config("missing URL".to_string()));
        }

        let mut request = ureq::get(url);
        if let Some(auth) = Credentials::from_env().authorization() {
            request = request.header("Authorization", &auth);
        }

        let mut response = request.call().map_err(|e| ProvisionError::Fetch {
            url: url.to_string(),
            source: Box::new(e),
        })?;
        response
            .body_mut()
            .read_to_vec()
            .map_err(|e| ProvisionError::Fetch {
                url: url.to_string(),
                source: Box::new(e),
            })
    }
}
