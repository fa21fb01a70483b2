//! reqwest-backed `RemoteClient`.

use std::future::Future;
use std::time::Duration;
use tracing::debug;

use super::{RemoteClient, Request, Response};
use crate::error::{GalleryError, Result};

const USER_AGENT: &str = concat!("paperless-gallery/", env!("CARGO_PKG_VERSION"));

/// Pooled HTTP client for the document store.
///
/// reqwest::Client pools connections internally and is cheap to clone, so
/// one instance serves every tile of every gallery.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(16)
            .build()
            .map_err(|e| GalleryError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(HttpClient { inner })
    }
}

impl RemoteClient for HttpClient {
    fn get(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        let client = self.inner.clone();
        async move {
            debug!("GET {}", request.url);
            let response = client
                .get(&request.url)
                .header(reqwest::header::AUTHORIZATION, &request.authorization)
                .send()
                .await
                .map_err(|e| GalleryError::Transport(format!("{}: {}", request.url, e)))?;

            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| GalleryError::Transport(format!("{}: {}", request.url, e)))?;

            Ok(Response {
                url: request.url,
                status,
                body: body.to_vec(),
            })
        }
    }
}
