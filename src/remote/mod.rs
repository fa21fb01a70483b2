/// Remote document store access
///
/// This module handles:
/// - The `RemoteClient` capability every fetch goes through
/// - Request/response types and JSON decoding
/// - Payload shapes of the store's API
/// - A reqwest-backed client (http.rs)
pub mod http;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;

use crate::config::Config;
use crate::error::{GalleryError, Result};
use crate::state::data::{TagId, TagMetadata};

pub use http::HttpClient;

/// An authenticated GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    /// Value of the `Authorization` header
    pub authorization: String,
}

impl Request {
    pub fn new(url: impl Into<String>, config: &Config) -> Self {
        Request {
            url: url.into(),
            authorization: config.authorization(),
        }
    }
}

/// Raw answer from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    /// Turn any non-200 status into `GalleryError::Network`
    pub fn ensure_ok(self) -> Result<Self> {
        if self.status == 200 {
            Ok(self)
        } else {
            Err(GalleryError::Network {
                url: self.url,
                status: self.status,
            })
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Performs authenticated GETs against the document store.
///
/// Transport failures map to `GalleryError::Transport`; every received
/// response is returned as-is, whatever its status.
pub trait RemoteClient: Send + Sync + 'static {
    fn get(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

/// GET `url` and decode a 200 answer as JSON
pub(crate) async fn get_json<C, T>(client: &C, config: &Config, url: String) -> Result<T>
where
    C: RemoteClient,
    T: DeserializeOwned,
{
    let response = client.get(Request::new(url, config)).await?.ensure_ok()?;
    response.json()
}

/// GET `url` and return the body of a 200 answer
pub(crate) async fn get_bytes<C: RemoteClient>(
    client: &C,
    config: &Config,
    url: String,
) -> Result<Vec<u8>> {
    let response = client.get(Request::new(url, config)).await?.ensure_ok()?;
    Ok(response.body)
}

/// `/api/documents/` - only the id list is used
#[derive(Debug, Deserialize)]
pub(crate) struct IndexPayload {
    pub all: Vec<u64>,
}

/// `/api/tags/` page
#[derive(Debug, Deserialize)]
pub(crate) struct TagPage {
    pub next: Option<String>,
    pub results: Vec<TagRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagRecord {
    pub id: TagId,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub text_color: String,
}

impl TagRecord {
    pub fn into_entry(self) -> (TagId, TagMetadata) {
        (
            self.id,
            TagMetadata {
                name: self.name,
                color: self.color,
                text_color: self.text_color,
            },
        )
    }
}

/// `/api/documents/{id}/` - only the tag list is used
#[derive(Debug, Deserialize)]
pub(crate) struct DocumentDetail {
    #[serde(default)]
    pub tags: Vec<TagId>,
}

/// `/api/documents/?query=...`
#[derive(Debug, Deserialize)]
pub(crate) struct SearchPayload {
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchHit {
    pub id: u64,
}


#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> Response {
        Response {
            url: "http://host/api/x/".to_string(),
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_ensure_ok() {
        assert!(response(200, "").ensure_ok().is_ok());
        assert_eq!(
            response(503, "").ensure_ok(),
            Err(GalleryError::Network {
                url: "http://host/api/x/".to_string(),
                status: 503
            })
        );
    }

    #[test]
    fn test_payload_shapes() {
        let tags: TagPage = response(
            200,
            r##"{"count": 1, "next": null, "results": [{"id": 3, "name": "tax", "color": "#a6cee3", "text_color": "#000000", "match": ""}]}"##,
        )
        .json()
        .unwrap();
        assert!(tags.next.is_none());
        let (id, meta) = tags.results.into_iter().next().unwrap().into_entry();
        assert_eq!(id, TagId(3));
        assert_eq!(meta.name, "tax");
        assert_eq!(meta.color, "#a6cee3");

        let detail: DocumentDetail = response(200, r#"{"id": 9, "title": "x", "tags": [3, 1]}"#)
            .json()
            .unwrap();
        assert_eq!(detail.tags, vec![TagId(3), TagId(1)]);

        let broken = response(200, "{").json::<SearchPayload>();
        assert!(matches!(broken, Err(GalleryError::Parse(_))));
    }
}
