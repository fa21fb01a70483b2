use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::Message;
use crate::config::Config;
use crate::error::Result;
use crate::remote::{get_bytes, get_json, DocumentDetail, RemoteClient};
use crate::state::cache::LibraryCache;
use crate::state::data::{DocumentId, TagMetadata, TileKey};
use crate::thumbnail::{decode_thumbnail_async, Thumbnail};

/// Per-badge lookups of one document, in the order the document lists its tags
pub type Badges = Vec<Result<TagMetadata>>;

/// Loads the thumbnail and tag badges of revealed tiles.
///
/// Each tile gets two independent tasks. Neither waits for the other, for
/// sibling tiles or for the next batch. Results come back as messages
/// carrying the tile key, so the gallery can drop them if the tile's
/// generation is gone.
pub struct ItemEnricher<C> {
    client: Arc<C>,
    config: Arc<Config>,
    cache: Arc<LibraryCache>,
}

impl<C: RemoteClient> ItemEnricher<C> {
    pub fn new(client: Arc<C>, config: Arc<Config>, cache: Arc<LibraryCache>) -> Self {
        ItemEnricher {
            client,
            config,
            cache,
        }
    }

    /// Launch both fetches for the tile at `key`
    pub fn enrich(&self, key: TileKey, document_id: DocumentId, tx: &UnboundedSender<Message>) {
        let client = Arc::clone(&self.client);
        let config = Arc::clone(&self.config);
        let id = document_id.clone();
        let thumbnail_tx = tx.clone();
        tokio::spawn(async move {
            let result = fetch_thumbnail(&*client, &config, &id).await;
            // The gallery may be gone; nothing to deliver to then
            let _ = thumbnail_tx.send(Message::ThumbnailLoaded { key, result });
        });

        let client = Arc::clone(&self.client);
        let config = Arc::clone(&self.config);
        let cache = Arc::clone(&self.cache);
        let tags_tx = tx.clone();
        tokio::spawn(async move {
            let result = fetch_badges(&*client, &config, &cache, &document_id).await;
            let _ = tags_tx.send(Message::TagsLoaded { key, result });
        });
    }
}

/// Download and decode a document's thumbnail
pub async fn fetch_thumbnail<C: RemoteClient>(
    client: &C,
    config: &Config,
    document_id: &DocumentId,
) -> Result<Thumbnail> {
    let bytes = get_bytes(client, config, config.thumbnail_url(document_id)).await?;
    debug!("📸 Thumbnail for {}: {} bytes", document_id, bytes.len());
    decode_thumbnail_async(bytes).await
}

/// Fetch a document's tag ids and look each one up in the tag cache.
///
/// The outer error means the detail record itself could not be loaded; an
/// inner error only affects that one badge.
pub async fn fetch_badges<C: RemoteClient>(
    client: &C,
    config: &Config,
    cache: &LibraryCache,
    document_id: &DocumentId,
) -> Result<Badges> {
    let detail: DocumentDetail = get_json(client, config, config.document_url(document_id)).await?;
    cache.get_tags(&detail.tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GalleryError;
    use crate::remote::testing::MockClient;
    use crate::state::cache::IndexSnapshot;
    use crate::state::data::{Generation, TagId};
    use crate::thumbnail::encode_png;
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn config() -> Config {
        Config::new("http://paperless", "secret").unwrap()
    }

    fn cache() -> LibraryCache {
        let mut tags = HashMap::new();
        tags.insert(
            TagId(1),
            TagMetadata {
                name: "invoice".into(),
                color: "#ff0000".into(),
                text_color: "#ffffff".into(),
            },
        );
        tags.insert(
            TagId(2),
            TagMetadata {
                name: "tax".into(),
                color: "#00ff00".into(),
                text_color: "#000000".into(),
            },
        );
        LibraryCache::with_snapshot(IndexSnapshot {
            all_ids: vec![DocumentId::from("7")],
            tags,
        })
    }

    #[tokio::test]
    async fn test_badges_keep_document_order_and_isolate_misses() {
        let client = MockClient::new();
        client.respond_json("http://paperless/api/documents/7/", json!({"id": 7, "tags": [2, 9, 1]}));

        let badges = fetch_badges(&client, &config(), &cache(), &DocumentId::from("7"))
            .await
            .unwrap();

        assert_eq!(badges.len(), 3);
        assert_eq!(badges[0].as_ref().unwrap().name, "tax");
        assert_eq!(badges[1], Err(GalleryError::CacheMiss(TagId(9))));
        assert_eq!(badges[2].as_ref().unwrap().name, "invoice");
    }

    #[tokio::test]
    async fn test_thumbnail_fetch_and_failure() {
        let client = MockClient::new();
        client.respond("http://paperless/api/documents/7/thumb/", 200, encode_png(400, 600));
        client.respond("http://paperless/api/documents/8/thumb/", 200, "garbage");

        let thumb = fetch_thumbnail(&client, &config(), &DocumentId::from("7")).await.unwrap();
        assert_eq!(thumb.width(), 260);

        let err = fetch_thumbnail(&client, &config(), &DocumentId::from("8")).await.unwrap_err();
        assert!(matches!(err, GalleryError::Parse(_)));

        let err = fetch_thumbnail(&client, &config(), &DocumentId::from("9")).await.unwrap_err();
        assert!(matches!(err, GalleryError::Network { status: 404, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_facets_arrive_independently() {
        let client = MockClient::new();
        client.respond_after(
            "http://paperless/api/documents/7/thumb/",
            200,
            encode_png(10, 10),
            Duration::from_secs(5),
        );
        client.respond_json("http://paperless/api/documents/7/", json!({"tags": [1]}));

        let enricher = ItemEnricher::new(Arc::new(client), Arc::new(config()), Arc::new(cache()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let key = TileKey {
            generation: Generation(1),
            index: 0,
        };
        enricher.enrich(key, DocumentId::from("7"), &tx);

        // Tags are not held back by the slow thumbnail
        match rx.recv().await.unwrap() {
            Message::TagsLoaded { key: got, result } => {
                assert_eq!(got, key);
                assert_eq!(result.unwrap().len(), 1);
            }
            other => panic!("unexpected message: {:?}", other),
        }
        match rx.recv().await.unwrap() {
            Message::ThumbnailLoaded { key: got, result } => {
                assert_eq!(got, key);
                assert!(result.is_ok());
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
