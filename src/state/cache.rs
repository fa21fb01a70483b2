use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::data::{DocumentId, TagId, TagMetadata};
use crate::config::Config;
use crate::error::{GalleryError, Result};
use crate::remote::{get_json, IndexPayload, RemoteClient, TagPage};

/// Everything one refresh brings back from the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexSnapshot {
    /// Sorted newest first
    pub all_ids: Vec<DocumentId>,
    pub tags: HashMap<TagId, TagMetadata>,
}

/// The document index cache and the tag cache.
///
/// Both are filled by one refresh and published together as a single
/// snapshot, so readers never see ids without tags or the other way round.
/// Share one instance between galleries with an `Arc`.
#[derive(Debug, Default)]
pub struct LibraryCache {
    snapshot: RwLock<Option<Arc<IndexSnapshot>>>,
    /// Serializes refreshes so concurrent callers share one fetch
    refresh: Mutex<()>,
}

impl LibraryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache already filled with `snapshot`
    pub fn with_snapshot(snapshot: IndexSnapshot) -> Self {
        let cache = Self::new();
        cache.publish(snapshot);
        cache
    }

    pub fn is_populated(&self) -> bool {
        self.snapshot.read().is_some()
    }

    /// Fetch ids and tags if the cache is empty. No-op when populated.
    ///
    /// On failure the cache stays empty and the error is returned, so the
    /// next call tries again.
    pub async fn ensure_populated<C: RemoteClient>(&self, client: &C, config: &Config) -> Result<()> {
        if self.is_populated() {
            return Ok(());
        }

        let _guard = self.refresh.lock().await;
        // Another caller may have finished the refresh while we waited
        if self.is_populated() {
            return Ok(());
        }

        let snapshot = fetch_snapshot(client, config).await.map_err(|e| {
            warn!("Document index refresh failed: {}", e);
            e
        })?;
        info!(
            "📚 Loaded {} documents and {} tags",
            snapshot.all_ids.len(),
            snapshot.tags.len()
        );
        self.publish(snapshot);
        Ok(())
    }

    /// Refetch ids and tags and swap them in as one snapshot.
    ///
    /// Readers keep seeing the previous snapshot until the new one is
    /// published. On failure the previous snapshot (if any) stays in place.
    pub async fn refresh<C: RemoteClient>(&self, client: &C, config: &Config) -> Result<()> {
        let _guard = self.refresh.lock().await;

        let snapshot = fetch_snapshot(client, config).await.map_err(|e| {
            warn!("Document index refresh failed: {}", e);
            e
        })?;
        info!(
            "🔄 Reloaded {} documents and {} tags",
            snapshot.all_ids.len(),
            snapshot.tags.len()
        );
        self.publish(snapshot);
        Ok(())
    }

    /// Drop the cached index; the next `ensure_populated` refetches it
    pub fn invalidate(&self) {
        debug!("Invalidating document index");
        *self.snapshot.write() = None;
    }

    fn publish(&self, mut snapshot: IndexSnapshot) {
        snapshot.all_ids.sort_by(DocumentId::cmp_newest_first);
        *self.snapshot.write() = Some(Arc::new(snapshot));
    }

    fn current(&self) -> Result<Arc<IndexSnapshot>> {
        self.snapshot.read().clone().ok_or(GalleryError::NotPopulated)
    }

    /// Every known document id, largest (newest) first
    pub fn get_all_ids_descending(&self) -> Result<Vec<DocumentId>> {
        Ok(self.current()?.all_ids.clone())
    }

    pub fn get_tag(&self, tag_id: TagId) -> Result<TagMetadata> {
        self.current()?
            .tags
            .get(&tag_id)
            .cloned()
            .ok_or(GalleryError::CacheMiss(tag_id))
    }

    /// Look up several tags against one snapshot, keeping their order
    pub fn get_tags(&self, tag_ids: &[TagId]) -> Result<Vec<Result<TagMetadata>>> {
        let snapshot = self.current()?;
        Ok(tag_ids
            .iter()
            .map(|id| snapshot.tags.get(id).cloned().ok_or(GalleryError::CacheMiss(*id)))
            .collect())
    }
}

/// One refresh: the id list plus every page of the tag table.
/// Nothing is published unless all requests succeed.
async fn fetch_snapshot<C: RemoteClient>(client: &C, config: &Config) -> Result<IndexSnapshot> {
    let (index, tags) = tokio::join!(
        get_json::<C, IndexPayload>(client, config, config.index_url()),
        fetch_all_tags(client, config),
    );

    Ok(IndexSnapshot {
        all_ids: index?.all.into_iter().map(DocumentId::from).collect(),
        tags: tags?,
    })
}

async fn fetch_all_tags<C: RemoteClient>(
    client: &C,
    config: &Config,
) -> Result<HashMap<TagId, TagMetadata>> {
    let mut tags = HashMap::new();
    let mut next = Some(config.tags_url());

    while let Some(url) = next {
        let page: TagPage = get_json(client, config, url).await?;
        tags.extend(page.results.into_iter().map(|t| t.into_entry()));
        next = page.next;
    }

    Ok(tags)
}
