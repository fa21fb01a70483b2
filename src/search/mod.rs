/// Search coordination
///
/// This module handles:
/// - Debouncing keystrokes into one query per burst (debounce.rs)
/// - Turning a query into an ordered list of document ids (this file)
pub mod debounce;

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::host::Notifier;
use crate::remote::{get_json, RemoteClient, SearchPayload};
use crate::state::cache::LibraryCache;
use crate::state::data::DocumentId;

pub use debounce::{DebounceToken, Debouncer, SEARCH_DEBOUNCE};

/// Resolves queries into result sets.
///
/// Cheap to clone; each clone shares the client, settings, cache and notifier.
pub struct Resolver<C> {
    client: Arc<C>,
    config: Arc<Config>,
    cache: Arc<LibraryCache>,
    notifier: Arc<dyn Notifier>,
}

impl<C> Clone for Resolver<C> {
    fn clone(&self) -> Self {
        Resolver {
            client: Arc::clone(&self.client),
            config: Arc::clone(&self.config),
            cache: Arc::clone(&self.cache),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<C: RemoteClient> Resolver<C> {
    pub fn new(
        client: Arc<C>,
        config: Arc<Config>,
        cache: Arc<LibraryCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Resolver {
            client,
            config,
            cache,
            notifier,
        }
    }

    /// Resolve `query`, turning any failure into one notice and an empty list
    pub async fn resolve(&self, query: &str) -> Vec<DocumentId> {
        match self.try_resolve(query).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Search for '{}' failed: {}", query, e);
                self.notifier.notify(&format!("Search failed: {}", e));
                Vec::new()
            }
        }
    }

    /// Blank query: every cached id, newest first (the cache must already be
    /// populated; no request is made). Anything else: the store's full-text
    /// search, in the order the store ranks it.
    pub async fn try_resolve(&self, query: &str) -> Result<Vec<DocumentId>> {
        if query.trim().is_empty() {
            debug!("Blank query, listing every cached document");
            return self.cache.get_all_ids_descending();
        }

        let url = self.config.search_url(query)?;
        let payload: SearchPayload = get_json(&*self.client, &self.config, url).await?;
        let ids: Vec<DocumentId> = payload
            .results
            .into_iter()
            .map(|hit| DocumentId::from(hit.id))
            .collect();

        info!("🔍 '{}' matched {} documents", query, ids.len());
        Ok(ids)
    }
}

/// Keystrokes in, one settled query per burst out
pub struct SearchCoordinator<C> {
    resolver: Resolver<C>,
    debouncer: Debouncer,
    latest_text: String,
}

impl<C: RemoteClient> SearchCoordinator<C> {
    pub fn new(resolver: Resolver<C>, debouncer: Debouncer) -> Self {
        SearchCoordinator {
            resolver,
            debouncer,
            latest_text: String::new(),
        }
    }

    /// Record the latest raw text and restart the debounce timer.
    /// `on_elapsed` receives the token to hand back to [`Self::settle`].
    pub fn on_input<F>(&mut self, raw_text: impl Into<String>, on_elapsed: F)
    where
        F: FnOnce(DebounceToken) + Send + 'static,
    {
        self.latest_text = raw_text.into();
        self.debouncer.arm(on_elapsed);
    }

    /// The text to resolve if `token` belongs to the surviving timer.
    /// This is the text at settle time, not at arm time.
    pub fn settle(&mut self, token: DebounceToken) -> Option<String> {
        self.debouncer
            .settle(token)
            .then(|| self.latest_text.clone())
    }

    /// The most recent text, settled or not
    pub fn latest_text(&self) -> &str {
        &self.latest_text
    }

    pub fn resolver(&self) -> &Resolver<C> {
        &self.resolver
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingNotifier;
    use super::*;
    use crate::remote::testing::MockClient;
    use crate::state::cache::IndexSnapshot;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn ids(raw: &[&str]) -> Vec<DocumentId> {
        raw.iter().map(|s| DocumentId::from(*s)).collect()
    }

    fn resolver(
        client: &MockClient,
        cache: LibraryCache,
    ) -> (Resolver<MockClient>, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let resolver = Resolver::new(
            Arc::new(client.clone()),
            Arc::new(Config::new("http://paperless", "secret").unwrap()),
            Arc::new(cache),
            notifier.clone(),
        );
        (resolver, notifier)
    }

    fn populated() -> LibraryCache {
        LibraryCache::with_snapshot(IndexSnapshot {
            all_ids: ids(&["3", "10", "2"]),
            tags: Default::default(),
        })
    }

    #[tokio::test]
    async fn test_blank_query_lists_cache_newest_first() {
        let client = MockClient::new();
        let (resolver, _) = resolver(&client, populated());

        assert_eq!(resolver.resolve("").await, ids(&["10", "3", "2"]));
        assert_eq!(resolver.resolve("   ").await, ids(&["10", "3", "2"]));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_remote_order_is_kept() {
        let client = MockClient::new();
        client.respond_json(
            "http://paperless/api/documents/?query=x",
            json!({"count": 2, "results": [{"id": 5}, {"id": 2}]}),
        );
        let (resolver, notifier) = resolver(&client, populated());

        assert_eq!(resolver.resolve("x").await, ids(&["5", "2"]));
        assert_eq!(notifier.count(), 0);
        assert_eq!(client.requests()[0].authorization, "token secret");
    }

    #[tokio::test]
    async fn test_server_error_yields_empty_and_one_notice() {
        let client = MockClient::new();
        client.respond("http://paperless/api/documents/?query=x", 500, "oops");
        let (resolver, notifier) = resolver(&client, populated());

        assert!(resolver.resolve("x").await.is_empty());
        assert_eq!(notifier.count(), 1);
    }

    #[tokio::test]
    async fn test_transport_and_parse_failures_notify() {
        let client = MockClient::new();
        client.fail("http://paperless/api/documents/?query=a", "connection refused");
        client.respond("http://paperless/api/documents/?query=b", 200, "{\"results\": 3}");
        let (resolver, notifier) = resolver(&client, populated());

        assert!(resolver.resolve("a").await.is_empty());
        assert!(resolver.resolve("b").await.is_empty());
        assert_eq!(notifier.count(), 2);
    }

    #[tokio::test]
    async fn test_blank_query_on_empty_cache_notifies() {
        let client = MockClient::new();
        let (resolver, notifier) = resolver(&client, LibraryCache::new());

        assert!(resolver.resolve("").await.is_empty());
        assert_eq!(notifier.count(), 1);
        assert!(client.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_settles_on_final_text() {
        let client = MockClient::new();
        let (resolver, _) = resolver(&client, populated());
        let mut coordinator = SearchCoordinator::new(resolver, Debouncer::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        for text in ["p", "pa", "pap"] {
            let tx = tx.clone();
            coordinator.on_input(text, move |token| {
                let _ = tx.send(token);
            });
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;

        let mut settled = Vec::new();
        while let Ok(token) = rx.try_recv() {
            settled.extend(coordinator.settle(token));
        }
        assert_eq!(settled, vec!["pap".to_string()]);
    }
}
