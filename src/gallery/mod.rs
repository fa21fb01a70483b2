/// The gallery session
///
/// This module handles:
/// - Revealing the result set batch by batch (revealer.rs)
/// - Loading thumbnails and tag badges per tile (enricher.rs)
/// - Inserting picked documents into the host (selection.rs)
/// - The event loop tying them together (this file)
pub mod enricher;
pub mod revealer;
pub mod selection;

use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{GalleryError, Result};
use crate::host::{Editor, GalleryView, Notifier};
use crate::remote::RemoteClient;
use crate::search::{DebounceToken, Debouncer, Resolver, SearchCoordinator};
use crate::state::cache::LibraryCache;
use crate::state::data::{DocumentId, Generation, Position, Tile, TileKey};
use crate::thumbnail::Thumbnail;

pub use enricher::{Badges, ItemEnricher};
pub use revealer::{PaginatedRevealer, RevealedTile, BATCH_SIZE, SENTINEL_THRESHOLD};
pub use selection::SelectionBinder;

/// Everything that can happen to a gallery
#[derive(Debug)]
pub enum Message {
    /// The search box changed
    Input(String),
    /// A debounce timer ran out
    DebounceElapsed(DebounceToken),
    /// A search finished
    SearchResolved {
        generation: Generation,
        ids: Vec<DocumentId>,
    },
    /// The sentinel after the last tile scrolled into view
    SentinelVisible,
    ThumbnailLoaded {
        key: TileKey,
        result: Result<Thumbnail>,
    },
    TagsLoaded {
        key: TileKey,
        result: Result<Badges>,
    },
    /// The user clicked a tile
    Select { key: TileKey, cursor: Position },
    /// Reload the document index and tags, then search again
    Refresh,
    /// A refresh started by `Refresh` finished
    Refreshed(Result<()>),
    /// Stop the event loop
    Close,
}

/// Cloneable sender the host uses to post events to its gallery
#[derive(Debug, Clone)]
pub struct GalleryHandle {
    tx: UnboundedSender<Message>,
}

impl GalleryHandle {
    fn post(&self, message: Message) {
        if self.tx.send(message).is_err() {
            debug!("Gallery is closed, event dropped");
        }
    }

    pub fn input(&self, raw_text: impl Into<String>) {
        self.post(Message::Input(raw_text.into()));
    }

    pub fn sentinel_visible(&self) {
        self.post(Message::SentinelVisible);
    }

    pub fn select(&self, key: TileKey, cursor: Position) {
        self.post(Message::Select { key, cursor });
    }

    pub fn refresh(&self) {
        self.post(Message::Refresh);
    }

    pub fn close(&self) {
        self.post(Message::Close);
    }
}

/// One open gallery.
///
/// All render state lives here and is only touched by [`Gallery::update`].
/// Background work (search requests, debounce timers, thumbnail and tag
/// fetches) reports back through the message channel, and every late result
/// is checked against the live generation before it reaches the view.
pub struct Gallery<C, V, E> {
    client: Arc<C>,
    config: Arc<Config>,
    cache: Arc<LibraryCache>,
    notifier: Arc<dyn Notifier>,
    search: SearchCoordinator<C>,
    revealer: PaginatedRevealer,
    enricher: ItemEnricher<C>,
    binder: SelectionBinder<E>,
    view: V,
    /// Tiles of the live generation, by reveal index
    tiles: Vec<Tile>,
    generation: Generation,
    /// Set between starting a search and applying its results
    pending: bool,
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
}

impl<C, V, E> Gallery<C, V, E>
where
    C: RemoteClient,
    V: GalleryView,
    E: Editor,
{
    pub fn new(
        client: Arc<C>,
        config: Arc<Config>,
        cache: Arc<LibraryCache>,
        view: V,
        editor: E,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let resolver = Resolver::new(
            Arc::clone(&client),
            Arc::clone(&config),
            Arc::clone(&cache),
            Arc::clone(&notifier),
        );
        let enricher = ItemEnricher::new(Arc::clone(&client), Arc::clone(&config), Arc::clone(&cache));

        Gallery {
            client,
            config,
            cache,
            notifier,
            search: SearchCoordinator::new(resolver, Debouncer::default()),
            revealer: PaginatedRevealer::new(),
            enricher,
            binder: SelectionBinder::new(editor),
            view,
            tiles: Vec::new(),
            generation: Generation::default(),
            pending: false,
            tx,
            rx,
        }
    }

    pub fn handle(&self) -> GalleryHandle {
        GalleryHandle { tx: self.tx.clone() }
    }

    /// Load the document index if needed, then list every document.
    ///
    /// If the index cannot be loaded the grid stays empty, the user gets a
    /// notice and the error is returned. Opening again retries.
    pub async fn open(&mut self) -> Result<()> {
        if let Err(e) = self.cache.ensure_populated(&*self.client, &self.config).await {
            self.notifier
                .notify(&format!("Could not load document index: {}", e));
            return Err(e);
        }
        self.begin_search(String::new());
        Ok(())
    }

    /// Receive and apply one message. False once the gallery is closed.
    pub async fn step(&mut self) -> bool {
        match self.rx.recv().await {
            Some(Message::Close) | None => false,
            Some(message) => {
                self.update(message);
                true
            }
        }
    }

    /// Process messages until `Close`
    pub async fn run(mut self) -> V {
        while self.step().await {}
        info!("Gallery closed");
        self.view
    }

    /// Apply one message to the gallery state
    pub fn update(&mut self, message: Message) {
        match message {
            Message::Input(text) => {
                let tx = self.tx.clone();
                self.search.on_input(text, move |token| {
                    let _ = tx.send(Message::DebounceElapsed(token));
                });
            }
            Message::DebounceElapsed(token) => {
                if let Some(query) = self.search.settle(token) {
                    self.begin_search(query);
                }
            }
            Message::SearchResolved { generation, ids } => match self.check_current(generation) {
                Ok(()) => {
                    self.pending = false;
                    self.start(ids);
                }
                Err(e) => debug!("Dropping results of search {:?}: {}", generation, e),
            },
            Message::SentinelVisible => {
                if self.pending {
                    debug!("Search in flight, ignoring sentinel");
                    return;
                }
                self.reveal_next_batch();
            }
            Message::ThumbnailLoaded { key, result } => {
                if let Err(e) = self.check_current(key.generation) {
                    debug!("Dropping thumbnail for {:?}: {}", key, e);
                    return;
                }
                match result {
                    Ok(thumbnail) => self.view.set_thumbnail(key, &thumbnail),
                    Err(e) => {
                        warn!("Thumbnail for tile {} failed: {}", key.index, e);
                        self.view.set_thumbnail_placeholder(key);
                    }
                }
            }
            Message::TagsLoaded { key, result } => {
                if let Err(e) = self.check_current(key.generation) {
                    debug!("Dropping tags for {:?}: {}", key, e);
                    return;
                }
                match result {
                    Ok(badges) => {
                        for badge in badges {
                            match badge {
                                Ok(tag) => self.view.append_badge(key, &tag),
                                Err(e) => warn!("Skipping badge on tile {}: {}", key.index, e),
                            }
                        }
                    }
                    Err(e) => warn!("Tags for tile {} failed: {}", key.index, e),
                }
            }
            Message::Select { key, cursor } => {
                if let Err(e) = self.check_current(key.generation) {
                    debug!("Ignoring selection of {:?}: {}", key, e);
                    return;
                }
                match self.tiles.get_mut(key.index) {
                    Some(tile) => {
                        self.binder.select(&mut self.view, key, tile, cursor);
                    }
                    None => debug!("Ignoring selection of unknown tile {:?}", key),
                }
            }
            Message::Refresh => {
                let client = Arc::clone(&self.client);
                let config = Arc::clone(&self.config);
                let cache = Arc::clone(&self.cache);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = cache.refresh(&*client, &config).await;
                    let _ = tx.send(Message::Refreshed(result));
                });
            }
            Message::Refreshed(result) => match result {
                Ok(()) => {
                    let query = self.search.latest_text().to_string();
                    self.begin_search(query);
                }
                Err(e) => {
                    self.notifier
                        .notify(&format!("Could not load document index: {}", e));
                }
            },
            Message::Close => {}
        }
    }

    /// Retire the current generation and resolve `query` in the background.
    /// Nothing is revealed until the results arrive.
    fn begin_search(&mut self, query: String) {
        self.generation = self.generation.next();
        self.tiles.clear();
        self.pending = true;
        let generation = self.generation;
        debug!("Search {:?} for '{}'", generation, query);

        let resolver = self.search.resolver().clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let ids = resolver.resolve(&query).await;
            let _ = tx.send(Message::SearchResolved { generation, ids });
        });
    }

    /// Show a fresh result set: clear the grid, rewind, watch the sentinel
    fn start(&mut self, ids: Vec<DocumentId>) {
        info!("Showing {} documents", ids.len());
        self.view.clear();
        self.tiles.clear();
        self.revealer.start(ids);

        if self.revealer.is_empty() {
            self.view.release_sentinel();
        } else {
            self.view.observe_sentinel(SENTINEL_THRESHOLD);
        }
    }

    fn reveal_next_batch(&mut self) {
        let batch = self.revealer.next_batch();
        if batch.is_empty() {
            return;
        }

        for revealed in batch {
            let key = TileKey {
                generation: self.generation,
                index: revealed.index,
            };
            self.view.create_tile(key, &revealed.document_id, revealed.column);
            self.enricher.enrich(key, revealed.document_id.clone(), &self.tx);
            self.tiles.push(Tile {
                document_id: revealed.document_id,
                column: revealed.column,
                consumed: false,
            });
        }

        if self.revealer.is_exhausted() {
            self.view.release_sentinel();
        } else {
            self.view.observe_sentinel(SENTINEL_THRESHOLD);
        }
    }

    /// `Cancelled` for anything that belongs to a retired generation
    fn check_current(&self, generation: Generation) -> Result<()> {
        if generation == self.generation {
            Ok(())
        } else {
            Err(GalleryError::Cancelled)
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn editor(&self) -> &E {
        self.binder.editor()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// How many ids of the live result set have been revealed
    pub fn revealed(&self) -> usize {
        self.revealer.cursor()
    }

    /// Size of the live result set
    pub fn result_len(&self) -> usize {
        self.revealer.len()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::state::data::{Column, InsertionData, TagMetadata};

    /// What the gallery asked the view to do
    #[derive(Debug, Clone, PartialEq)]
    pub enum ViewEvent {
        Clear,
        CreateTile(TileKey, DocumentId, Column),
        Thumbnail(TileKey, u32),
        Placeholder(TileKey),
        Badge(TileKey, String),
        Consumed(TileKey),
        Observe,
        Release,
    }

    #[derive(Debug, Default)]
    pub struct RecordingView {
        pub events: Vec<ViewEvent>,
    }

    impl RecordingView {
        pub fn badges(&self) -> Vec<(TileKey, String)> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    ViewEvent::Badge(key, name) => Some((*key, name.clone())),
                    _ => None,
                })
                .collect()
        }

        pub fn tiles_created(&self) -> usize {
            self.events
                .iter()
                .filter(|e| matches!(e, ViewEvent::CreateTile(..)))
                .count()
        }
    }

    impl GalleryView for RecordingView {
        fn clear(&mut self) {
            self.events.push(ViewEvent::Clear);
        }
        fn create_tile(&mut self, key: TileKey, document_id: &DocumentId, column: Column) {
            self.events
                .push(ViewEvent::CreateTile(key, document_id.clone(), column));
        }
        fn set_thumbnail(&mut self, key: TileKey, thumbnail: &Thumbnail) {
            self.events.push(ViewEvent::Thumbnail(key, thumbnail.width()));
        }
        fn set_thumbnail_placeholder(&mut self, key: TileKey) {
            self.events.push(ViewEvent::Placeholder(key));
        }
        fn append_badge(&mut self, key: TileKey, tag: &TagMetadata) {
            self.events.push(ViewEvent::Badge(key, tag.name.clone()));
        }
        fn mark_consumed(&mut self, key: TileKey) {
            self.events.push(ViewEvent::Consumed(key));
        }
        fn observe_sentinel(&mut self, _threshold: f32) {
            self.events.push(ViewEvent::Observe);
        }
        fn release_sentinel(&mut self) {
            self.events.push(ViewEvent::Release);
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordingEditor {
        pub inserted: Vec<InsertionData>,
    }

    impl Editor for RecordingEditor {
        fn insert(&mut self, data: &InsertionData) {
            self.inserted.push(data.clone());
        }
    }
}
