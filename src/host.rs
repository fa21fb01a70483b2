//! Capabilities the embedding application provides to the gallery.
//!
//! The gallery never builds widgets itself. It tells the host what to draw
//! through [`GalleryView`], hands picked documents to the [`Editor`] and
//! reports failures through a [`Notifier`].

use crate::state::data::{Column, DocumentId, InsertionData, TileKey, TagMetadata};
use crate::thumbnail::Thumbnail;

/// Rendering primitives for the two-column grid.
///
/// Tiles are addressed by [`TileKey`]; the gallery only ever writes to keys
/// of the live generation.
pub trait GalleryView {
    /// Remove every tile
    fn clear(&mut self);

    /// Append an empty tile (no thumbnail, no badges) to `column`
    fn create_tile(&mut self, key: TileKey, document_id: &DocumentId, column: Column);

    fn set_thumbnail(&mut self, key: TileKey, thumbnail: &Thumbnail);

    /// Thumbnail could not be loaded
    fn set_thumbnail_placeholder(&mut self, key: TileKey);

    /// Append one tag badge below the thumbnail
    fn append_badge(&mut self, key: TileKey, tag: &TagMetadata);

    /// Show the tile as already inserted (reduced opacity)
    fn mark_consumed(&mut self, key: TileKey);

    /// Watch the sentinel after the last tile. Once at least `threshold` of
    /// it is visible the host posts `Message::SentinelVisible`.
    fn observe_sentinel(&mut self, threshold: f32);

    /// Stop watching the sentinel; nothing is left to reveal
    fn release_sentinel(&mut self);
}

/// The document a picked reference is inserted into
pub trait Editor {
    fn insert(&mut self, data: &InsertionData);
}

/// Transient user-visible notices
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, message: &str);
}

/// Notifier that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}
