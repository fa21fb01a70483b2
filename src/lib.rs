//! A searchable, lazily rendered gallery over a Paperless document store.
//!
//! The crate is the engine behind the gallery: it caches the document index
//! and tag table, debounces search input, reveals results sixteen tiles at a
//! time as the user scrolls, and loads each tile's thumbnail and tags in the
//! background. Drawing, the editor and the HTTP transport are supplied by the
//! host through the traits in [`host`] and [`remote`].

pub mod config;
pub mod error;
pub mod gallery;
pub mod host;
pub mod remote;
pub mod search;
pub mod state;
pub mod thumbnail;

pub use config::Config;
pub use error::{GalleryError, Result};
pub use gallery::{Gallery, GalleryHandle, Message};
pub use host::{Editor, GalleryView, LogNotifier, Notifier};
pub use remote::{HttpClient, RemoteClient, Request, Response};
pub use state::cache::{IndexSnapshot, LibraryCache};
pub use state::data::{
    Column, DocumentId, Generation, InsertionData, Position, Range, TagId, TagMetadata, Tile,
    TileKey,
};
pub use thumbnail::Thumbnail;
