use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paperless_gallery::gallery::enricher::fetch_badges;
use paperless_gallery::gallery::PaginatedRevealer;
use paperless_gallery::search::Resolver;
use paperless_gallery::{Config, GalleryError, HttpClient, LibraryCache, LogNotifier};

/// Print the first page of the gallery for an optional search query.
///
/// Usage: paperless-gallery [query...]
#[tokio::main]
async fn main() -> Result<(), GalleryError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paperless_gallery=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");

    let config = Arc::new(Config::load()?);
    let client = Arc::new(HttpClient::new()?);
    let cache = Arc::new(LibraryCache::new());
    info!("🎨 Connecting to {}", config.base_url);

    cache.ensure_populated(&*client, &config).await?;

    let resolver = Resolver::new(
        Arc::clone(&client),
        Arc::clone(&config),
        Arc::clone(&cache),
        Arc::new(LogNotifier),
    );
    let ids = resolver.resolve(&query).await;
    println!("{} documents", ids.len());

    let mut revealer = PaginatedRevealer::new();
    revealer.start(ids);
    for tile in revealer.next_batch() {
        let tags = match fetch_badges(&*client, &config, &cache, &tile.document_id).await {
            Ok(badges) => badges
                .into_iter()
                .filter_map(|badge| badge.ok())
                .map(|tag| tag.name)
                .collect::<Vec<_>>()
                .join(", "),
            Err(e) => format!("<{}>", e),
        };
        println!("{:>3}  #{:<8} {:?}  [{}]", tile.index, tile.document_id.as_str(), tile.column, tags);
    }

    if !revealer.is_exhausted() {
        println!("... {} more", revealer.len() - revealer.cursor());
    }

    Ok(())
}
