/// State management module
///
/// This module handles all shared gallery state, including:
/// - The document index and tag caches (cache.rs)
/// - Shared data structures (data.rs)
pub mod cache;
pub mod data;
