/// Shared data structures for the gallery state
///
/// These structs represent the data model that flows between
/// the document store, the caches and the rendered grid.
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identifier of a document in the store (e.g. "42")
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        DocumentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the id, if it is one
    pub fn numeric(&self) -> Option<u64> {
        self.0.trim().parse().ok()
    }

    /// Ordering for the "newest first" listing.
    ///
    /// Numeric ids come first, largest first. Non-numeric ids follow in
    /// descending lexicographic order.
    pub fn cmp_newest_first(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => other.0.cmp(&self.0),
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for DocumentId {
    fn from(id: u64) -> Self {
        DocumentId(id.to_string())
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        DocumentId(id.to_string())
    }
}

/// Identifier of a tag in the store
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TagId(pub u64);

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display metadata of a tag badge
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TagMetadata {
    pub name: String,
    /// Badge background
    pub color: String,
    pub text_color: String,
}

/// Which grid column a tile lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Left,
    Right,
}

impl Column {
    /// Even reveal indices go left, odd ones right
    pub fn for_index(index: usize) -> Self {
        if index & 1 == 0 {
            Column::Left
        } else {
            Column::Right
        }
    }
}

/// Render generation, bumped on every new search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

/// Identifies one rendered tile: its position in the result set of a generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub generation: Generation,
    pub index: usize,
}

/// Render state of a single document preview in the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub document_id: DocumentId,
    pub column: Column,
    /// Set once the document has been inserted into the host document
    pub consumed: bool,
}

/// A cursor position in the host document
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: u32,
    pub ch: u32,
}

/// A text range in the host document
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub from: Position,
    pub to: Position,
}

impl Range {
    /// Empty range at `at`
    pub fn collapsed(at: Position) -> Self {
        Range { from: at, to: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.from == self.to
    }
}

/// What the host editor receives when a document is picked
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InsertionData {
    pub document_id: DocumentId,
    pub range: Range,
}
