use crate::state::data::{Column, DocumentId};

/// Tiles revealed per sentinel signal
pub const BATCH_SIZE: usize = 16;

/// Portion of the sentinel that must be visible to trigger a batch
pub const SENTINEL_THRESHOLD: f32 = 0.1;

/// One tile to create, in reveal order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealedTile {
    pub index: usize,
    pub document_id: DocumentId,
    pub column: Column,
}

/// Hands out a result set in batches of [`BATCH_SIZE`].
///
/// The cursor is the only record of what has been revealed. Every call to
/// `next_batch` reads and advances it in one step, so back-to-back sentinel
/// signals can never reveal the same range twice.
#[derive(Debug, Default)]
pub struct PaginatedRevealer {
    ids: Vec<DocumentId>,
    cursor: usize,
}

impl PaginatedRevealer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the result set and rewind to its start
    pub fn start(&mut self, result_set: Vec<DocumentId>) {
        self.ids = result_set;
        self.cursor = 0;
    }

    /// Next batch of tiles; empty once the end of the list is reached
    pub fn next_batch(&mut self) -> Vec<RevealedTile> {
        let start = self.cursor;
        let end = (start + BATCH_SIZE).min(self.ids.len());
        self.cursor = end;

        self.ids[start..end]
            .iter()
            .enumerate()
            .map(|(offset, id)| {
                let index = start + offset;
                RevealedTile {
                    index,
                    document_id: id.clone(),
                    column: Column::for_index(index),
                }
            })
            .collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.ids.len()
    }

    /// Document at `index` of the current result set
    pub fn get(&self, index: usize) -> Option<&DocumentId> {
        self.ids.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(count: usize) -> Vec<DocumentId> {
        (0..count as u64).rev().map(DocumentId::from).collect()
    }

    #[test]
    fn test_every_index_revealed_once_in_order() {
        for count in [1, 15, 16, 17, 40] {
            let mut revealer = PaginatedRevealer::new();
            revealer.start(numbered(count));

            let mut seen = Vec::new();
            // More signals than needed: the extra ones must be no-ops
            for _ in 0..count + 3 {
                let batch = revealer.next_batch();
                assert!(batch.len() <= BATCH_SIZE);
                for tile in batch {
                    let expected = if tile.index % 2 == 0 { Column::Left } else { Column::Right };
                    assert_eq!(tile.column, expected);
                    seen.push(tile.index);
                }
            }

            assert_eq!(seen, (0..count).collect::<Vec<_>>());
            assert!(revealer.is_exhausted());
        }
    }

    #[test]
    fn test_batches_follow_cursor() {
        let mut revealer = PaginatedRevealer::new();
        revealer.start(numbered(20));

        assert_eq!(revealer.next_batch().len(), 16);
        assert_eq!(revealer.cursor(), 16);
        let second = revealer.next_batch();
        assert_eq!(second.len(), 4);
        assert_eq!(second[0].index, 16);
        assert_eq!(second[0].column, Column::Left);
        assert_eq!(second[0].document_id, DocumentId::from("3"));
        assert!(revealer.next_batch().is_empty());
        assert_eq!(revealer.cursor(), 20);
    }

    #[test]
    fn test_empty_result_set_reveals_nothing() {
        let mut revealer = PaginatedRevealer::new();
        revealer.start(Vec::new());
        assert!(revealer.is_exhausted());
        assert!(revealer.next_batch().is_empty());
        assert_eq!(revealer.cursor(), 0);
    }

    #[test]
    fn test_start_rewinds() {
        let mut revealer = PaginatedRevealer::new();
        revealer.start(numbered(30));
        revealer.next_batch();

        revealer.start(numbered(5));
        assert_eq!(revealer.cursor(), 0);
        assert_eq!(revealer.len(), 5);
        assert_eq!(revealer.next_batch().len(), 5);
    }
}
