use tracing::info;

use crate::host::{Editor, GalleryView};
use crate::state::data::{InsertionData, Position, Range, Tile, TileKey};

/// Binds a picked tile into the host document.
///
/// Selecting never removes the tile or closes the gallery, and the same tile
/// can be picked again.
pub struct SelectionBinder<E> {
    editor: E,
}

impl<E: Editor> SelectionBinder<E> {
    pub fn new(editor: E) -> Self {
        SelectionBinder { editor }
    }

    /// Insert a reference to the tile's document at `cursor`, then show the
    /// tile as consumed
    pub fn select<V: GalleryView>(
        &mut self,
        view: &mut V,
        key: TileKey,
        tile: &mut Tile,
        cursor: Position,
    ) -> InsertionData {
        let data = InsertionData {
            document_id: tile.document_id.clone(),
            range: Range::collapsed(cursor),
        };
        info!("Inserting document {} at {}:{}", data.document_id, cursor.line, cursor.ch);
        self.editor.insert(&data);

        tile.consumed = true;
        view.mark_consumed(key);
        data
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }
}
