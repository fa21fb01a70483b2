use image::{imageops::FilterType, GenericImageView, RgbaImage};

use crate::error::Result;

/// Width of a tile's thumbnail in the grid
pub const THUMBNAIL_WIDTH: u32 = 260;

/// Decoded thumbnail ready to hand to the view
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub image: RgbaImage,
}

impl Thumbnail {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Decode the bytes served by the thumbnail endpoint (WebP, PNG or JPEG).
///
/// Images wider than the tile are scaled down to `THUMBNAIL_WIDTH`, keeping
/// the aspect ratio. Smaller ones are left alone.
pub fn decode_thumbnail(bytes: &[u8]) -> Result<Thumbnail> {
    let img = image::load_from_memory(bytes)?;

    let img = if img.width() > THUMBNAIL_WIDTH {
        img.resize(THUMBNAIL_WIDTH, u32::MAX, FilterType::Triangle)
    } else {
        img
    };

    Ok(Thumbnail {
        image: img.to_rgba8(),
    })
}

/// Decode on the blocking pool; decoding is CPU-bound
pub async fn decode_thumbnail_async(bytes: Vec<u8>) -> Result<Thumbnail> {
    tokio::task::spawn_blocking(move || decode_thumbnail(&bytes))
        .await
        .map_err(|e| crate::error::GalleryError::Parse(format!("Task join error: {}", e)))?
}

#[cfg(test)]
pub(crate) fn encode_png(width: u32, height: u32) -> Vec<u8> {
    use image::{ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    let img: RgbaImage = ImageBuffer::from_pixel(width, height, Rgba([200, 40, 40, 255]));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}
