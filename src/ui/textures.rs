use crate::core::geo::TileCoord;
use crate::prelude::HashSet;
use egui::{ColorImage, TextureHandle, TextureOptions};
use lru::LruCache;
use std::num::NonZeroUsize;

const DEFAULT_TEXTURES: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// Decoded tile textures, uploaded once per tile
pub struct TileTextures {
    textures: LruCache<TileCoord, TextureHandle>,
    undecodable: HashSet<TileCoord>,
}

impl TileTextures {
    pub fn new(capacity: usize) -> Self {
        Self {
            textures: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(DEFAULT_TEXTURES)),
            undecodable: HashSet::default(),
        }
    }

    /// Texture for a tile, decoding and uploading `bytes` on first use
    pub fn texture_for(
        &mut self,
        ctx: &egui::Context,
        coord: TileCoord,
        bytes: &[u8],
    ) -> Option<egui::TextureId> {
        if let Some(texture) = self.textures.get(&coord) {
            return Some(texture.id());
        }
        if self.undecodable.contains(&coord) {
            return None;
        }

        let Some(image) = decode_tile(bytes) else {
            log::warn!("tile {coord} is not a decodable image");
            self.undecodable.insert(coord);
            return None;
        };
        let texture = ctx.load_texture(format!("tile-{coord}"), image, TextureOptions::LINEAR);
        let id = texture.id();
        self.textures.put(coord, texture);
        Some(id)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl Default for TileTextures {
    fn default() -> Self {
        Self::new(DEFAULT_TEXTURES.get())
    }
}

/// PNG/JPEG bytes to an RGBA image
pub fn decode_tile(bytes: &[u8]) -> Option<ColorImage> {
    let image = image::load_from_memory(bytes).ok()?.to_rgba8();
    let (width, height) = image.dimensions();
    Some(ColorImage::from_rgba_unmultiplied(
        [width as usize, height as usize],
        image.as_raw(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let decoded = decode_tile(&png_bytes()).unwrap();
        assert_eq!(decoded.size, [4, 4]);
        assert!(decode_tile(b"not an image").is_none());
    }

    #[test]
    fn test_textures_upload_once() {
        let ctx = egui::Context::default();
        let mut textures = TileTextures::new(4);
        let coord = TileCoord::new(0, 0, 0);
        let bytes = png_bytes();

        let first = textures.texture_for(&ctx, coord, &bytes).unwrap();
        let second = textures.texture_for(&ctx, coord, &[]).unwrap();
        assert_eq!(first, second);
        assert_eq!(textures.len(), 1);

        assert!(textures.texture_for(&ctx, TileCoord::new(1, 0, 1), b"junk").is_none());
    }
}
