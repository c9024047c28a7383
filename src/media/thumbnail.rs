use image::{imageops::FilterType, DynamicImage};

/// Longest edge of the live crop preview texture
pub const PREVIEW_SIZE: u32 = 2048;

/// Small RGBA rendition of an image, ready to hand to the UI
#[derive(Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thumbnail")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Fit the image into a `size`×`size` box, keeping its aspect ratio
pub fn make_thumbnail(image: &DynamicImage, size: u32) -> Thumbnail {
    let thumbnail = image.resize(size, size, FilterType::Lanczos3).to_rgba8();
    Thumbnail {
        width: thumbnail.width(),
        height: thumbnail.height(),
        rgba: thumbnail.into_raw(),
    }
}

/// Preview texture for the crop canvas. Smaller images are kept as-is;
/// the canvas draws by destination rectangle so resolution does not matter.
pub fn make_preview(image: &DynamicImage) -> Thumbnail {
    if image.width().max(image.height()) <= PREVIEW_SIZE {
        let rgba = image.to_rgba8();
        return Thumbnail {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        };
    }

    let preview = image.resize(PREVIEW_SIZE, PREVIEW_SIZE, FilterType::Triangle).to_rgba8();
    Thumbnail {
        width: preview.width(),
        height: preview.height(),
        rgba: preview.into_raw(),
    }
}

/// Thumbnail straight from encoded bytes, `None` if they do not decode
pub fn thumbnail_from_bytes(bytes: &[u8], size: u32) -> Option<Thumbnail> {
    let image = image::load_from_memory(bytes).ok()?;
    Some(make_thumbnail(&image, size))
}
