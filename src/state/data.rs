/// Shared data structures for the session state
///
/// An asset is pending until its crop is committed; at that point it carries
/// the cropped PNG and moves to the processed list.

use std::sync::Arc;

use crate::crop::SlotKind;
use crate::media::thumbnail::Thumbnail;

/// One uploaded image
#[derive(Debug, Clone)]
pub struct ImageAsset {
    /// Unique id for the lifetime of the session
    pub id: u64,
    /// File name as uploaded
    pub name: String,
    /// Encoded source bytes
    pub source: Arc<Vec<u8>>,
    /// Slot (0-24) this image is cropped for; the export ordering key
    pub original_index: usize,
    /// Strip thumbnail of the source (None if it did not decode)
    pub thumbnail: Option<Arc<Thumbnail>>,
    /// Set once the crop is committed
    pub cropped: Option<CroppedImage>,
}

/// Result of committing a crop
#[derive(Debug, Clone)]
pub struct CroppedImage {
    /// PNG bytes
    pub data: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    pub kind: SlotKind,
    pub preview: Arc<Thumbnail>,
}

impl ImageAsset {
    pub fn is_cropped(&self) -> bool {
        self.cropped.is_some()
    }

    /// Drop the cropped result (navigating back)
    pub fn clear_crop(&mut self) {
        self.cropped = None;
    }
}
