/// Image decode service
///
/// Decoding runs on tokio's blocking pool so the UI thread never waits on it.
/// The caller gets its continuation back through the returned future.

use image::{DynamicImage, GenericImageView};
use std::sync::Arc;
use tokio::task;

use super::thumbnail::{self, Thumbnail};
use crate::crop::ImageDims;
use crate::error::{CropError, Result};

/// A decoded source image plus its preview texture
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: Arc<DynamicImage>,
    pub dims: ImageDims,
    pub preview: Arc<Thumbnail>,
}

/// Decode `bytes` off the UI thread
pub async fn decode_image(name: String, bytes: Arc<Vec<u8>>) -> Result<DecodedImage> {
    let task_name = name.clone();
    task::spawn_blocking(move || decode_image_blocking(&task_name, &bytes))
        .await
        .map_err(|e| CropError::Decode {
            name,
            reason: format!("task join error: {}", e),
        })?
}

/// Blocking implementation of the decode
pub fn decode_image_blocking(name: &str, bytes: &[u8]) -> Result<DecodedImage> {
    let image = image::load_from_memory(bytes).map_err(|e| CropError::Decode {
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(CropError::Decode {
            name: name.to_string(),
            reason: "image has no pixels".to_string(),
        });
    }

    let preview = thumbnail::make_preview(&image);

    Ok(DecodedImage {
        image: Arc::new(image),
        dims: ImageDims::new(width, height),
        preview: Arc::new(preview),
    })
}
