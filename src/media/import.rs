/// Upload collaborator: turns picked files or a picked folder into
/// in-memory uploads.

use image::ImageFormat;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;
use tracing::debug;
use walkdir::WalkDir;

use super::thumbnail::{self, Thumbnail};
use crate::error::{CropError, Result};

/// One file read into memory, not yet decoded for cropping
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Arc<Vec<u8>>,
    pub thumbnail: Option<Thumbnail>,
}

/// Display name of a path
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// True when the extension names an image format we can decode
pub fn is_image_path(path: &Path) -> bool {
    ImageFormat::from_path(path)
        .map(|format| format.reading_enabled())
        .unwrap_or(false)
}

/// Reject the whole batch if any file is not an image
pub fn validate_types(paths: &[PathBuf]) -> Result<()> {
    match paths.iter().find(|p| !is_image_path(p)) {
        Some(bad) => Err(CropError::InvalidFileType { name: file_name(bad) }),
        None => Ok(()),
    }
}

/// All image files below `folder`, sorted by path
pub fn collect_folder(folder: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_image_path(path))
        .collect();

    files.sort();
    debug!(folder = %folder.display(), count = files.len(), "collected images from folder");
    files
}

/// `collect_folder` on the blocking pool. An empty folder is an error.
pub async fn scan_folder(folder: PathBuf) -> Result<Vec<PathBuf>> {
    let scanned = folder.clone();
    let files = task::spawn_blocking(move || collect_folder(&scanned))
        .await
        .map_err(|e| CropError::Io(std::io::Error::other(e.to_string())))?;

    if files.is_empty() {
        return Err(CropError::NoImagesFound {
            folder: folder.display().to_string(),
        });
    }
    Ok(files)
}

/// Read every file and build its strip thumbnail
pub async fn read_files(paths: Vec<PathBuf>, thumbnail_size: u32) -> Result<Vec<UploadedFile>> {
    validate_types(&paths)?;

    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = Arc::new(tokio::fs::read(&path).await?);

        let thumb_bytes = Arc::clone(&bytes);
        let thumbnail = task::spawn_blocking(move || {
            thumbnail::thumbnail_from_bytes(&thumb_bytes, thumbnail_size)
        })
        .await
        .ok()
        .flatten();

        uploads.push(UploadedFile {
            name: file_name(&path),
            bytes,
            thumbnail,
        });
    }

    Ok(uploads)
}
