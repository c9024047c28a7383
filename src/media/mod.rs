/// Media collaborators
///
/// This module handles:
/// - Reading uploads and validating their type (import.rs)
/// - Decoding source images off the UI thread (decode.rs)
/// - Thumbnails and preview textures (thumbnail.rs)

pub mod decode;
pub mod import;
pub mod thumbnail;
