use thiserror::Error;

/// Errors surfaced by the cropping session.
///
/// Input validation errors abort the operation before any state is touched.
/// Everything else is recoverable: the session keeps going.
#[derive(Debug, Error)]
pub enum CropError {
    #[error("{name} is not an image file")]
    InvalidFileType { name: String },

    #[error("{offered} files selected but only {remaining} slots are left")]
    TooManyFiles { offered: usize, remaining: usize },

    #[error("exactly 25 images are required, {have} uploaded")]
    WrongUploadCount { have: usize },

    #[error("no images found in {folder}")]
    NoImagesFound { folder: String },

    #[error("images can only be changed before cropping starts")]
    NotInUploadPhase,

    #[error("failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },

    #[error("crop source missing")]
    SourceMissing,

    #[error("failed to encode cropped image: {0}")]
    Encode(String),

    #[error("archive name must not be empty")]
    EmptyArchiveName,

    #[error("all slots must be cropped before exporting")]
    SessionIncomplete,

    #[error("failed to write archive: {0}")]
    Archive(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CropError>;
