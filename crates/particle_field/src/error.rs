use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldError {
    #[error("Image has zero area: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FieldError>;
