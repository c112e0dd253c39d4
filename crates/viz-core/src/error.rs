use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("invalid scene config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid scene config: {0}")]
    Invalid(String),
}

/// Failure to obtain a texture. Always recovered locally by degrading the
/// element to an untextured material.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("texture fetch failed: {0}")]
    Fetch(String),
    #[error("texture decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("texture has zero size")]
    Empty,
    #[error("texture {width}x{height} exceeds the size limit")]
    TooLarge { width: u32, height: u32 },
}
