use captcha_kit_core::{RasterError, TensorError};
use captcha_kit_detect::DetectError;
use captcha_kit_ocr::{CharsetError, DecodeError};

/// Errors produced by the high-level recognizer, detector and byte helpers.
#[derive(thiserror::Error, Debug)]
pub enum KitError {
    #[error("inference session failed: {0}")]
    Session(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("inference session produced no output")]
    EmptyOutput,

    #[error("inference session lock poisoned by a panicked caller")]
    SessionPoisoned,

    #[cfg(feature = "image")]
    #[error("failed to decode {role} image: {source}")]
    Decode {
        role: &'static str,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Tensor(#[from] TensorError),

    #[error(transparent)]
    Charset(#[from] CharsetError),

    #[error(transparent)]
    Scores(#[from] DecodeError),

    #[error(transparent)]
    Detect(#[from] DetectError),
}
