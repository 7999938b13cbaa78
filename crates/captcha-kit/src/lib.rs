//! High-level facade for the `captcha-kit-*` workspace.
//!
//! This crate provides:
//! - re-exports of the decoding crates,
//! - [`Recognizer`] and [`Detector`], which pair the pre/post-processing with
//!   a caller-supplied [`InferenceSession`],
//! - (feature `image`, on by default) byte-level helpers that decode PNG/JPEG
//!   input before running any of the pipelines.
//!
//! ## Quickstart
//!
//! ```no_run
//! use captcha_kit::{slide_comparison_bytes, slide_match_bytes};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let piece = std::fs::read("piece.png")?;
//! let background = std::fs::read("background.png")?;
//! let hit = slide_match_bytes(&piece, &background, false)?;
//! println!("gap at x = {}", hit.target[0]);
//!
//! let full = std::fs::read("full.png")?;
//! let gap = slide_comparison_bytes(&background, &full)?;
//! println!("gap at {:?}", gap.target);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `captcha_kit::core`: rasters, tensors, color and alpha helpers, logging.
//! - `captcha_kit::ocr`: charsets, character ranges, greedy decoding, probabilities.
//! - `captcha_kit::detect`: grid decoding, letterboxing and NMS.
//! - `captcha_kit::slide`: edge-based and differential slider solvers.

pub use captcha_kit_core as core;
pub use captcha_kit_detect as detect;
pub use captcha_kit_ocr as ocr;
pub use captcha_kit_slide as slide;

pub use captcha_kit_core::{Channels, Raster, Tensor};
pub use captcha_kit_detect::{BoundingBox, DetectParams};
pub use captcha_kit_ocr::{Charset, ClassificationResult, ModelConfig, RangePreset, RangeSpec};
pub use captcha_kit_slide::{slide_comparison, slide_match, SlideComparisonResult, SlideMatchResult};

mod detector;
mod error;
mod recognizer;
mod session;

pub use detector::Detector;
pub use error::KitError;
pub use recognizer::{ClassifyOptions, Recognizer};
pub use session::InferenceSession;

#[cfg(feature = "image")]
mod io;

#[cfg(feature = "image")]
pub use io::{
    decode_raster, raster_from_dynamic, slide_comparison_bytes, slide_match_bytes,
};
