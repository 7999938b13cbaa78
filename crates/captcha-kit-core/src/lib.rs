//! Core types and utilities for captcha decoding.
//!
//! This crate is intentionally small. It knows nothing about neural networks
//! or image codecs: it holds decoded pixel buffers ([`Raster`]), flat float
//! tensors exchanged with an inference engine ([`Tensor`]), and the color and
//! alpha preprocessing helpers shared by the recognizer and the slide matchers.

mod alpha;
mod color;
mod logger;
mod raster;
mod tensor;

pub use alpha::{extract_alpha_region, AlphaRegion};
pub use color::{composite_on_white, default_color_range, filter_by_colors, rgb_to_hsv, HsvRange};
pub use raster::{sample_bilinear, Channels, Raster, RasterError};
pub use tensor::{to_nchw_gray, to_nchw_rgb, NormalizeParams, Tensor, TensorError};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
