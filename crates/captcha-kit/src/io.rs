//! Byte-level entry points backed by the `image` crate.

use image::{DynamicImage, GenericImageView};

use captcha_kit_core::Raster;
use captcha_kit_detect::BoundingBox;
use captcha_kit_ocr::ClassificationResult;
use captcha_kit_slide::{slide_comparison, slide_match, SlideComparisonResult, SlideMatchResult};

use crate::recognizer::{ClassifyOptions, Recognizer};
use crate::session::InferenceSession;
use crate::{Detector, KitError};

/// Convert a decoded image, keeping gray and alpha layouts where present.
pub fn raster_from_dynamic(img: &DynamicImage) -> Result<Raster, KitError> {
    let (w, h) = img.dimensions();
    let (w, h) = (w as usize, h as usize);
    let color = img.color();
    let raster = if color.has_alpha() {
        Raster::rgba(w, h, img.to_rgba8().into_raw())?
    } else if color.channel_count() == 1 {
        Raster::gray(w, h, img.to_luma8().into_raw())?
    } else {
        Raster::rgb(w, h, img.to_rgb8().into_raw())?
    };
    Ok(raster)
}

fn decode_as(bytes: &[u8], role: &'static str) -> Result<Raster, KitError> {
    let img = image::load_from_memory(bytes).map_err(|source| KitError::Decode { role, source })?;
    raster_from_dynamic(&img)
}

/// Decode PNG/JPEG/... bytes into a [`Raster`].
pub fn decode_raster(bytes: &[u8]) -> Result<Raster, KitError> {
    decode_as(bytes, "input")
}

/// [`slide_match`] on encoded images.
///
/// A target without an opaque region is matched whole; only decode failures
/// are reported.
pub fn slide_match_bytes(
    target: &[u8],
    background: &[u8],
    simple_target: bool,
) -> Result<SlideMatchResult, KitError> {
    let target = decode_as(target, "target")?;
    let background = decode_as(background, "background")?;
    Ok(slide_match(&target, &background, simple_target))
}

/// [`slide_comparison`] on encoded images.
pub fn slide_comparison_bytes(
    target: &[u8],
    background: &[u8],
) -> Result<SlideComparisonResult, KitError> {
    let target = decode_as(target, "target")?;
    let background = decode_as(background, "background")?;
    Ok(slide_comparison(&target, &background))
}

impl<S: InferenceSession> Recognizer<S> {
    pub fn classify_bytes(&self, bytes: &[u8], options: &ClassifyOptions) -> Result<String, KitError> {
        self.classify(&decode_raster(bytes)?, options)
    }

    pub fn classify_probability_bytes(&self, bytes: &[u8]) -> Result<ClassificationResult, KitError> {
        self.classify_probability(&decode_raster(bytes)?)
    }
}

impl<S: InferenceSession> Detector<S> {
    pub fn detect_bytes(&self, bytes: &[u8]) -> Result<Vec<BoundingBox>, KitError> {
        self.detect(&decode_raster(bytes)?)
    }
}
